/*!
    Encoder configuration types.
*/

use std::str::FromStr;

use recorder_types::{ParseError, PixelFormat, RowOrder};

/// Bit rate used when none is configured, in bits per second.
pub const DEFAULT_BIT_RATE: u64 = 5_000_000;

/// Group-of-pictures size used when none is configured.
pub const DEFAULT_GOP_SIZE: u32 = 15;

/// Profile handed to libx264 when none is configured.
pub const DEFAULT_PROFILE: &str = "main";

/**
    Encoder speed preset.

    Slower presets produce better compression (smaller files at same quality)
    but take longer to encode. Only the named H.264 encoder reads it.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncoderPreset {
    /// Fastest encoding, largest files.
    Ultrafast,
    /// Very fast encoding.
    Superfast,
    /// Very fast encoding.
    Veryfast,
    /// Faster than default.
    Faster,
    /// Fast encoding, good for real-time capture.
    #[default]
    Fast,
    /// Balance of speed and compression.
    Medium,
    /// Better compression, slower.
    Slow,
    /// Even better compression.
    Slower,
    /// Best compression, slowest.
    Veryslow,
}

impl EncoderPreset {
    const ALL: [EncoderPreset; 9] = [
        Self::Ultrafast,
        Self::Superfast,
        Self::Veryfast,
        Self::Faster,
        Self::Fast,
        Self::Medium,
        Self::Slow,
        Self::Slower,
        Self::Veryslow,
    ];

    /**
        Get the FFmpeg preset string.
    */
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Slower => "slower",
            Self::Veryslow => "veryslow",
        }
    }
}

impl FromStr for EncoderPreset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == lower)
            .ok_or_else(|| ParseError {
                kind: "preset",
                value: s.to_string(),
            })
    }
}

/**
    Settings for a [`FrameEncoder`](crate::FrameEncoder).

    Dimensions, frame rate and codec are passed to `open`; everything else
    about how frames are encoded lives here.
*/
#[derive(Clone, Debug)]
pub struct EncoderSettings {
    /// Pixel format of the buffers handed to `encode`. Must be packed.
    pub source_format: PixelFormat,
    /// Row order of the buffers handed to `encode`.
    pub row_order: RowOrder,
    /// Target bit rate in bits per second.
    pub bit_rate: u64,
    /// Keyframe interval in frames.
    pub gop_size: u32,
    /// libx264 speed preset.
    pub preset: EncoderPreset,
    /// libx264 profile name.
    pub profile: String,
    /**
        Emit codec headers out of band (in the codec parameters) instead of
        in the bitstream. Set by the container writer when the output format
        asks for it.
    */
    pub global_header: bool,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            source_format: PixelFormat::Rgba,
            row_order: RowOrder::default(),
            bit_rate: DEFAULT_BIT_RATE,
            gop_size: DEFAULT_GOP_SIZE,
            preset: EncoderPreset::default(),
            profile: DEFAULT_PROFILE.to_string(),
            global_header: false,
        }
    }
}

impl EncoderSettings {
    /**
        Set the pixel format of incoming buffers.
    */
    pub fn with_source_format(mut self, format: PixelFormat) -> Self {
        self.source_format = format;
        self
    }

    /**
        Set the row order of incoming buffers.
    */
    pub fn with_row_order(mut self, row_order: RowOrder) -> Self {
        self.row_order = row_order;
        self
    }

    /**
        Set the target bit rate in bits per second.
    */
    pub fn with_bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    /**
        Set the keyframe interval in frames.
    */
    pub fn with_gop_size(mut self, frames: u32) -> Self {
        self.gop_size = frames;
        self
    }

    /**
        Set the encoder preset.
    */
    pub fn with_preset(mut self, preset: EncoderPreset) -> Self {
        self.preset = preset;
        self
    }

    /**
        Set the libx264 profile.
    */
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /**
        Request out-of-band codec headers.
    */
    pub fn with_global_header(mut self, global_header: bool) -> Self {
        self.global_header = global_header;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.source_format, PixelFormat::Rgba);
        assert_eq!(settings.row_order, RowOrder::BottomUp);
        assert_eq!(settings.bit_rate, 5_000_000);
        assert_eq!(settings.gop_size, 15);
        assert_eq!(settings.preset, EncoderPreset::Fast);
        assert_eq!(settings.profile, "main");
        assert!(!settings.global_header);
    }

    #[test]
    fn builders() {
        let settings = EncoderSettings::default()
            .with_row_order(RowOrder::TopDown)
            .with_bit_rate(2_000_000)
            .with_gop_size(30)
            .with_preset(EncoderPreset::Veryfast)
            .with_profile("high")
            .with_global_header(true);
        assert_eq!(settings.row_order, RowOrder::TopDown);
        assert_eq!(settings.bit_rate, 2_000_000);
        assert_eq!(settings.gop_size, 30);
        assert_eq!(settings.preset.as_str(), "veryfast");
        assert_eq!(settings.profile, "high");
        assert!(settings.global_header);
    }

    #[test]
    fn preset_from_str() {
        assert_eq!("Medium".parse::<EncoderPreset>(), Ok(EncoderPreset::Medium));
        assert!("ludicrous".parse::<EncoderPreset>().is_err());
    }
}
