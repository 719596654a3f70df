/*!
    Codec identifiers.
*/

use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/**
    Video codec identifiers understood by the encoder.

    How an identifier maps to a concrete encoder implementation is decided by
    the encoder crate; some identifiers are remapped before lookup.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// H.264 / AVC
    #[default]
    H264,
    /// H.265 / HEVC
    H265,
    /// Motion JPEG
    Mjpeg,
    /// H.263 (legacy)
    H263,
    /// Intel H.263 (legacy)
    H263i,
    /// H.263+ / H.263-1998
    H263p,
    /// MPEG-4 Part 2
    Mpeg4,
    /// MPEG-2 video
    Mpeg2Video,
    /// VP8
    Vp8,
    /// VP9
    Vp9,
    /// AV1
    Av1,
}

impl CodecId {
    pub const ALL: [CodecId; 11] = [
        Self::H264,
        Self::H265,
        Self::Mjpeg,
        Self::H263,
        Self::H263i,
        Self::H263p,
        Self::Mpeg4,
        Self::Mpeg2Video,
        Self::Vp8,
        Self::Vp9,
        Self::Av1,
    ];

    /**
        Short name, matching FFmpeg's codec names where one exists.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Mjpeg => "mjpeg",
            Self::H263 => "h263",
            Self::H263i => "h263i",
            Self::H263p => "h263p",
            Self::Mpeg4 => "mpeg4",
            Self::Mpeg2Video => "mpeg2video",
            Self::Vp8 => "vp8",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "h264" | "avc" | "x264" => Ok(Self::H264),
            "h265" | "hevc" => Ok(Self::H265),
            "mjpeg" | "jpeg" => Ok(Self::Mjpeg),
            _ => Self::ALL
                .into_iter()
                .find(|codec| codec.name() == lower)
                .ok_or_else(|| ParseError {
                    kind: "codec",
                    value: s.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for codec in CodecId::ALL {
            assert_eq!(codec.name().parse::<CodecId>(), Ok(codec));
        }
    }

    #[test]
    fn aliases() {
        assert_eq!("AVC".parse::<CodecId>(), Ok(CodecId::H264));
        assert_eq!("h265".parse::<CodecId>(), Ok(CodecId::H265));
        assert_eq!("jpeg".parse::<CodecId>(), Ok(CodecId::Mjpeg));
    }

    #[test]
    fn unknown_codec() {
        let err = "theora".parse::<CodecId>().unwrap_err();
        assert_eq!(err.kind, "codec");
        assert_eq!(err.value, "theora");
    }
}
