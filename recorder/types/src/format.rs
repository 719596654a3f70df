/*!
    Pixel, sample and row-order types.
*/

use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/**
    Video pixel formats.

    A subset of the formats a frame producer or an encoder is likely to use.
    Not all FFmpeg pixel formats are represented.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp, limited range (most common encoder input)
    Yuv420p,
    /// Planar YUV 4:2:0, 12bpp, full (JPEG) range
    Yuvj420p,
    /// Semi-planar YUV 4:2:0, 12bpp
    Nv12,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Packed BGRA, 32bpp
    Bgra,
    /// Packed RGBA, 32bpp (typical GPU read-back format)
    #[default]
    Rgba,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
}

impl PixelFormat {
    /**
        Returns the number of bits per pixel for this format.

        For planar formats, this is the average bits per pixel.
    */
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Yuv420p | Self::Yuvj420p | Self::Nv12 => 12,
            Self::Yuv422p => 16,
            Self::Rgb24 | Self::Bgr24 | Self::Yuv444p => 24,
            Self::Bgra | Self::Rgba => 32,
        }
    }

    /**
        Returns true if this is a planar format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p | Self::Yuvj420p | Self::Yuv422p | Self::Yuv444p => true,
            Self::Nv12 => true, // semi-planar counts as planar
            Self::Bgra | Self::Rgba | Self::Rgb24 | Self::Bgr24 => false,
        }
    }

    /**
        Size in bytes of one tightly packed image of this format.
    */
    pub const fn image_size(self, width: u32, height: u32) -> usize {
        (width as usize * height as usize * self.bits_per_pixel() as usize).div_ceil(8)
    }

    /**
        FFmpeg's name for this format.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuvj420p => "yuvj420p",
            Self::Nv12 => "nv12",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Bgra => "bgra",
            Self::Rgba => "rgba",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yuv420p" => Ok(Self::Yuv420p),
            "yuvj420p" => Ok(Self::Yuvj420p),
            "nv12" => Ok(Self::Nv12),
            "yuv422p" => Ok(Self::Yuv422p),
            "yuv444p" => Ok(Self::Yuv444p),
            "bgra" => Ok(Self::Bgra),
            "rgba" => Ok(Self::Rgba),
            "rgb24" => Ok(Self::Rgb24),
            "bgr24" => Ok(Self::Bgr24),
            _ => Err(ParseError {
                kind: "pixel format",
                value: s.to_string(),
            }),
        }
    }
}

/**
    Audio sample formats.

    Only carried by the codec session so an audio path can be added later;
    nothing in the video pipeline reads it.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// 32-bit floating point, interleaved
    F32,
    /// 32-bit floating point, one plane per channel
    #[default]
    F32Planar,
    /// Signed 16-bit integer
    S16,
}

impl SampleFormat {
    /**
        Returns the number of bytes per sample.
    */
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::S16 => 2,
            Self::F32 | Self::F32Planar => 4,
        }
    }
}

/**
    Vertical order of the rows in a frame buffer handed to the encoder.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RowOrder {
    /// First row in memory is the top of the image.
    TopDown,
    /// First row in memory is the bottom of the image (GPU read-back order).
    #[default]
    BottomUp,
}

impl RowOrder {
    /**
        Returns true if rows must be inverted before encoding.
    */
    pub const fn needs_flip(self) -> bool {
        matches!(self, Self::BottomUp)
    }
}
