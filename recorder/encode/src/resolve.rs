/*!
    Encoder resolution policy.

    Maps a requested [`CodecId`] to the encoder implementation that will
    actually be opened, and picks the pixel format that encoder works in.
*/

use ffmpeg_next::{Codec, encoder};
use recorder_types::{CodecId, Error, PixelFormat, Result};

use crate::convert::codec_id_to_ffmpeg;

/// Encoder looked up by name for H.264.
pub const X264_ENCODER: &str = "libx264";

/**
    How a codec identifier is turned into an encoder implementation.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Look up the default encoder for the identifier.
    Direct(CodecId),
    /// Look up a specific encoder by name.
    Named {
        codec: CodecId,
        encoder: &'static str,
    },
    /// Legacy identifier substituted by a newer one, then looked up directly.
    Remap { from: CodecId, to: CodecId },
}

impl Resolution {
    pub fn for_codec(codec: CodecId) -> Self {
        match codec {
            CodecId::H264 => Self::Named {
                codec,
                encoder: X264_ENCODER,
            },
            CodecId::H263 | CodecId::H263i => Self::Remap {
                from: codec,
                to: CodecId::H263p,
            },
            other => Self::Direct(other),
        }
    }

    /**
        Identifier the codec context ends up configured for.
    */
    pub fn target(self) -> CodecId {
        match self {
            Self::Direct(codec) | Self::Named { codec, .. } => codec,
            Self::Remap { to, .. } => to,
        }
    }

    pub fn encoder_name(self) -> Option<&'static str> {
        match self {
            Self::Named { encoder, .. } => Some(encoder),
            _ => None,
        }
    }

    /**
        Find the encoder implementation in the linked FFmpeg build.
    */
    pub fn find(self) -> Result<Codec> {
        match self {
            Self::Named { encoder, .. } => encoder::find_by_name(encoder)
                .ok_or_else(|| Error::configuration(format!("encoder '{encoder}' not found"))),
            Self::Direct(codec) | Self::Remap { to: codec, .. } => {
                encoder::find(codec_id_to_ffmpeg(codec)?)
                    .ok_or_else(|| Error::configuration(format!("no encoder for codec {codec}")))
            }
        }
    }
}

/**
    Pixel format the encoder for `codec` is configured with.

    Motion JPEG works in full-range YUV; everything else in limited range.
*/
pub fn working_pixel_format(codec: CodecId) -> PixelFormat {
    match codec {
        CodecId::Mjpeg => PixelFormat::Yuvj420p,
        _ => PixelFormat::Yuv420p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h264_is_named() {
        let r = Resolution::for_codec(CodecId::H264);
        assert_eq!(
            r,
            Resolution::Named {
                codec: CodecId::H264,
                encoder: "libx264"
            }
        );
        assert_eq!(r.encoder_name(), Some("libx264"));
        assert_eq!(r.target(), CodecId::H264);
    }

    #[test]
    fn legacy_h263_is_remapped() {
        for legacy in [CodecId::H263, CodecId::H263i] {
            let r = Resolution::for_codec(legacy);
            assert_eq!(
                r,
                Resolution::Remap {
                    from: legacy,
                    to: CodecId::H263p
                }
            );
            assert_eq!(r.target(), CodecId::H263p);
            assert_eq!(r.encoder_name(), None);
        }
    }

    #[test]
    fn everything_else_is_direct() {
        for codec in [CodecId::Mjpeg, CodecId::Mpeg4, CodecId::H263p, CodecId::Vp9] {
            assert_eq!(Resolution::for_codec(codec), Resolution::Direct(codec));
        }
    }

    #[test]
    fn working_formats() {
        assert_eq!(working_pixel_format(CodecId::Mjpeg), PixelFormat::Yuvj420p);
        assert_eq!(working_pixel_format(CodecId::H264), PixelFormat::Yuv420p);
        assert_eq!(working_pixel_format(CodecId::H263p), PixelFormat::Yuv420p);
    }

    #[test]
    fn builtin_encoders_are_found() {
        ffmpeg_next::init().unwrap();
        assert!(Resolution::for_codec(CodecId::Mjpeg).find().is_ok());
        assert!(Resolution::for_codec(CodecId::H263).find().is_ok());
    }
}
