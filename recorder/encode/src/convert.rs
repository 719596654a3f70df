/*!
    Conversions between pipeline types and FFmpeg types.
*/

use ffmpeg_next::{codec::Id, format::Pixel};
use recorder_types::{CodecId, Error, PixelFormat, Rational, Result};

/**
    Convert a pipeline pixel format to FFmpeg's.
*/
pub fn pixel_format_to_ffmpeg(format: PixelFormat) -> Result<Pixel> {
    match format {
        PixelFormat::Yuv420p => Ok(Pixel::YUV420P),
        PixelFormat::Yuvj420p => Ok(Pixel::YUVJ420P),
        PixelFormat::Nv12 => Ok(Pixel::NV12),
        PixelFormat::Yuv422p => Ok(Pixel::YUV422P),
        PixelFormat::Yuv444p => Ok(Pixel::YUV444P),
        PixelFormat::Bgra => Ok(Pixel::BGRA),
        PixelFormat::Rgba => Ok(Pixel::RGBA),
        PixelFormat::Rgb24 => Ok(Pixel::RGB24),
        PixelFormat::Bgr24 => Ok(Pixel::BGR24),
        _ => Err(Error::configuration(format!(
            "unsupported pixel format: {format:?}"
        ))),
    }
}

/**
    Convert an FFmpeg pixel format to the pipeline's, if it has a counterpart.
*/
pub fn pixel_format_from_ffmpeg(format: Pixel) -> Option<PixelFormat> {
    match format {
        Pixel::YUV420P => Some(PixelFormat::Yuv420p),
        Pixel::YUVJ420P => Some(PixelFormat::Yuvj420p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::YUV422P => Some(PixelFormat::Yuv422p),
        Pixel::YUV444P => Some(PixelFormat::Yuv444p),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        Pixel::BGR24 => Some(PixelFormat::Bgr24),
        _ => None,
    }
}

/**
    Convert a codec identifier to FFmpeg's.
*/
pub fn codec_id_to_ffmpeg(codec: CodecId) -> Result<Id> {
    match codec {
        CodecId::H264 => Ok(Id::H264),
        CodecId::H265 => Ok(Id::HEVC),
        CodecId::Mjpeg => Ok(Id::MJPEG),
        CodecId::H263 => Ok(Id::H263),
        CodecId::H263i => Ok(Id::H263I),
        CodecId::H263p => Ok(Id::H263P),
        CodecId::Mpeg4 => Ok(Id::MPEG4),
        CodecId::Mpeg2Video => Ok(Id::MPEG2VIDEO),
        CodecId::Vp8 => Ok(Id::VP8),
        CodecId::Vp9 => Ok(Id::VP9),
        CodecId::Av1 => Ok(Id::AV1),
        _ => Err(Error::configuration(format!("unsupported codec: {codec}"))),
    }
}

pub fn rational_to_ffmpeg(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}
