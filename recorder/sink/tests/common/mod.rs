//! Common test utilities

#![allow(dead_code)]

use std::path::Path;

use ffmpeg_next::{codec, media};
use recorder_encode::convert::pixel_format_from_ffmpeg;
use recorder_types::PixelFormat;

/// RGBA frame with a gradient that shifts with `index`, so frames differ
pub fn pattern_frame(width: u32, height: u32, index: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            data.push((x + index) as u8);
            data.push((y + index * 2) as u8);
            data.push(index as u8);
            data.push(255);
        }
    }
    data
}

/// What a muxed file looks like when read back
#[derive(Debug)]
pub struct Probe {
    pub streams: usize,
    pub codec: codec::Id,
    pub width: u32,
    pub height: u32,
    pub format: Option<PixelFormat>,
    pub packets: usize,
    pub extradata_size: i32,
}

/// Open a file with FFmpeg and describe its video track
pub fn probe<P: AsRef<Path>>(path: P) -> Probe {
    ffmpeg_next::init().unwrap();
    let mut input = ffmpeg_next::format::input(path.as_ref()).unwrap();

    let stream = input.streams().best(media::Type::Video).unwrap();
    let index = stream.index();
    let params = stream.parameters();
    let codec = params.id();
    let extradata_size = unsafe { (*params.as_ptr()).extradata_size };
    let decoder = codec::context::Context::from_parameters(params)
        .unwrap()
        .decoder()
        .video()
        .unwrap();
    let (width, height) = (decoder.width(), decoder.height());
    let format = pixel_format_from_ffmpeg(decoder.format());
    let streams = input.nb_streams() as usize;

    let packets = input
        .packets()
        .filter(|(stream, _)| stream.index() == index)
        .count();

    Probe {
        streams,
        codec,
        width,
        height,
        format,
        packets,
        extradata_size,
    }
}

/// Verify that a file exists and has non-zero size
pub fn file_has_data<P: AsRef<Path>>(path: P) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
