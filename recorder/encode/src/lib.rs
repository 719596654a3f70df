/*!
    Frame encoding for the vidrec recording pipeline.

    This crate turns raw frame buffers (typically RGBA read back from a GPU,
    bottom row first) into compressed packets and writes them straight into
    a track of an FFmpeg output context.

    # Encoding

    ```ignore
    use recorder_encode::{CodecId, EncoderSettings, FrameEncoder};

    let mut encoder = FrameEncoder::new(EncoderSettings::default());
    encoder.open(1280, 720, 30.0, CodecId::H264)?;

    for buffer in frames {
        encoder.encode(&mut output, &buffer, track)?;
    }

    // Write whatever the codec is still holding
    encoder.flush_video(&mut output, track)?;
    encoder.close();
    ```

    # Encoder Resolution

    - **H.264** is opened through the libx264 encoder and receives the
      configured preset, profile and bit rate as codec options.
    - **H.263 / Intel H.263** are legacy identifiers and are opened as H.263+.
    - Everything else uses FFmpeg's default encoder for the codec.

    # Frame Requirements

    Buffers must be packed (RGBA by default) and hold width x height bytes
    per pixel, where height has been rounded up to the next even number.
    Use [`FrameEncoder::frame_size`] to get the exact size. Conversion to
    the codec's YUV format happens inside the encoder.
*/

pub use recorder_types::{CodecId, Error, PixelFormat, Rational, Result, RowOrder};

mod config;
pub mod convert;
mod drain;
mod frame;
mod resolve;
mod scratch;
mod session;
mod video;

pub use config::{
    DEFAULT_BIT_RATE, DEFAULT_GOP_SIZE, DEFAULT_PROFILE, EncoderPreset, EncoderSettings,
};
pub use drain::{Drained, classify, drain};
pub use resolve::{Resolution, X264_ENCODER, working_pixel_format};
pub use scratch::ScratchBuffer;
pub use session::{CodecSession, MAX_DIMENSION, even_height};
pub use video::{FRAME_RATE_MAX_DEN, FrameEncoder};
