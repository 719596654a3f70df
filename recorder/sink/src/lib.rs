/*!
    Container writing for the vidrec recording pipeline.

    A [`ContainerWriter`] owns an FFmpeg output context with a single video
    track and the [`FrameEncoder`](recorder_encode::FrameEncoder) that feeds
    it. The container format comes from the file extension; MP4-family
    outputs get the configured major brand (`mp42` by default).

    ```ignore
    use recorder_sink::{CodecId, ContainerWriter};

    let mut writer = ContainerWriter::new();
    writer.open("capture.mp4", 1280, 720, 30.0, CodecId::H264)?;
    for buffer in frames {
        writer.write_video(&buffer)?;
    }
    writer.close();
    ```

    Closing flushes the encoder and writes the trailer. The file is not
    playable until then; dropping the writer closes it as well.
*/

pub use recorder_types::{CodecId, Error, ErrorKind, Result};

mod config;
mod format;
mod writer;

pub use config::{DEFAULT_BRAND, WriterConfig};
pub use format::ContainerFormat;
pub use writer::{ContainerWriter, WriterState};
