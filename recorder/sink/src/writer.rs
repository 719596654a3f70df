/*!
    Container writer implementation.
*/

use std::path::{Path, PathBuf};

use ffmpeg_next::{Dictionary, format::context::Output as OutputContext};
use recorder_encode::{FrameEncoder, convert::rational_to_ffmpeg};
use recorder_types::{CodecId, Error, Result};
use tracing::{debug, info, warn};

use crate::config::WriterConfig;
use crate::format::ContainerFormat;

/**
    Lifecycle state of a [`ContainerWriter`].
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriterState {
    /// No output is open.
    #[default]
    Closed,
    /// An output is being set up; the header has not been written.
    Initializing,
    /// The header is written and frames are accepted.
    HeaderWritten,
    /// The output is being finalized.
    Closing,
}

/**
    Writes one video track into a container file.

    Owns the output context and the frame encoder feeding it. The container
    format is inferred from the file extension. Frames written before the
    header exists are silently dropped.
*/
pub struct ContainerWriter {
    config: WriterConfig,
    state: WriterState,
    output: Option<OutputContext>,
    encoder: Option<FrameEncoder>,
    header_written: bool,
    track_id: Option<usize>,
    frame_index: u64,
    path: Option<PathBuf>,
}

impl Default for ContainerWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerWriter {
    pub fn new() -> Self {
        Self::with_config(WriterConfig::default())
    }

    pub fn with_config(config: WriterConfig) -> Self {
        Self {
            config,
            state: WriterState::Closed,
            output: None,
            encoder: None,
            header_written: false,
            track_id: None,
            frame_index: 0,
            path: None,
        }
    }

    /**
        Create `path`, open an encoder for `codec` and write the container
        header.

        A writer that is already open is closed first. If any step fails,
        everything acquired so far is released, a file created by this call
        is removed again and the writer is left closed.
    */
    pub fn open<P: AsRef<Path>>(
        &mut self,
        path: P,
        width: u32,
        height: u32,
        frame_rate: f64,
        codec: CodecId,
    ) -> Result<()> {
        let path = path.as_ref();
        if self.output.is_some() || self.encoder.is_some() {
            self.close();
        }
        self.path = None;

        self.state = WriterState::Initializing;
        if let Err(e) = self.initialize(path, width, height, frame_rate, codec) {
            warn!(path = %path.display(), error = %e, "failed to open container writer");
            let created = self.path.take();
            self.close();
            self.encoder = None;
            if let Some(created) = created {
                if let Err(err) = std::fs::remove_file(&created) {
                    warn!(
                        path = %created.display(),
                        error = %err,
                        "failed to remove partial output"
                    );
                }
            }
            return Err(e);
        }

        self.state = WriterState::HeaderWritten;
        info!(
            path = %path.display(),
            codec = %codec,
            width,
            height = self.encoder.as_ref().map_or(height, |e| e.session().height()),
            "opened container writer"
        );
        Ok(())
    }

    /**
        Replace the writer's configuration, then [`open`](Self::open).
    */
    pub fn open_with<P: AsRef<Path>>(
        &mut self,
        path: P,
        width: u32,
        height: u32,
        frame_rate: f64,
        codec: CodecId,
        config: WriterConfig,
    ) -> Result<()> {
        if self.output.is_some() || self.encoder.is_some() {
            self.close();
        }
        self.config = config;
        self.open(path, width, height, frame_rate, codec)
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    fn initialize(
        &mut self,
        path: &Path,
        width: u32,
        height: u32,
        frame_rate: f64,
        codec: CodecId,
    ) -> Result<()> {
        ffmpeg_next::init().map_err(|e| Error::configuration(e.to_string()))?;

        let format = ContainerFormat::guess(path)?;
        if !format.is_file_based() {
            return Err(Error::io(format!(
                "container format '{}' does not write to a single file",
                format.name()
            )));
        }

        let output = ffmpeg_next::format::output_as(path, format.name())
            .map_err(|e| Error::io(format!("failed to create {}: {e}", path.display())))?;
        self.output = Some(output);
        self.path = Some(path.to_path_buf());

        let settings = self
            .config
            .encoder
            .clone()
            .with_global_header(format.wants_global_header());
        let mut encoder = FrameEncoder::new(settings);
        encoder.open(width, height, frame_rate, codec)?;
        self.encoder = Some(encoder);

        self.add_video_track()?;
        self.write_header(&format)
    }

    /**
        Add the single video track and copy the encoder's parameters into it.
    */
    fn add_video_track(&mut self) -> Result<()> {
        let (Some(output), Some(encoder)) = (self.output.as_mut(), self.encoder.as_ref()) else {
            return Err(Error::mux("no output to add a track to"));
        };
        let codec = encoder
            .session()
            .codec()
            .ok_or_else(|| Error::configuration("encoder has no codec"))?;

        let mut stream = output
            .add_stream(codec)
            .map_err(|e| Error::mux(format!("failed to add video track: {e}")))?;

        encoder.session().export_codec_parameters(&mut stream)?;
        if let Some(time_base) = encoder.session().time_base() {
            stream.set_time_base(rational_to_ffmpeg(time_base));
        }

        let index = stream.index();
        self.track_id = Some(index);
        debug!(track = index, "added video track");
        Ok(())
    }

    fn write_header(&mut self, format: &ContainerFormat) -> Result<()> {
        let output = self
            .output
            .as_mut()
            .ok_or_else(|| Error::mux("no output to write a header to"))?;

        let mut options = Dictionary::new();
        if let Some(brand) = self.config.brand.as_deref() {
            if format.supports_brand() {
                options.set("brand", brand);
            }
        }

        output
            .write_header_with(options)
            .map_err(|e| Error::mux(format!("failed to write header: {e}")))?;
        self.header_written = true;
        Ok(())
    }

    /**
        Encode one frame into the video track.

        Does nothing (and succeeds) when no header has been written or the
        track does not exist. Any failure is reported as an encoding error.
    */
    pub fn write_video(&mut self, buffer: &[u8]) -> Result<()> {
        let (Some(output), Some(encoder), Some(track)) =
            (self.output.as_mut(), self.encoder.as_mut(), self.track_id)
        else {
            return Ok(());
        };
        if !self.header_written || track >= output.nb_streams() as usize {
            return Ok(());
        }

        encoder
            .encode(output, buffer, track)
            .map_err(|e| match e {
                Error::Encoding(_) => e,
                other => Error::encoding(other.to_string()),
            })?;
        self.frame_index += 1;
        Ok(())
    }

    /**
        Flush the encoder, write the trailer and close the file.

        Safe to call on a closed writer. Failures are logged, not returned:
        the writer always ends up closed.
    */
    pub fn close(&mut self) {
        if self.output.is_none() && self.state == WriterState::Closed {
            return;
        }
        self.state = WriterState::Closing;

        if let Some(mut output) = self.output.take() {
            if self.header_written {
                if let (Some(encoder), Some(track)) = (self.encoder.as_mut(), self.track_id) {
                    if let Err(e) = encoder.flush_video(&mut output, track) {
                        warn!(error = %e, "failed to flush encoder");
                    }
                }
                if let Err(e) = output.write_trailer() {
                    warn!(error = %e, "failed to write trailer");
                }
            }
            // Dropping the context closes the file
            drop(output);
        }

        if let Some(encoder) = self.encoder.as_mut() {
            encoder.close();
        }

        if let Some(path) = &self.path {
            info!(path = %path.display(), frames = self.frame_index, "closed container writer");
        }
        self.header_written = false;
        self.track_id = None;
        self.frame_index = 0;
        self.state = WriterState::Closed;
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /**
        Returns true while frames are being accepted.
    */
    pub fn is_open(&self) -> bool {
        self.state == WriterState::HeaderWritten
    }

    /**
        Path of the file most recently opened.
    */
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn track_id(&self) -> Option<usize> {
        self.track_id
    }

    /**
        Frames accepted since the writer was opened.
    */
    pub fn frames_written(&self) -> u64 {
        self.frame_index
    }

    /**
        Bytes each buffer passed to [`write_video`](Self::write_video) must
        hold. Zero when no encoder has been opened.
    */
    pub fn frame_size(&self) -> usize {
        self.encoder.as_ref().map_or(0, FrameEncoder::frame_size)
    }

    /**
        Encoded width and (even) height.
    */
    pub fn dimensions(&self) -> (u32, u32) {
        self.encoder.as_ref().map_or((0, 0), |e| {
            (e.session().width(), e.session().height())
        })
    }

    pub fn encoder(&self) -> Option<&FrameEncoder> {
        self.encoder.as_ref()
    }
}

impl Drop for ContainerWriter {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ContainerWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerWriter")
            .field("state", &self.state)
            .field("path", &self.path)
            .field("track_id", &self.track_id)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_writer_is_closed() {
        let writer = ContainerWriter::new();
        assert_eq!(writer.state(), WriterState::Closed);
        assert!(!writer.is_open());
        assert_eq!(writer.path(), None);
        assert_eq!(writer.frame_size(), 0);
        assert_eq!(writer.dimensions(), (0, 0));
    }

    #[test]
    fn write_before_open_is_ignored() {
        let mut writer = ContainerWriter::new();
        let buffer = vec![0x5a; 64];
        assert!(writer.write_video(&buffer).is_ok());
        assert_eq!(writer.frames_written(), 0);
        assert_eq!(writer.state(), WriterState::Closed);
        assert!(buffer.iter().all(|&b| b == 0x5a));
    }

    #[test]
    fn close_when_closed_is_a_no_op() {
        let mut writer = ContainerWriter::new();
        writer.close();
        writer.close();
        assert_eq!(writer.state(), WriterState::Closed);
    }
}
