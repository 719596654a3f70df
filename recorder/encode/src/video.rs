/*!
    Frame encoder.
*/

use ffmpeg_next::{
    Dictionary,
    codec::{Flags as CodecFlags, context::Context as CodecContextFFmpeg},
    format::context::Output as OutputContext,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};
use recorder_types::{CodecId, Error, Rational, Result};
use tracing::{debug, info};

use crate::config::EncoderSettings;
use crate::convert::{pixel_format_to_ffmpeg, rational_to_ffmpeg};
use crate::frame::{PlaneBinding, frame_shell, image_buffer_size};
use crate::resolve::{Resolution, X264_ENCODER, working_pixel_format};
use crate::scratch::ScratchBuffer;
use crate::session::CodecSession;

/// Frame rates are approximated by rationals with at most this denominator.
pub const FRAME_RATE_MAX_DEN: i32 = 1000;

/**
    Encodes raw frame buffers and writes the resulting packets to a track of
    an open container.

    Incoming buffers are bound to FFmpeg frames without copying, optionally
    presented bottom-up, converted to the codec's pixel format when it
    differs from the source format, and submitted with a monotonically
    increasing timestamp.
*/
pub struct FrameEncoder {
    session: CodecSession,
    settings: EncoderSettings,
    resolution: Option<Resolution>,
    original: Option<VideoFrameFFmpeg>,
    encoded: Option<VideoFrameFFmpeg>,
    scratch: ScratchBuffer,
}

impl FrameEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self {
            session: CodecSession::new(),
            settings,
            resolution: None,
            original: None,
            encoded: None,
            scratch: ScratchBuffer::new(),
        }
    }

    /**
        Resolve, configure and open an encoder for `codec`.

        The height is rounded up to the next even number. Any previously
        open stream is released first. On failure nothing stays allocated.
    */
    pub fn open(&mut self, width: u32, height: u32, frame_rate: f64, codec: CodecId) -> Result<()> {
        ffmpeg_next::init().map_err(|e| Error::configuration(e.to_string()))?;

        self.close();
        self.session.teardown();
        self.resolution = None;

        if let Err(e) = self.configure(width, height, frame_rate, codec) {
            self.close();
            self.session.teardown();
            return Err(e);
        }

        info!(
            codec = %codec,
            encoder = ?self.resolution.and_then(Resolution::encoder_name),
            width = self.session.width(),
            height = self.session.height(),
            frame_rate = %frame_rate,
            "opened frame encoder"
        );
        Ok(())
    }

    fn configure(
        &mut self,
        width: u32,
        height: u32,
        frame_rate: f64,
        codec: CodecId,
    ) -> Result<()> {
        let source_format = self.settings.source_format;
        if source_format.is_planar() {
            return Err(Error::configuration(format!(
                "source pixel format {source_format} is planar; only packed formats are accepted"
            )));
        }

        let rate = Rational::from_f64(frame_rate, FRAME_RATE_MAX_DEN)
            .filter(|r| r.num > 0)
            .ok_or_else(|| Error::configuration(format!("invalid frame rate {frame_rate}")))?;

        // Validates the size and rounds the height
        self.session
            .begin(codec, width, height, rate, source_format)?;
        let height = self.session.height();

        // Resolve the encoder
        let resolution = Resolution::for_codec(codec);
        if let Resolution::Remap { from, to } = resolution {
            debug!(from = %from, to = %to, "remapping legacy codec");
        }
        let encoder_codec = resolution.find()?;
        let working_format = working_pixel_format(resolution.target());
        self.resolution = Some(resolution);

        // Configure the codec context
        let mut video = CodecContextFFmpeg::new_with_codec(encoder_codec)
            .encoder()
            .video()
            .map_err(|e| Error::configuration(format!("failed to allocate encoder: {e}")))?;
        video.set_width(width);
        video.set_height(height);
        video.set_format(pixel_format_to_ffmpeg(working_format)?);
        video.set_bit_rate(self.settings.bit_rate as usize);
        video.set_gop(self.settings.gop_size);
        video.set_time_base(rational_to_ffmpeg(rate.invert()));
        video.set_frame_rate(Some(rational_to_ffmpeg(rate)));

        self.session
            .install_context(encoder_codec, video, working_format);
        if self.settings.global_header {
            self.session
                .set_codec_context_flag(CodecFlags::GLOBAL_HEADER)?;
        }

        // Frame shells; pixel storage is bound per call
        let source_pixel = pixel_format_to_ffmpeg(source_format)?;
        let working_pixel = pixel_format_to_ffmpeg(working_format)?;
        self.original = Some(frame_shell(source_pixel, width, height));
        self.encoded = Some(frame_shell(working_pixel, width, height));

        if source_format != working_format {
            let scaler = ScalerContext::get(
                source_pixel,
                width,
                height,
                working_pixel,
                width,
                height,
                ScalerFlags::FAST_BILINEAR,
            )
            .map_err(|e| Error::configuration(format!("failed to create scaler: {e}")))?;
            self.session.install_scaler(scaler);
        }

        self.session.open_context(self.codec_options(resolution))?;
        self.session.allocate_packet();
        Ok(())
    }

    /**
        Codec-private options. Only the named H.264 encoder takes any.
    */
    fn codec_options(&self, resolution: Resolution) -> Dictionary<'static> {
        let mut options = Dictionary::new();
        if resolution.encoder_name() == Some(X264_ENCODER) {
            options.set("preset", self.settings.preset.as_str());
            options.set("profile", &self.settings.profile);
            options.set("b", &self.settings.bit_rate.to_string());
        }
        options
    }

    /**
        Encode one frame and write every packet the codec produces to
        `track` of `output`.

        `buffer` must hold at least [`frame_size`](Self::frame_size) bytes
        in the source pixel format. Returns the number of packets written.
    */
    pub fn encode(
        &mut self,
        output: &mut OutputContext,
        buffer: &[u8],
        track: usize,
    ) -> Result<u64> {
        let required = self.frame_size();
        if buffer.len() < required {
            return Err(Error::invalid_data(format!(
                "frame buffer holds {} bytes, {required} required",
                buffer.len()
            )));
        }

        let (Some(original_frame), Some(encoded_frame)) =
            (self.original.as_mut(), self.encoded.as_mut())
        else {
            return Err(Error::encoding("frame encoder is not open"));
        };

        let mut original = PlaneBinding::read_only(original_frame, buffer)?;
        if self.settings.row_order.needs_flip() {
            original.flip_rows();
        }

        // Timestamps are only taken by frames that reach the codec
        if self.session.working_format() != Some(self.settings.source_format) {
            let scratch_size = image_buffer_size(
                encoded_frame.format(),
                encoded_frame.width(),
                encoded_frame.height(),
            )?;
            self.scratch.ensure(scratch_size);

            let mut encoded = PlaneBinding::writable(encoded_frame, self.scratch.as_mut_slice())?;
            let scaler = self
                .session
                .scaler_mut()
                .ok_or_else(|| Error::encoding("no converter for pixel format"))?;
            scaler
                .run(&original, &mut encoded)
                .map_err(|e| Error::encoding(format!("pixel conversion failed: {e}")))?;
            encoded.set_pts(Some(self.session.next_pts()));
            self.session.submit(Some(&*encoded))?;
        } else {
            original.set_pts(Some(self.session.next_pts()));
            self.session.submit(Some(&*original))?;
        }

        self.session.drain_into(output, track)
    }

    /**
        Signal end-of-stream and write every remaining packet to `track`.

        Calling this again once the codec is flushed writes nothing.
    */
    pub fn flush_video(&mut self, output: &mut OutputContext, track: usize) -> Result<u64> {
        self.session.submit(None)?;
        let packets = self.session.drain_into(output, track)?;
        debug!(packets, "flushed frame encoder");
        Ok(packets)
    }

    /**
        Release the frame shells and scratch buffer.

        The codec session stays as it is; it is torn down when the encoder
        is reopened or dropped.
    */
    pub fn close(&mut self) {
        self.original = None;
        self.encoded = None;
        self.scratch.release();
    }

    /**
        Bytes one input buffer must hold: width x even height in the source
        pixel format. Zero before `open`.
    */
    pub fn frame_size(&self) -> usize {
        self.settings
            .source_format
            .image_size(self.session.width(), self.session.height())
    }

    /**
        Returns true while frames can be encoded.
    */
    pub fn is_open(&self) -> bool {
        self.session.is_open() && self.original.is_some()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn session(&self) -> &CodecSession {
        &self.session
    }

    pub fn scratch(&self) -> &ScratchBuffer {
        &self.scratch
    }
}

impl std::fmt::Debug for FrameEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameEncoder")
            .field("session", &self.session)
            .field("resolution", &self.resolution)
            .field("scratch", &self.scratch.len())
            .finish_non_exhaustive()
    }
}
