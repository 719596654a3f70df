/*!
    Codec session: the native handles behind one encoding stream.

    A [`CodecSession`] owns the codec context, the reusable output packet and
    the pixel-format converter, together with the stream's scalar settings
    and frame counter. It provides lifecycle primitives only; deciding which
    encoder to open and how frames flow through it is the job of
    [`FrameEncoder`](crate::FrameEncoder).
*/

use ffmpeg_next::{
    Codec, Dictionary, Packet as PacketFFmpeg,
    codec::{
        self,
        encoder::video::{Encoder as VideoEncoderFFmpeg, Video as VideoConfigFFmpeg},
    },
    ffi,
    format::{context::Output as OutputContext, stream::StreamMut},
    software::scaling::context::Context as ScalerContext,
    util::frame::video::Video as VideoFrameFFmpeg,
};
use recorder_types::{CodecId, Error, PixelFormat, Rational, Result, SampleFormat};
use tracing::debug;

use crate::convert::rational_to_ffmpeg;
use crate::drain::{Drained, classify, drain};

/// Largest width or height FFmpeg can store (`c_int`).
pub const MAX_DIMENSION: u32 = i32::MAX as u32;

/**
    Round a frame height up to the next even number.

    4:2:0 chroma subsampling needs an even number of luma rows. Returns
    `None` if the rounded height does not fit in a `u32`.
*/
pub const fn even_height(height: u32) -> Option<u32> {
    height.checked_add(height & 1)
}

/// Codec context, before and after `avcodec_open2`.
enum CodecContext {
    Configured(VideoConfigFFmpeg),
    Opened(VideoEncoderFFmpeg),
}

impl CodecContext {
    fn context_mut(&mut self) -> &mut codec::Context {
        match self {
            Self::Configured(video) => video,
            Self::Opened(encoder) => encoder,
        }
    }
}

/**
    Native encoding state for one video stream.

    Every handle is optional: a default session holds nothing, and
    [`teardown`](Self::teardown) returns a session to that state.
*/
pub struct CodecSession {
    codec_id: Option<CodecId>,
    codec: Option<Codec>,
    pixel_format: PixelFormat,
    working_format: Option<PixelFormat>,
    sample_format: SampleFormat,
    width: u32,
    height: u32,
    frame_rate: Option<Rational>,
    frame_index: i64,
    context: Option<CodecContext>,
    packet: Option<PacketFFmpeg>,
    scaler: Option<ScalerContext>,
}

impl Default for CodecSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecSession {
    pub fn new() -> Self {
        Self {
            codec_id: None,
            codec: None,
            pixel_format: PixelFormat::Rgba,
            working_format: None,
            sample_format: SampleFormat::default(),
            width: 0,
            height: 0,
            frame_rate: None,
            frame_index: 0,
            context: None,
            packet: None,
            scaler: None,
        }
    }

    /**
        Record the stream's scalar settings. The height is rounded up to
        the next even number.

        Fails if either dimension is zero or, once rounded, larger than
        [`MAX_DIMENSION`].
    */
    pub(crate) fn begin(
        &mut self,
        codec_id: CodecId,
        width: u32,
        height: u32,
        frame_rate: Rational,
        pixel_format: PixelFormat,
    ) -> Result<()> {
        let fits = |d: u32| (1..=MAX_DIMENSION).contains(&d);
        let rounded = match even_height(height) {
            Some(h) if fits(width) && fits(h) => h,
            _ => {
                return Err(Error::configuration(format!(
                    "invalid frame size {width}x{height}"
                )));
            }
        };

        self.codec_id = Some(codec_id);
        self.width = width;
        self.height = rounded;
        self.frame_rate = Some(frame_rate);
        self.pixel_format = pixel_format;
        self.frame_index = 0;
        Ok(())
    }

    /**
        Take ownership of a configured, not yet opened, codec context.
    */
    pub(crate) fn install_context(
        &mut self,
        codec: Codec,
        context: VideoConfigFFmpeg,
        working_format: PixelFormat,
    ) {
        self.codec = Some(codec);
        self.working_format = Some(working_format);
        self.context = Some(CodecContext::Configured(context));
    }

    /**
        OR `flags` into the codec context's flags.

        Only has an effect on encoding when applied before the context is
        opened.
    */
    pub fn set_codec_context_flag(&mut self, flags: codec::Flags) -> Result<()> {
        let context = self
            .context
            .as_mut()
            .ok_or_else(|| Error::configuration("no codec context to set flags on"))?
            .context_mut();
        unsafe {
            (*context.as_mut_ptr()).flags |= flags.bits() as i32;
        }
        Ok(())
    }

    /**
        Returns true if `flags` are all set on the codec context.
    */
    pub fn has_codec_context_flag(&self, flags: codec::Flags) -> bool {
        let ptr = match &self.context {
            Some(CodecContext::Configured(video)) => unsafe { video.as_ptr() },
            Some(CodecContext::Opened(encoder)) => unsafe { encoder.as_ptr() },
            None => return false,
        };
        let bits = flags.bits() as i32;
        unsafe { (*ptr).flags & bits == bits }
    }

    /**
        Open the configured context with codec-private `options`.

        On failure the context is released and the session holds no context.
    */
    pub(crate) fn open_context(&mut self, options: Dictionary) -> Result<()> {
        let context = match self.context.take() {
            Some(CodecContext::Configured(video)) => video,
            Some(opened @ CodecContext::Opened(_)) => {
                self.context = Some(opened);
                return Ok(());
            }
            None => return Err(Error::configuration("no codec context to open")),
        };
        let encoder = context
            .open_with(options)
            .map_err(|e| Error::configuration(format!("failed to open encoder: {e}")))?;
        self.context = Some(CodecContext::Opened(encoder));
        Ok(())
    }

    pub(crate) fn install_scaler(&mut self, scaler: ScalerContext) {
        self.scaler = Some(scaler);
    }

    pub(crate) fn scaler_mut(&mut self) -> Option<&mut ScalerContext> {
        self.scaler.as_mut()
    }

    pub(crate) fn allocate_packet(&mut self) {
        self.packet = Some(PacketFFmpeg::empty());
    }

    /**
        Copy the opened codec's parameters (including out-of-band headers)
        into a container stream.
    */
    pub fn export_codec_parameters(&self, stream: &mut StreamMut) -> Result<()> {
        match &self.context {
            Some(CodecContext::Opened(encoder)) => {
                stream.set_parameters(encoder);
                Ok(())
            }
            _ => Err(Error::configuration(
                "codec parameters are only available once the encoder is open",
            )),
        }
    }

    /**
        Presentation timestamp for the next frame; advances the counter.
    */
    pub(crate) fn next_pts(&mut self) -> i64 {
        let pts = self.frame_index;
        self.frame_index += 1;
        pts
    }

    /**
        Submit a frame to the codec, or end-of-stream when `frame` is `None`.
    */
    pub(crate) fn submit(&mut self, frame: Option<&VideoFrameFFmpeg>) -> Result<()> {
        let encoder = self.opened_mut()?;
        match frame {
            Some(frame) => encoder
                .send_frame(frame)
                .map_err(|e| Error::encoding(format!("codec rejected frame: {e}"))),
            None => match encoder.send_eof() {
                // Already flushed.
                Ok(()) | Err(ffmpeg_next::Error::Eof) => Ok(()),
                Err(e) => Err(Error::encoding(format!("failed to flush codec: {e}"))),
            },
        }
    }

    /**
        Drain every packet the codec has ready into `track` of `output`.

        Packet timestamps are rescaled from the codec time base to the
        track's. Returns the number of packets written.
    */
    pub(crate) fn drain_into(
        &mut self,
        output: &mut OutputContext,
        track: usize,
    ) -> Result<u64> {
        let time_base = self
            .time_base()
            .map(rational_to_ffmpeg)
            .ok_or_else(|| Error::encoding("codec session has no time base"))?;
        let track_time_base = output
            .stream(track)
            .map(|stream| stream.time_base())
            .ok_or_else(|| Error::mux(format!("track {track} does not exist")))?;

        let (Some(CodecContext::Opened(encoder)), Some(packet)) =
            (self.context.as_mut(), self.packet.as_mut())
        else {
            return Err(Error::encoding("codec session is not open"));
        };

        drain(|| match classify(encoder.receive_packet(packet))? {
            Drained::Packet => {
                packet.rescale_ts(time_base, track_time_base);
                packet.set_stream(track);
                let written = packet
                    .write_interleaved(output)
                    .map_err(|e| Error::mux(format!("failed to write packet: {e}")));
                unsafe {
                    ffi::av_packet_unref(packet.as_mut_ptr());
                }
                written.map(|_| Drained::Packet)
            }
            other => Ok(other),
        })
    }

    fn opened_mut(&mut self) -> Result<&mut VideoEncoderFFmpeg> {
        match self.context.as_mut() {
            Some(CodecContext::Opened(encoder)) => Ok(encoder),
            _ => Err(Error::encoding("codec session is not open")),
        }
    }

    /**
        Release every native handle and reset the scalar state.

        Safe to call any number of times.
    */
    pub fn teardown(&mut self) {
        if self.context.is_some() {
            debug!(codec = ?self.codec_id, frames = self.frame_index, "tearing down codec session");
        }
        self.packet = None;
        self.scaler = None;
        self.context = None;
        self.codec = None;
        self.codec_id = None;
        self.working_format = None;
        self.frame_rate = None;
        self.width = 0;
        self.height = 0;
        self.frame_index = 0;
    }

    pub fn codec_id(&self) -> Option<CodecId> {
        self.codec_id
    }

    /**
        The resolved encoder implementation, once one has been installed.
    */
    pub fn codec(&self) -> Option<Codec> {
        self.codec
    }

    /**
        Pixel format of the buffers handed to the encoder.
    */
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /**
        Pixel format the codec is configured with.
    */
    pub fn working_format(&self) -> Option<PixelFormat> {
        self.working_format
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /**
        Frame height, always even.
    */
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_rate(&self) -> Option<Rational> {
        self.frame_rate
    }

    /**
        Codec time base: one tick per frame.
    */
    pub fn time_base(&self) -> Option<Rational> {
        self.frame_rate.map(Rational::invert)
    }

    /**
        Number of frames stamped so far; also the next frame's timestamp.
    */
    pub fn frame_index(&self) -> i64 {
        self.frame_index
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.context, Some(CodecContext::Opened(_)))
    }

    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    pub fn has_packet(&self) -> bool {
        self.packet.is_some()
    }
}

impl Drop for CodecSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for CodecSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecSession")
            .field("codec_id", &self.codec_id)
            .field("pixel_format", &self.pixel_format)
            .field("working_format", &self.working_format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frame_rate", &self.frame_rate)
            .field("frame_index", &self.frame_index)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_round_up_to_even() {
        assert_eq!(even_height(720), Some(720));
        assert_eq!(even_height(721), Some(722));
        assert_eq!(even_height(1), Some(2));
        assert_eq!(even_height(0), Some(0));
        assert_eq!(even_height(u32::MAX - 1), Some(u32::MAX - 1));
        assert_eq!(even_height(u32::MAX), None);
    }

    #[test]
    fn begin_rounds_height() {
        let mut session = CodecSession::new();
        session.begin(
            CodecId::Mjpeg,
            640,
            721,
            Rational::new(24, 1),
            PixelFormat::Rgba,
        )
        .unwrap();
        assert_eq!(session.width(), 640);
        assert_eq!(session.height(), 722);
        assert_eq!(session.time_base(), Some(Rational::new(1, 24)));
    }

    #[test]
    fn begin_rejects_sizes_ffmpeg_cannot_store() {
        let rate = Rational::new(30, 1);
        let mut session = CodecSession::new();
        for (width, height) in [
            (0, 480),
            (640, 0),
            (64, u32::MAX),
            (64, MAX_DIMENSION),
            (MAX_DIMENSION + 1, 64),
        ] {
            let err = session
                .begin(CodecId::Mjpeg, width, height, rate, PixelFormat::Rgba)
                .unwrap_err();
            assert_eq!(err.kind(), recorder_types::ErrorKind::Configuration);
            assert_eq!(session.height(), 0);
        }

        session
            .begin(CodecId::Mjpeg, MAX_DIMENSION, 64, rate, PixelFormat::Rgba)
            .unwrap();
        assert_eq!(session.width(), MAX_DIMENSION);
    }

    #[test]
    fn flag_without_context_is_configuration_error() {
        let mut session = CodecSession::new();
        let err = session
            .set_codec_context_flag(codec::Flags::GLOBAL_HEADER)
            .unwrap_err();
        assert_eq!(err.kind(), recorder_types::ErrorKind::Configuration);
        assert!(!session.has_codec_context_flag(codec::Flags::GLOBAL_HEADER));
    }

    #[test]
    fn pts_counts_up() {
        let mut session = CodecSession::new();
        assert_eq!(session.next_pts(), 0);
        assert_eq!(session.next_pts(), 1);
        assert_eq!(session.frame_index(), 2);
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut session = CodecSession::new();
        session
            .begin(CodecId::H264, 64, 64, Rational::new(30, 1), PixelFormat::Rgba)
            .unwrap();
        session.allocate_packet();
        session.teardown();
        session.teardown();
        assert!(!session.has_context());
        assert!(!session.has_packet());
        assert_eq!(session.codec_id(), None);
        assert_eq!(session.frame_index(), 0);
    }

    #[test]
    fn submit_without_context_fails() {
        let mut session = CodecSession::new();
        assert!(session.submit(None).is_err());
    }
}
