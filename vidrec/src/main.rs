use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use recorder_encode::{DEFAULT_BIT_RATE, DEFAULT_GOP_SIZE, EncoderPreset, EncoderSettings};
use recorder_sink::{ContainerWriter, WriterConfig};
use recorder_types::{CodecId, RowOrder};

mod pattern;

use pattern::PatternSource;

#[derive(Parser, Debug)]
#[command(name = "vidrec")]
#[command(about = "Record a synthetic test pattern into a video file")]
struct Args {
    /// Output file; the container is chosen from the extension
    #[arg(short, long)]
    output: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Frame height in pixels (odd heights are rounded up)
    #[arg(long, default_value = "720")]
    height: u32,

    /// Frames per second
    #[arg(long, default_value = "30")]
    fps: f64,

    /// Number of frames to record
    #[arg(short = 'n', long, default_value = "150")]
    frames: u32,

    /// Codec (h264, mjpeg, mpeg4, h263, ...)
    #[arg(short, long, default_value = "h264")]
    codec: CodecId,

    /// Produce top-down buffers instead of bottom-up ones
    #[arg(long)]
    top_down: bool,

    /// Target bit rate in bits per second
    #[arg(long, default_value_t = DEFAULT_BIT_RATE)]
    bitrate: u64,

    /// Keyframe interval in frames
    #[arg(long, default_value_t = DEFAULT_GOP_SIZE)]
    gop: u32,

    /// libx264 preset
    #[arg(long, default_value = "fast")]
    preset: EncoderPreset,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let row_order = if args.top_down {
        RowOrder::TopDown
    } else {
        RowOrder::BottomUp
    };
    let settings = EncoderSettings::default()
        .with_row_order(row_order)
        .with_bit_rate(args.bitrate)
        .with_gop_size(args.gop)
        .with_preset(args.preset);

    let mut writer =
        ContainerWriter::with_config(WriterConfig::default().with_encoder_settings(settings));
    writer
        .open(&args.output, args.width, args.height, args.fps, args.codec)
        .with_context(|| format!("failed to open {}", args.output.display()))?;

    // The writer may have rounded the height up
    let (width, height) = writer.dimensions();
    let mut source = PatternSource::new(width, height, row_order);

    for _ in 0..args.frames {
        writer
            .write_video(source.next_frame())
            .with_context(|| format!("failed to encode frame {}", source.frames()))?;
    }

    let written = writer.frames_written();
    writer.close();

    info!(
        output = %args.output.display(),
        frames = written,
        width,
        height,
        "recording finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["vidrec", "--output", "out.mp4"]).unwrap();
        assert_eq!(args.width, 1280);
        assert_eq!(args.height, 720);
        assert_eq!(args.fps, 30.0);
        assert_eq!(args.frames, 150);
        assert_eq!(args.codec, CodecId::H264);
        assert!(!args.top_down);
        assert_eq!(args.bitrate, 5_000_000);
        assert_eq!(args.gop, 15);
        assert_eq!(args.preset, EncoderPreset::Fast);
    }

    #[test]
    fn codec_and_preset_names() {
        let args = Args::try_parse_from([
            "vidrec", "-o", "out.avi", "-c", "mjpeg", "--preset", "slow", "--top-down",
        ])
        .unwrap();
        assert_eq!(args.codec, CodecId::Mjpeg);
        assert_eq!(args.preset, EncoderPreset::Slow);
        assert!(args.top_down);
    }

    #[test]
    fn output_is_required() {
        assert!(Args::try_parse_from(["vidrec"]).is_err());
        assert!(Args::try_parse_from(["vidrec", "-o", "x.mp4", "-c", "theora"]).is_err());
    }
}
