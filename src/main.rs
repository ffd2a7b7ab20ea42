use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ink_normalize::capture::{IdxImageSource, ImageFileSource, InkChannel, RasterSource, StrokeScript};
use ink_normalize::config::NormalizeConfig;
use ink_normalize::logging;
use ink_normalize::processing::{AsciiSink, JsonSink, Normalized, PreviewPngSink, TargetResolution};
use ink_normalize::session::NormalizeSession;

/// Normalize a freehand drawing into a classifier-ready feature vector.
///
/// INPUT is an image file (PNG, JPEG, ...), an IDX image set (use --index to
/// pick an image) or, with --strokes, a JSON stroke script.
#[derive(Parser, Debug)]
#[command(name = "inknorm")]
#[command(about = "✏️  Center, crop and downsample a drawing into a feature vector")]
struct Args {
    /// Input raster: image file, IDX image set, or stroke script with --strokes
    input: PathBuf,

    /// Output grid as WIDTHxHEIGHT
    #[arg(short, long, value_parser = parse_target, help = "Feature grid size, e.g. 28x28")]
    target: Option<TargetResolution>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which image channel carries the ink
    #[arg(long, value_enum)]
    channel: Option<InkChannel>,

    /// Samples strictly above this count as ink
    #[arg(long)]
    threshold: Option<u8>,

    /// Print the feature grid as text
    #[arg(long)]
    ascii: bool,

    /// Write a magnified PNG preview of the feature grid
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Pixels per feature cell in the preview
    #[arg(long, default_value_t = 10)]
    preview_scale: u32,

    /// Print the result as a JSON document
    #[arg(long, conflicts_with = "ascii")]
    json: bool,

    /// Image index inside an IDX image set
    #[arg(long)]
    index: Option<usize>,

    /// Treat INPUT as a JSON stroke script
    #[arg(long)]
    strokes: bool,

    /// Log pipeline stages (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing_with_default(if args.verbose { "debug" } else { "info" })?;

    let config = resolve_config(&args)?;
    let pipeline = config.to_pipeline()?;
    let source = open_source(&args, config.ink_channel)?;

    let mut builder = NormalizeSession::builder().with_source(source).with_pipeline(pipeline);
    if args.ascii {
        builder = builder.with_sink(AsciiSink::new(std::io::stdout()));
    }
    if let Some(path) = &args.preview {
        builder = builder.with_sink(PreviewPngSink::new(path, args.preview_scale));
    }
    if args.json {
        builder = builder.with_sink(JsonSink::new(std::io::stdout()));
    }
    let mut session = builder.build()?;

    let report = session.run_once()?;
    match &report.outcome {
        Normalized::Features(features) => {
            if !args.json {
                println!(
                    "{}: {}x{} feature vector ({} values) in {:.2?}",
                    report.source,
                    features.width(),
                    features.height(),
                    features.len(),
                    report.elapsed
                );
            }
            if let Some(path) = &args.preview {
                if !args.json {
                    println!("Preview written to {}", path.display());
                }
            }
        }
        Normalized::NoContent(reason) => {
            if args.json {
                let doc = serde_json::json!({ "no_content": reason.label(), "message": reason.to_string() });
                println!("{}", doc);
            } else {
                println!("{}: no content ({})", report.source, reason);
            }
        }
    }
    session.finish();
    Ok(())
}

/// Load the config file (or defaults) and apply flag overrides.
fn resolve_config(args: &Args) -> Result<NormalizeConfig> {
    let mut config = match &args.config {
        Some(path) => NormalizeConfig::from_json_file(path)?,
        None => NormalizeConfig::default(),
    };
    if let Some(target) = args.target {
        config.target_width = target.width();
        config.target_height = target.height();
    }
    if let Some(channel) = args.channel {
        config.ink_channel = channel;
    }
    if let Some(threshold) = args.threshold {
        config.ink_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn open_source(args: &Args, channel: InkChannel) -> Result<Box<dyn RasterSource>> {
    if args.strokes {
        let script = StrokeScript::from_json_file(&args.input)?;
        return Ok(Box::new(script.render()?));
    }
    if args.index.is_some() || looks_like_idx(&args.input) {
        let mut source = IdxImageSource::open(&args.input)?;
        source
            .select(args.index.unwrap_or(0))
            .with_context(|| format!("selecting image in {}", args.input.display()))?;
        return Ok(Box::new(source));
    }
    Ok(Box::new(ImageFileSource::new(&args.input, channel)))
}

/// MNIST files are named like `t10k-images-idx3-ubyte` or `*.idx3`.
fn looks_like_idx(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.contains("idx3"))
        .unwrap_or(false)
}

fn parse_target(raw: &str) -> Result<TargetResolution, String> {
    raw.parse::<TargetResolution>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idx_names_are_recognised() {
        assert!(looks_like_idx(Path::new("data/t10k-images-idx3-ubyte")));
        assert!(looks_like_idx(Path::new("train.idx3")));
        assert!(!looks_like_idx(Path::new("digit.png")));
    }

    #[test]
    fn flags_override_config_values() {
        let args = Args::parse_from(["inknorm", "digit.png", "--target", "16x8", "--threshold", "10", "--channel", "luma"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!((config.target_width, config.target_height), (16, 8));
        assert_eq!(config.ink_threshold, 10);
        assert_eq!(config.ink_channel, InkChannel::Luma);
        assert_eq!(config.crop_enlarge, 1.5);
    }

    #[test]
    fn bad_target_is_rejected_by_the_parser() {
        assert!(Args::try_parse_from(["inknorm", "digit.png", "--target", "0x28"]).is_err());
    }

    #[test]
    fn json_output_cannot_share_stdout_with_ascii() {
        let err = Args::try_parse_from(["inknorm", "digit.png", "--ascii", "--json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        assert!(Args::try_parse_from(["inknorm", "digit.png", "--json"]).is_ok());
        assert!(Args::try_parse_from(["inknorm", "digit.png", "--ascii"]).is_ok());
    }
}
