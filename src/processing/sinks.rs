//! # Feature Sinks and Classifiers
//!
//! Read-only consumers of a normalized feature vector. Sinks never feed back
//! into normalization; they render, store or forward what the pipeline and the
//! optional classifier produced.
//!
//! - [`FeatureSink`]: pluggable output destination
//! - [`SinkFanout`]: broadcasts one result to every registered sink, in order
//! - [`AsciiSink`], [`PreviewPngSink`], [`JsonSink`]: built-in destinations
//! - [`Classifier`]: maps a feature vector to a probability distribution

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fast_image_resize::Resizer;
use ink_scale::boxfilter::FeatureVector;
use ink_scale::preview::render_ascii;
use serde::Serialize;
use tracing::debug;

use super::export::encode_png;
use crate::error::{NormalizeError, NormalizeResult};

/// Abstract feature output interface.
/// Implement this trait to create custom display or storage destinations.
pub trait FeatureSink {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Receive one feature vector and, when a classifier ran, its distribution.
    fn consume(&mut self, features: &FeatureVector, distribution: Option<&[f32]>) -> NormalizeResult<()>;
}

/// Maps a feature vector to per-class likelihoods.
pub trait Classifier {
    fn classify(&mut self, features: &FeatureVector) -> NormalizeResult<Vec<f32>>;
}

impl<F> Classifier for F
where
    F: FnMut(&FeatureVector) -> NormalizeResult<Vec<f32>>,
{
    fn classify(&mut self, features: &FeatureVector) -> NormalizeResult<Vec<f32>> {
        self(features)
    }
}

/// Index and likelihood of the most likely class. The first maximum wins;
/// NaN entries are ignored.
pub fn best_guess(distribution: &[f32]) -> Option<(usize, f32)> {
    distribution
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .fold(None, |best, (i, p)| match best {
            Some((_, q)) if q >= p => best,
            _ => Some((i, p)),
        })
}

/// Broadcasts results to multiple sinks.
#[derive(Default)]
pub struct SinkFanout {
    sinks: Vec<Box<dyn FeatureSink>>,
}

impl SinkFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn FeatureSink>) {
        self.sinks.push(sink);
    }

    /// Send to every sink in registration order. Stops at the first failure.
    pub fn broadcast(&mut self, features: &FeatureVector, distribution: Option<&[f32]>) -> NormalizeResult<()> {
        for sink in &mut self.sinks {
            debug!(sink = sink.name(), "sending features");
            sink.consume(features, distribution)
                .map_err(|e| e.with_metadata("sink", sink.name().to_string()))?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

/// Console rendering: the glyph grid, then one bar per class when a
/// distribution is present.
pub struct AsciiSink<W: Write> {
    out: W,
}

impl<W: Write> AsciiSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

const BAR_WIDTH: f32 = 40.0;

impl<W: Write> FeatureSink for AsciiSink<W> {
    fn name(&self) -> &str {
        "ascii"
    }

    fn consume(&mut self, features: &FeatureVector, distribution: Option<&[f32]>) -> NormalizeResult<()> {
        let write_err = |e: std::io::Error| NormalizeError::sink("ascii", e.to_string());
        self.out.write_all(render_ascii(features).as_bytes()).map_err(write_err)?;

        if let Some(distribution) = distribution {
            let best = best_guess(distribution).map(|(i, _)| i);
            for (class, p) in distribution.iter().enumerate() {
                let bar = "#".repeat((p.clamp(0.0, 1.0) * BAR_WIDTH).round() as usize);
                let marker = if Some(class) == best { '*' } else { ' ' };
                writeln!(self.out, "{}{:>2} {:<40} {:.3}", marker, class, bar, p).map_err(write_err)?;
            }
        }
        self.out.flush().map_err(write_err)
    }
}

/// Writes a magnified grayscale PNG of every vector it receives to one path.
pub struct PreviewPngSink {
    path: PathBuf,
    scale: u32,
    resizer: Resizer,
}

impl PreviewPngSink {
    pub fn new(path: impl Into<PathBuf>, scale: u32) -> Self {
        Self { path: path.into(), scale, resizer: Resizer::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeatureSink for PreviewPngSink {
    fn name(&self) -> &str {
        "preview-png"
    }

    fn consume(&mut self, features: &FeatureVector, _distribution: Option<&[f32]>) -> NormalizeResult<()> {
        let png = encode_png(&mut self.resizer, features, self.scale)?;
        fs::write(&self.path, png)
            .map_err(|e| NormalizeError::io_at("write preview", self.path.display().to_string(), e))?;
        debug!(path = %self.path.display(), scale = self.scale, "wrote preview");
        Ok(())
    }
}

/// JSON document describing one normalization result.
#[derive(Debug, Serialize)]
pub struct FeatureDocument<'a> {
    pub width: u32,
    pub height: u32,
    pub values: &'a [u8],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<&'a [f32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_guess: Option<BestGuess>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BestGuess {
    pub class: usize,
    pub likelihood: f32,
}

impl<'a> FeatureDocument<'a> {
    pub fn new(features: &'a FeatureVector, distribution: Option<&'a [f32]>) -> Self {
        Self {
            width: features.width(),
            height: features.height(),
            values: features.values(),
            distribution,
            best_guess: distribution
                .and_then(best_guess)
                .map(|(class, likelihood)| BestGuess { class, likelihood }),
        }
    }
}

/// Writes one JSON document per line.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FeatureSink for JsonSink<W> {
    fn name(&self) -> &str {
        "json"
    }

    fn consume(&mut self, features: &FeatureVector, distribution: Option<&[f32]>) -> NormalizeResult<()> {
        let doc = FeatureDocument::new(features, distribution);
        serde_json::to_writer(&mut self.out, &doc)?;
        writeln!(self.out)
            .and_then(|_| self.out.flush())
            .map_err(|e| NormalizeError::sink("json", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink_scale::boxfilter::box_downsample;
    use ink_scale::raster::RasterBuffer;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn features() -> FeatureVector {
        let raster = RasterBuffer::from_vec(2, 1, vec![255, 0]).unwrap();
        box_downsample(&raster, 2, 1).unwrap()
    }

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    }

    impl FeatureSink for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn consume(&mut self, _: &FeatureVector, _: Option<&[f32]>) -> NormalizeResult<()> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                return Err(NormalizeError::sink(self.name, "display went away"));
            }
            Ok(())
        }
    }

    #[test]
    fn best_guess_picks_first_maximum() {
        assert_eq!(best_guess(&[0.1, 0.6, 0.6, 0.2]), Some((1, 0.6)));
        assert_eq!(best_guess(&[f32::NAN, 0.3]), Some((1, 0.3)));
        assert_eq!(best_guess(&[]), None);
    }

    #[test]
    fn fanout_preserves_order_and_stops_on_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut fanout = SinkFanout::new();
        for (name, fail) in [("grid", false), ("chart", true), ("never", false)] {
            fanout.push(Box::new(Recorder { name, log: log.clone(), fail }));
        }
        assert_eq!(fanout.len(), 3);

        let err = fanout.broadcast(&features(), None).unwrap_err();
        assert_eq!(err.category(), "sink");
        assert_eq!(err.context().metadata.get("sink").map(String::as_str), Some("chart"));
        assert_eq!(*log.borrow(), vec!["grid", "chart"]);
    }

    #[test]
    fn ascii_sink_renders_grid_and_bars() {
        let mut sink = AsciiSink::new(Vec::new());
        sink.consume(&features(), Some(&[0.25, 0.75])).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "@`");
        assert!(lines[1].starts_with("  0 ##########"));
        assert!(lines[2].starts_with("* 1 ##############################"));
        assert!(lines[2].ends_with("0.750"));
    }

    #[test]
    fn json_sink_writes_document() {
        let mut sink = JsonSink::new(Vec::new());
        sink.consume(&features(), Some(&[0.2, 0.8])).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(doc["width"], 2);
        assert_eq!(doc["values"], serde_json::json!([255, 0]));
        assert_eq!(doc["best_guess"]["class"], 1);
    }

    #[test]
    fn json_sink_omits_missing_distribution() {
        let mut sink = JsonSink::new(Vec::new());
        sink.consume(&features(), None).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!text.contains("distribution"));
        assert!(!text.contains("best_guess"));
    }

    #[test]
    fn preview_sink_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PreviewPngSink::new(dir.path().join("preview.png"), 3);
        sink.consume(&features(), None).unwrap();
        let img = image::open(sink.path()).unwrap();
        assert_eq!((img.width(), img.height()), (6, 3));
    }

    #[test]
    fn closures_are_classifiers() {
        let mut classifier =
            |f: &FeatureVector| -> NormalizeResult<Vec<f32>> { Ok(vec![f.values()[0] as f32 / 255.0]) };
        assert_eq!(classifier.classify(&features()).unwrap(), vec![1.0]);
    }
}
