//! # Normalization Session
//!
//! Orchestrates one raster source, the normalization pipeline, an optional
//! classifier and any number of sinks. Built declaratively with
//! [`NormalizeSessionBuilder`].
//!
//! ## Flow of [`NormalizeSession::run_once`]
//!
//! 1. Snapshot the source
//! 2. Normalize the snapshot
//! 3. For a feature vector only: classify, then fan out to every sink
//! 4. Report what happened
//!
//! An absence outcome skips the classifier and the sinks entirely; it is still
//! a successful run.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::capture::RasterSource;
use crate::error::{NormalizeError, NormalizeResult};
use crate::processing::{
    Classifier, FeatureSink, NoContent, NormalizationPipeline, Normalized, SinkFanout, best_guess,
};

/// What one run produced.
#[derive(Clone, Debug)]
pub struct SessionReport {
    /// Name of the source that was snapshotted.
    pub source: String,
    pub outcome: Normalized,
    pub distribution: Option<Vec<f32>>,
    pub elapsed: Duration,
}

impl SessionReport {
    /// Most likely class and its likelihood, when a classifier ran.
    pub fn best_guess(&self) -> Option<(usize, f32)> {
        self.distribution.as_deref().and_then(best_guess)
    }
}

/// Outcome counters across the lifetime of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub runs: u64,
    pub features: u64,
    pub empty_extent: u64,
    pub rejected_by_scale: u64,
}

impl SessionStats {
    fn record(&mut self, outcome: &Normalized) {
        self.runs += 1;
        match outcome {
            Normalized::Features(_) => self.features += 1,
            Normalized::NoContent(NoContent::EmptyExtent) => self.empty_extent += 1,
            Normalized::NoContent(NoContent::RejectedByScale { .. }) => self.rejected_by_scale += 1,
        }
    }
}

/// High-level session tying a source to the pipeline and its consumers.
pub struct NormalizeSession {
    source: Box<dyn RasterSource>,
    pipeline: NormalizationPipeline,
    classifier: Option<Box<dyn Classifier>>,
    sinks: SinkFanout,
    stats: SessionStats,
}

impl NormalizeSession {
    /// Create a new session using the builder pattern.
    pub fn builder() -> NormalizeSessionBuilder {
        NormalizeSessionBuilder::new()
    }

    pub fn pipeline(&self) -> &NormalizationPipeline {
        &self.pipeline
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Snapshot, normalize, classify and fan out once.
    pub fn run_once(&mut self) -> NormalizeResult<SessionReport> {
        let started = Instant::now();
        let raster = self.source.snapshot()?;
        debug!(
            source = self.source.name(),
            width = raster.width(),
            height = raster.height(),
            "snapshot taken"
        );

        let outcome = self.pipeline.normalize(&raster)?;
        self.stats.record(&outcome);

        let mut distribution = None;
        match &outcome {
            Normalized::Features(features) => {
                if let Some(classifier) = self.classifier.as_mut() {
                    let probs = classifier.classify(features)?;
                    if let Some((class, likelihood)) = best_guess(&probs) {
                        info!(class, likelihood, "classified");
                    }
                    distribution = Some(probs);
                }
                self.sinks.broadcast(features, distribution.as_deref())?;
            }
            Normalized::NoContent(reason) => {
                info!(source = self.source.name(), reason = %reason, "nothing to classify");
            }
        }

        Ok(SessionReport {
            source: self.source.name().to_string(),
            outcome,
            distribution,
            elapsed: started.elapsed(),
        })
    }

    /// End the session and return its counters.
    pub fn finish(self) -> SessionStats {
        debug!(
            runs = self.stats.runs,
            features = self.stats.features,
            "session finished"
        );
        self.stats
    }
}

/// Builder for creating normalization sessions with a fluent API.
#[derive(Default)]
pub struct NormalizeSessionBuilder {
    source: Option<Box<dyn RasterSource>>,
    pipeline: Option<NormalizationPipeline>,
    classifier: Option<Box<dyn Classifier>>,
    sinks: SinkFanout,
}

impl NormalizeSessionBuilder {
    /// Create a new session builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raster source for the session.
    pub fn with_source<S: RasterSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Use `pipeline` instead of the 28×28 default.
    pub fn with_pipeline(mut self, pipeline: NormalizationPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn with_classifier<C: Classifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Add a sink. Sinks receive results in the order they were added.
    pub fn with_sink<K: FeatureSink + 'static>(mut self, sink: K) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Build the session with the configured components.
    pub fn build(self) -> NormalizeResult<NormalizeSession> {
        let source = self.source.ok_or_else(|| {
            NormalizeError::config("source", "none", "No raster source specified")
                .with_recovery_suggestion("Call with_source() before build()")
        })?;

        Ok(NormalizeSession {
            source,
            pipeline: self.pipeline.unwrap_or_default(),
            classifier: self.classifier,
            sinks: self.sinks,
            stats: SessionStats::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::StrokeCanvas;

    #[test]
    fn build_requires_source() {
        let err = NormalizeSession::builder().build().err().unwrap();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn blank_canvas_skips_classifier() {
        let mut session = NormalizeSession::builder()
            .with_source(StrokeCanvas::new(40, 40))
            .with_classifier(|_: &ink_scale::boxfilter::FeatureVector| -> NormalizeResult<Vec<f32>> {
                panic!("classifier must not run without ink")
            })
            .build()
            .unwrap();

        let report = session.run_once().unwrap();
        assert_eq!(report.outcome.no_content(), Some(NoContent::EmptyExtent));
        assert!(report.distribution.is_none());
        assert_eq!(session.finish().empty_extent, 1);
    }

    #[test]
    fn drawn_canvas_is_classified() {
        let mut canvas = StrokeCanvas::new(280, 280);
        canvas.draw_polyline(&[(140.0, 30.0), (140.0, 250.0)]);
        let mut session = NormalizeSession::builder()
            .with_source(canvas)
            .with_classifier(|_: &ink_scale::boxfilter::FeatureVector| -> NormalizeResult<Vec<f32>> {
                Ok(vec![0.1, 0.9])
            })
            .build()
            .unwrap();

        let report = session.run_once().unwrap();
        assert!(report.outcome.is_features());
        assert_eq!(report.best_guess(), Some((1, 0.9)));
        assert_eq!(report.source, "stroke-canvas");
        assert_eq!(session.stats().features, 1);
    }
}
