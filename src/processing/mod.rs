//! # Processing Module
//!
//! The normalization pipeline and the read-only consumers of its output.

pub mod export;
pub mod pipeline;
pub mod sinks;

pub use export::{encode_png, png_data_uri};
pub use pipeline::{
    NoContent, NormalizationPipeline, NormalizationTrace, Normalized, PipelineOptions,
    TargetResolution, validate_policy,
};
pub use sinks::{
    AsciiSink, BestGuess, Classifier, FeatureDocument, FeatureSink, JsonSink, PreviewPngSink,
    SinkFanout, best_guess,
};
