//! # Ink Normalization Library
//!
//! Converts a freehand drawing raster into a fixed-size feature vector suitable
//! for an image classifier (by default the 28×28 grid of MNIST digit models), or
//! reports that there is nothing worth classifying.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `capture`: raster sources (image files, IDX image sets, a stroke canvas)
//! - `processing`: the normalization pipeline, sinks and classifier seam
//! - `config`: configuration loading and validation
//! - `session`: source → pipeline → classifier → sinks orchestration
//! - `error`: error types with context and severity
//! - `logging`: tracing subscriber setup
//!
//! The pure algorithms (extent detection, centering, adaptive crop, box-filter
//! downsampling) live in the `ink-scale` crate and are re-exported here.
//!
//! ## Example
//!
//! ```rust
//! use ink_normalize::{normalize, Normalized, RasterBuffer, TargetResolution};
//!
//! # fn main() -> Result<(), ink_normalize::NormalizeError> {
//! let mut samples = vec![0u8; 56 * 56];
//! for y in 10..40 {
//!     for x in 20..30 {
//!         samples[y * 56 + x] = 255;
//!     }
//! }
//! let raster = RasterBuffer::from_vec(56, 56, samples)?;
//!
//! match normalize(&raster, TargetResolution::MNIST)? {
//!     Normalized::Features(features) => assert_eq!(features.len(), 784),
//!     Normalized::NoContent(reason) => println!("nothing to classify: {reason}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod logging;
pub mod processing;
pub mod session;

/// Re-export error types for convenience
pub use error::{HasRecoverySuggestion, HasSeverity, NormalizeError, NormalizeResult};

/// Re-export the core raster types
pub use ink_scale::boxfilter::FeatureVector;
pub use ink_scale::extent::{Extent, InkThreshold};
pub use ink_scale::policy::{RescalePlan, RescalePolicy};
pub use ink_scale::raster::RasterBuffer;

pub use capture::{InkChannel, RasterSource};
pub use config::NormalizeConfig;
pub use processing::{
    Classifier, FeatureSink, NoContent, NormalizationPipeline, NormalizationTrace, Normalized,
    PipelineOptions, TargetResolution,
};
pub use session::{NormalizeSession, NormalizeSessionBuilder, SessionReport};

/// Normalize `raster` to `target` with the default ink threshold and rescale policy.
pub fn normalize(raster: &RasterBuffer, target: TargetResolution) -> NormalizeResult<Normalized> {
    NormalizationPipeline::with_target(target).normalize(raster)
}
