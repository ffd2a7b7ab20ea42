//! # Normalization Configuration
//!
//! Configuration structure and validation for ink normalization. It is the
//! common interface between the CLI, JSON configuration files and library
//! callers building a [`NormalizationPipeline`].
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `target_width` | `u32` | ≥ 1 | Feature grid columns |
//! | `target_height` | `u32` | ≥ 1 | Feature grid rows |
//! | `ink_threshold` | `u8` | 0-254 | Samples strictly above this are ink |
//! | `ink_channel` | `InkChannel` | auto / alpha / inverted-luma / luma | Ink signal of color images |
//! | `reject_below` | `f64` | 0-1 | Scale factors below this carry no usable content |
//! | `accept_above` | `f64` | `reject_below`-1 | Scale factors above this skip the crop |
//! | `crop_enlarge` | `f64` | ≥ 1 | Crop window multiplier |
//!
//! ## Examples
//!
//! ```rust
//! use ink_normalize::config::NormalizeConfig;
//!
//! let config = NormalizeConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let pipeline = config.to_pipeline()?;
//! assert_eq!(pipeline.target().len(), 784);
//! # Ok::<(), ink_normalize::error::NormalizeError>(())
//! ```

use std::path::Path;

use ink_scale::extent::InkThreshold;
use ink_scale::policy::RescalePolicy;
use serde::{Deserialize, Serialize};

use crate::capture::InkChannel;
use crate::error::{NormalizeError, NormalizeResult};
use crate::processing::{NormalizationPipeline, PipelineOptions, TargetResolution, validate_policy};

/// Configuration structure for ink normalization.
///
/// Missing fields in a JSON file fall back to [`NormalizeConfig::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Number of feature grid columns (28 for MNIST-style classifiers).
    pub target_width: u32,

    /// Number of feature grid rows.
    pub target_height: u32,

    /// Samples strictly above this value count as ink.
    ///
    /// The default of 0 treats any coverage at all as ink.
    pub ink_threshold: u8,

    /// Which channel of a color image carries the ink signal.
    pub ink_channel: InkChannel,

    /// Scale factors strictly below this are rejected as negligible ink.
    pub reject_below: f64,

    /// Scale factors strictly above this use the centered canvas uncropped.
    pub accept_above: f64,

    /// Multiplier for the crop window in the intermediate range.
    pub crop_enlarge: f64,
}

impl Default for NormalizeConfig {
    /// Defaults match a 28×28 digit classifier fed from a drawing canvas:
    /// threshold 0, automatic ink channel, reject below 0.1, pass through
    /// above 0.7, crop enlargement 1.5.
    fn default() -> Self {
        let policy = RescalePolicy::default();
        Self {
            target_width: TargetResolution::MNIST.width(),
            target_height: TargetResolution::MNIST.height(),
            ink_threshold: 0,
            ink_channel: InkChannel::Auto,
            reject_below: policy.reject_below,
            accept_above: policy.accept_above,
            crop_enlarge: policy.crop_enlarge,
        }
    }
}

impl NormalizeConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> NormalizeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| NormalizeError::io_at("read config", path.display().to_string(), e))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            NormalizeError::from(e)
                .with_context(format!("parsing {}", path.display()))
                .with_recovery_suggestion("Check the file is a JSON object with NormalizeConfig fields")
        })?;
        Ok(config)
    }

    /// Pretty-printed JSON form, suitable for a configuration file.
    pub fn to_json_string(&self) -> NormalizeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The rescale thresholds as the policy type the core consumes.
    pub fn policy(&self) -> RescalePolicy {
        RescalePolicy {
            reject_below: self.reject_below,
            accept_above: self.accept_above,
            crop_enlarge: self.crop_enlarge,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> NormalizeResult<()> {
        TargetResolution::new(self.target_width, self.target_height)?;
        if self.ink_threshold == u8::MAX {
            return Err(NormalizeError::config(
                "ink_threshold",
                self.ink_threshold.to_string(),
                "no sample can exceed 255, so nothing would ever count as ink",
            ));
        }
        validate_policy(&self.policy())
    }

    /// Validate and build the pipeline this configuration describes.
    pub fn to_pipeline(&self) -> NormalizeResult<NormalizationPipeline> {
        self.validate()?;
        NormalizationPipeline::new(PipelineOptions {
            target: TargetResolution::new(self.target_width, self.target_height)?,
            ink: InkThreshold(self.ink_threshold),
            policy: self.policy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = NormalizeConfig::default();
        assert_eq!((config.target_width, config.target_height), (28, 28));
        assert_eq!(config.ink_threshold, 0);
        assert_eq!(config.ink_channel, InkChannel::Auto);
        assert_eq!(config.reject_below, 0.1);
        assert_eq!(config.accept_above, 0.7);
        assert_eq!(config.crop_enlarge, 1.5);
    }

    #[test]
    fn test_config_validation() {
        let mut config = NormalizeConfig::default();
        assert!(config.validate().is_ok());

        config.target_width = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "invalid_target_resolution");
        config.target_width = 28;

        config.ink_threshold = 255;
        assert!(config.validate().is_err());
        config.ink_threshold = 0;

        config.reject_below = 0.8;
        assert!(config.validate().is_err());
        config.reject_below = 0.1;

        config.accept_above = 1.2;
        assert!(config.validate().is_err());
        config.accept_above = 0.7;

        config.crop_enlarge = 0.5;
        assert!(config.validate().is_err());
        config.crop_enlarge = f64::NAN;
        assert!(config.validate().is_err());
        config.crop_enlarge = 1.5;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"target_width": 16, "ink_channel": "inverted-luma"}}"#).unwrap();
        let config = NormalizeConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.target_width, 16);
        assert_eq!(config.target_height, 28);
        assert_eq!(config.ink_channel, InkChannel::InvertedLuma);
    }

    #[test]
    fn test_json_round_trip() {
        let config = NormalizeConfig { crop_enlarge: 1.25, ..NormalizeConfig::default() };
        let text = config.to_json_string().unwrap();
        let back: NormalizeConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = NormalizeConfig::from_json_file(file.path()).unwrap_err();
        assert_eq!(err.category(), "external");
        assert!(err.context().context.as_deref().unwrap_or("").starts_with("parsing"));
    }
}
