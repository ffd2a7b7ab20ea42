//! # Normalization Pipeline
//!
//! Turns a raster snapshot into a fixed-size feature vector or an explicit
//! absence signal.
//!
//! ## Stages
//!
//! 1. **Extent detection**: bounding box of every ink sample; none means
//!    [`NoContent::EmptyExtent`]
//! 2. **Centering**: the extent is translated to the middle of a canvas the size
//!    of the source raster
//! 3. **Rescale policy**: the scale factor picks reject, pass-through or crop;
//!    reject means [`NoContent::RejectedByScale`]
//! 4. **Box-filter downsampling** to the target resolution
//!
//! Every stage is pure. The pipeline keeps no state between calls, so the same
//! raster always yields a bit-identical result, and the downsampler never runs
//! when an absence signal is produced.

use std::fmt;

use ink_scale::boxfilter::{FeatureVector, box_downsample};
use ink_scale::center::center_extent;
use ink_scale::extent::{Extent, InkThreshold, detect_extent};
use ink_scale::policy::{RescalePlan, RescalePolicy, build_plan};
use ink_scale::raster::RasterBuffer;
use tracing::debug;

use crate::error::{NormalizeError, NormalizeResult};

/// Output grid dimensions. Both are at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetResolution {
    width: u32,
    height: u32,
}

impl TargetResolution {
    /// The 28×28 grid of MNIST-trained digit classifiers.
    pub const MNIST: TargetResolution = TargetResolution { width: 28, height: 28 };

    pub fn new(width: u32, height: u32) -> NormalizeResult<Self> {
        if width == 0 || height == 0 {
            return Err(NormalizeError::invalid_target(width, height)
                .with_recovery_suggestion("Use a target of at least 1x1, e.g. 28x28"));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of values in a feature vector of this resolution.
    pub fn len(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for TargetResolution {
    fn default() -> Self {
        Self::MNIST
    }
}

impl fmt::Display for TargetResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for TargetResolution {
    type Err = NormalizeError;

    /// Parses `WxH`, e.g. `28x28`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            NormalizeError::config("target", s, "expected WIDTHxHEIGHT, e.g. 28x28")
        };
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(width, height)
    }
}

/// Check that the rescale thresholds describe a usable policy.
pub fn validate_policy(policy: &RescalePolicy) -> NormalizeResult<()> {
    let RescalePolicy { reject_below, accept_above, crop_enlarge } = *policy;
    if !(0.0..=1.0).contains(&reject_below) {
        return Err(NormalizeError::config(
            "reject_below",
            reject_below.to_string(),
            "must be within [0, 1]",
        ));
    }
    if !(reject_below..=1.0).contains(&accept_above) {
        return Err(NormalizeError::config(
            "accept_above",
            accept_above.to_string(),
            "must be within [reject_below, 1]",
        ));
    }
    if !crop_enlarge.is_finite() || crop_enlarge < 1.0 {
        return Err(NormalizeError::config(
            "crop_enlarge",
            crop_enlarge.to_string(),
            "must be a finite value of at least 1",
        ));
    }
    Ok(())
}

/// Knobs of a [`NormalizationPipeline`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PipelineOptions {
    pub target: TargetResolution,
    pub ink: InkThreshold,
    pub policy: RescalePolicy,
}

/// Why a raster produced no feature vector. Both are normal outcomes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoContent {
    /// Not a single sample passed the ink predicate.
    EmptyExtent,
    /// The ink covers too little of the canvas to be worth classifying.
    RejectedByScale { scale_factor: f64 },
}

impl NoContent {
    pub fn label(&self) -> &'static str {
        match self {
            NoContent::EmptyExtent => "empty_extent",
            NoContent::RejectedByScale { .. } => "rejected_by_scale",
        }
    }
}

impl fmt::Display for NoContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoContent::EmptyExtent => write!(f, "no ink on the canvas"),
            NoContent::RejectedByScale { scale_factor } => {
                write!(f, "ink too small to classify (scale factor {:.3})", scale_factor)
            }
        }
    }
}

/// Result of one normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
    Features(FeatureVector),
    NoContent(NoContent),
}

impl Normalized {
    pub fn features(&self) -> Option<&FeatureVector> {
        match self {
            Normalized::Features(features) => Some(features),
            Normalized::NoContent(_) => None,
        }
    }

    pub fn into_features(self) -> Option<FeatureVector> {
        match self {
            Normalized::Features(features) => Some(features),
            Normalized::NoContent(_) => None,
        }
    }

    pub fn no_content(&self) -> Option<NoContent> {
        match self {
            Normalized::Features(_) => None,
            Normalized::NoContent(reason) => Some(*reason),
        }
    }

    pub fn is_features(&self) -> bool {
        matches!(self, Normalized::Features(_))
    }
}

/// Every intermediate of one normalization, for display consumers and tests.
///
/// Stages after an absence signal are `None`.
#[derive(Clone, Debug)]
pub struct NormalizationTrace {
    pub extent: Option<Extent>,
    pub plan: Option<RescalePlan>,
    /// Source content translated to the canvas center.
    pub centered: Option<RasterBuffer>,
    /// The buffer handed to the downsampler (centered, possibly cropped).
    pub working: Option<RasterBuffer>,
    pub outcome: Normalized,
}

impl NormalizationTrace {
    pub fn scale_factor(&self) -> Option<f64> {
        self.plan.map(|plan| plan.scale_factor())
    }

    fn absent(extent: Option<Extent>, plan: Option<RescalePlan>, centered: Option<RasterBuffer>, reason: NoContent) -> Self {
        Self { extent, plan, centered, working: None, outcome: Normalized::NoContent(reason) }
    }
}

/// Stateless raster-to-features pipeline.
#[derive(Clone, Debug, Default)]
pub struct NormalizationPipeline {
    options: PipelineOptions,
}

impl NormalizationPipeline {
    /// Validate `options` and build the pipeline.
    pub fn new(options: PipelineOptions) -> NormalizeResult<Self> {
        TargetResolution::new(options.target.width(), options.target.height())?;
        validate_policy(&options.policy)?;
        Ok(Self { options })
    }

    /// Pipeline with default thresholds and the given target.
    pub fn with_target(target: TargetResolution) -> Self {
        Self { options: PipelineOptions { target, ..PipelineOptions::default() } }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn target(&self) -> TargetResolution {
        self.options.target
    }

    /// Normalize `raster` into a feature vector or an absence signal.
    pub fn normalize(&self, raster: &RasterBuffer) -> NormalizeResult<Normalized> {
        Ok(self.run(raster, false)?.outcome)
    }

    /// Like [`normalize`](Self::normalize), keeping every intermediate.
    pub fn normalize_traced(&self, raster: &RasterBuffer) -> NormalizeResult<NormalizationTrace> {
        self.run(raster, true)
    }

    /// Shared stage chain. Without `keep_buffers` the centered canvas is moved
    /// into the rescale step and neither buffer is returned.
    fn run(&self, raster: &RasterBuffer, keep_buffers: bool) -> NormalizeResult<NormalizationTrace> {
        let canvas = raster.size();
        let PipelineOptions { target, ink, policy } = self.options;

        let Some(extent) = detect_extent(raster, ink) else {
            debug!(width = canvas.w, height = canvas.h, "no ink detected");
            return Ok(NormalizationTrace::absent(None, None, None, NoContent::EmptyExtent));
        };
        debug!(
            x = extent.x,
            y = extent.y,
            width = extent.width,
            height = extent.height,
            "detected ink extent"
        );

        let centered = center_extent(raster, extent, canvas)?;
        let plan = build_plan(extent, canvas, policy);
        debug!(scale_factor = plan.scale_factor(), plan = plan.label(), "rescale plan");

        let kept_centered = keep_buffers.then(|| centered.clone());
        let Some(working) = plan.apply(centered)? else {
            let reason = NoContent::RejectedByScale { scale_factor: plan.scale_factor() };
            return Ok(NormalizationTrace::absent(Some(extent), Some(plan), kept_centered, reason));
        };

        let features = box_downsample(&working, target.width(), target.height())?;
        debug!(
            src_width = working.width(),
            src_height = working.height(),
            target = %target,
            "downsampled to feature vector"
        );

        Ok(NormalizationTrace {
            extent: Some(extent),
            plan: Some(plan),
            centered: kept_centered,
            working: keep_buffers.then_some(working),
            outcome: Normalized::Features(features),
        })
    }
}
