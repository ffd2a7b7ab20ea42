// SPDX-License-Identifier: MIT
//! # Adaptive Rescale Policy
//!
//! Decides what region of the centered working buffer feeds the downsampler,
//! based on how much of the canvas the ink occupies.
//!
//! ## Decision Rule
//!
//! With `scale = max(extent.w / canvas.w, extent.h / canvas.h)`:
//! - **Reject** when `scale < reject_below` (default 0.1): too little ink to classify
//! - **PassThrough** when `scale > accept_above` (default 0.7): the ink already fills the canvas
//! - **Crop** otherwise: keep a window of `ceil(canvas * scale * crop_enlarge)` per axis
//!   (default enlargement 1.5) centered on the canvas
//!
//! Cropping small marks before downsampling makes them cover a larger share of the
//! output grid, so a thin "1" does not collapse into a nearly empty 28×28 vector.
//!
//! The same `scale` drives both axes, so the crop window keeps the canvas aspect
//! ratio and always contains the centered extent.

use crate::center::centering_offset;
use crate::extent::Extent;
use crate::raster::{RasterBuffer, Rect, ScaleError, Size};

/// Thresholds for the reject / pass-through / crop decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RescalePolicy {
    /// Scale factors strictly below this are rejected.
    pub reject_below: f64,
    /// Scale factors strictly above this pass through uncropped.
    pub accept_above: f64,
    /// Multiplier applied to `canvas * scale` to size the crop window.
    pub crop_enlarge: f64,
}

impl Default for RescalePolicy {
    fn default() -> Self {
        Self {
            reject_below: 0.1,
            accept_above: 0.7,
            crop_enlarge: 1.5,
        }
    }
}

/// Outcome of the policy for one extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RescalePlan {
    /// Ink is negligible; nothing should be downsampled.
    Reject { scale_factor: f64 },
    /// Use the full centered canvas unchanged.
    PassThrough { scale_factor: f64 },
    /// Crop the centered canvas to `window` before downsampling.
    Crop { scale_factor: f64, window: Rect },
}

impl RescalePlan {
    pub fn scale_factor(&self) -> f64 {
        match *self {
            RescalePlan::Reject { scale_factor }
            | RescalePlan::PassThrough { scale_factor }
            | RescalePlan::Crop { scale_factor, .. } => scale_factor,
        }
    }

    /// Short lowercase label, used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            RescalePlan::Reject { .. } => "reject",
            RescalePlan::PassThrough { .. } => "pass_through",
            RescalePlan::Crop { .. } => "crop",
        }
    }

    /// Turn the centered buffer into the final working buffer.
    ///
    /// Returns `Ok(None)` for [`RescalePlan::Reject`].
    pub fn apply(&self, centered: RasterBuffer) -> Result<Option<RasterBuffer>, ScaleError> {
        match self {
            RescalePlan::Reject { .. } => Ok(None),
            RescalePlan::PassThrough { .. } => Ok(Some(centered)),
            RescalePlan::Crop { window, .. } => centered.crop(*window).map(Some),
        }
    }
}

/// Fraction of the canvas covered by the extent along its dominant axis, in `[0, 1]`.
pub fn scale_factor(extent: Extent, canvas: Size) -> f64 {
    let sx = f64::from(extent.width) / f64::from(canvas.w.max(1));
    let sy = f64::from(extent.height) / f64::from(canvas.h.max(1));
    sx.max(sy).min(1.0)
}

const WHOLE_EPSILON: f64 = 1e-9;

/// Enlarged crop window of `ceil(canvas * scale * enlarge)` per axis, clamped to
/// `[1, canvas]` and centered on the canvas.
pub fn crop_window(canvas: Size, scale: f64, enlarge: f64) -> Rect {
    let side = |len: u32| -> u32 {
        let want = f64::from(len) * scale * enlarge;
        // `scale` is a rounded ratio; a product that should be whole may land a few ulps above it.
        let nearest = want.round();
        let want = if (want - nearest).abs() <= WHOLE_EPSILON * nearest.max(1.0) { nearest } else { want.ceil() };
        (want.max(1.0) as u32).min(len)
    };
    let (w, h) = (side(canvas.w), side(canvas.h));
    let (x, y) = centering_offset(Size { w, h }, canvas);
    Rect { x: x as u32, y: y as u32, w, h }
}

/// Compute the plan for an extent detected on a `canvas`-sized raster.
///
/// O(1).
pub fn build_plan(extent: Extent, canvas: Size, policy: RescalePolicy) -> RescalePlan {
    let scale_factor = scale_factor(extent, canvas);
    if scale_factor < policy.reject_below {
        RescalePlan::Reject { scale_factor }
    } else if scale_factor > policy.accept_above {
        RescalePlan::PassThrough { scale_factor }
    } else {
        RescalePlan::Crop {
            scale_factor,
            window: crop_window(canvas, scale_factor, policy.crop_enlarge),
        }
    }
}
