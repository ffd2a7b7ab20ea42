// SPDX-License-Identifier: MIT
//! # Extent Detection
//!
//! Finds the minimal axis-aligned rectangle enclosing every ink pixel of a raster.
//! A raster without ink has no extent at all: callers get `None` and must treat
//! it as "nothing drawn" rather than as a zero-size box.
//!
//! The scan is a single row-major pass over the raster keeping running
//! `min_x / max_x / min_y / max_y` bounds. The max bounds are kept exclusive
//! (one past the last ink column/row) so that `width = max_x - min_x` counts
//! pixels directly.

use crate::raster::{RasterBuffer, Rect, Size};

/// Minimal bounding box of the ink in raster coordinates.
///
/// Invariant: `x + width <= raster width`, `y + height <= raster height`,
/// `width >= 1`, `height >= 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn to_rect(self) -> Rect {
        Rect { x: self.x, y: self.y, w: self.width, h: self.height }
    }

    pub fn size(self) -> Size {
        Size { w: self.width, h: self.height }
    }

    pub fn contains(self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x - self.x < self.width && y - self.y < self.height
    }
}

/// Ink-presence predicate: a sample is ink when it is strictly above the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct InkThreshold(pub u8);

impl InkThreshold {
    #[inline]
    pub fn is_ink(self, sample: u8) -> bool {
        sample > self.0
    }
}

/// Detect the extent of samples above `threshold`.
pub fn detect_extent(raster: &RasterBuffer, threshold: InkThreshold) -> Option<Extent> {
    detect_extent_by(raster, |s| threshold.is_ink(s))
}

/// Detect the extent of samples matching an arbitrary ink predicate.
///
/// O(width × height), no allocation.
pub fn detect_extent_by<F>(raster: &RasterBuffer, is_ink: F) -> Option<Extent>
where
    F: Fn(u8) -> bool,
{
    let Size { w, h } = raster.size();
    let (mut min_x, mut max_x) = (w, 0u32);
    let (mut min_y, mut max_y) = (h, 0u32);

    for y in 0..h {
        for (x, &sample) in raster.row(y).iter().enumerate() {
            if !is_ink(sample) {
                continue;
            }
            let x = x as u32;
            min_x = min_x.min(x);
            max_x = max_x.max(x + 1);
            min_y = min_y.min(y);
            max_y = max_y.max(y + 1);
        }
    }

    if max_x <= min_x || max_y <= min_y {
        return None;
    }

    Some(Extent { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y })
}
