// SPDX-License-Identifier: MIT
// Centering projector: pure translation of the extent into a zero-filled canvas.

use crate::extent::Extent;
use crate::raster::{RasterBuffer, ScaleError, Size};

/// Top-left offset that centers a `content` box inside `canvas`, per axis.
///
/// Negative when the content is larger than the canvas along that axis.
#[inline]
pub fn centering_offset(content: Size, canvas: Size) -> (i64, i64) {
    let start_x = (i64::from(canvas.w) - i64::from(content.w)).div_euclid(2);
    let start_y = (i64::from(canvas.h) - i64::from(content.h)).div_euclid(2);
    (start_x, start_y)
}

/// Copy the extent of `source` into a new `canvas`-sized buffer so that the
/// extent sits at `floor((canvas - extent) / 2)` on each axis.
///
/// Pixels outside the translated extent are background (0). Content that would
/// land outside the canvas is dropped.
pub fn center_extent(source: &RasterBuffer, extent: Extent, canvas: Size) -> Result<RasterBuffer, ScaleError> {
    let mut out = RasterBuffer::zeroed(canvas)?;
    let (start_x, start_y) = centering_offset(extent.size(), canvas);

    // Columns i of the extent with 0 <= start_x + i < canvas.w and inside the source.
    let src_w = i64::from(source.width());
    let i_lo = (-start_x).max(0);
    let i_hi = i64::from(extent.width)
        .min(i64::from(canvas.w) - start_x)
        .min(src_w - i64::from(extent.x));
    if i_hi <= i_lo {
        return Ok(out);
    }

    for j in 0..i64::from(extent.height) {
        let dst_y = start_y + j;
        let src_y = i64::from(extent.y) + j;
        if dst_y < 0 || dst_y >= i64::from(canvas.h) || src_y >= i64::from(source.height()) {
            continue;
        }
        let src_row = source.row(src_y as u32);
        let src_from = (i64::from(extent.x) + i_lo) as usize;
        let src_to = (i64::from(extent.x) + i_hi) as usize;
        let dst_off = out.index((start_x + i_lo) as u32, dst_y as u32);
        let len = src_to - src_from;
        out.samples_mut()[dst_off..dst_off + len].copy_from_slice(&src_row[src_from..src_to]);
    }

    Ok(out)
}
