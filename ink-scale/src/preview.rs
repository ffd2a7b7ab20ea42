// SPDX-License-Identifier: MIT
//! # Display Views of a Feature Vector
//!
//! Read-only renderings for the tile-grid and console consumers. Nothing here
//! feeds back into normalization.
//!
//! - [`render_ascii`]: one text row per output row, denser glyphs for heavier ink
//! - [`magnify`]: nearest-neighbour upscale so each cell becomes a visible tile

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8;
use fir::{ResizeAlg, ResizeOptions, Resizer};

use crate::boxfilter::FeatureVector;
use crate::raster::{RasterBuffer, ScaleError};

/// Background to full ink.
const GLYPH_RAMP: &[u8; 10] = b"`.:-=+*#%@";

#[inline]
fn glyph(value: u8) -> char {
    let idx = (usize::from(value) * GLYPH_RAMP.len()) / 256;
    GLYPH_RAMP[idx] as char
}

/// Render the vector as text, one line per row (trailing newline included).
pub fn render_ascii(features: &FeatureVector) -> String {
    let w = features.width() as usize;
    let mut out = String::with_capacity((w + 1) * features.height() as usize);
    for row in features.values().chunks(w.max(1)) {
        out.extend(row.iter().map(|&v| glyph(v)));
        out.push('\n');
    }
    out
}

/// Upscale every cell to a `scale × scale` tile using nearest-neighbour sampling.
///
/// `resizer` can be reused across calls.
pub fn magnify(resizer: &mut Resizer, features: &FeatureVector, scale: u32) -> Result<RasterBuffer, ScaleError> {
    let out_w = features.width().saturating_mul(scale);
    let out_h = features.height().saturating_mul(scale);
    if out_w == 0 || out_h == 0 {
        return Err(ScaleError::InvalidTargetResolution { w: out_w, h: out_h });
    }

    let src_view = TypedImageRef::<U8>::from_buffer(features.width(), features.height(), features.values())?;
    let mut dst = vec![0u8; (out_w as usize) * (out_h as usize)];
    {
        let mut dst_image = TypedImage::<U8>::from_buffer(out_w, out_h, &mut dst)?;
        let opts = ResizeOptions::new().resize_alg(ResizeAlg::Nearest);
        resizer.resize_typed::<U8>(&src_view, &mut dst_image, &opts)?;
    }

    RasterBuffer::from_vec(out_w, out_h, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxfilter::box_downsample;

    fn features(w: u32, h: u32, values: Vec<u8>) -> FeatureVector {
        let raster = RasterBuffer::from_vec(w, h, values).unwrap();
        box_downsample(&raster, w, h).unwrap()
    }

    #[test]
    fn ascii_has_one_line_per_row() {
        let fv = features(3, 2, vec![0, 128, 255, 255, 0, 25]);
        let text = render_ascii(&fv);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["`+@", "@``"]);
    }

    #[test]
    fn glyphs_cover_full_range() {
        assert_eq!(glyph(0), '`');
        assert_eq!(glyph(255), '@');
        assert_eq!(glyph(25), '`');
        assert_eq!(glyph(26), '.');
    }

    #[test]
    fn magnify_repeats_cells_as_tiles() {
        let fv = features(2, 1, vec![10, 200]);
        let mut resizer = Resizer::new();
        let big = magnify(&mut resizer, &fv, 3).unwrap();
        assert_eq!((big.width(), big.height()), (6, 3));
        for y in 0..3 {
            assert_eq!(big.row(y), &[10, 10, 10, 200, 200, 200]);
        }
    }

    #[test]
    fn magnify_rejects_zero_scale() {
        let fv = features(2, 2, vec![0; 4]);
        assert!(magnify(&mut Resizer::new(), &fv, 0).is_err());
    }
}
