// SPDX-License-Identifier: MIT
// Box-filter (area-average) downsampler.
// Non-overlapping windows of floor(src / target) samples per output cell.

use crate::raster::{RasterBuffer, ScaleError, Size};

/// Fixed-length row-major intensity vector produced by [`box_downsample`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureVector {
    size: Size,
    values: Vec<u8>,
}

impl FeatureVector {
    pub fn width(&self) -> u32 { self.size.w }
    pub fn height(&self) -> u32 { self.size.h }
    pub fn size(&self) -> Size { self.size }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
    pub fn values(&self) -> &[u8] { &self.values }
    pub fn into_vec(self) -> Vec<u8> { self.values }

    /// Value of output cell `(i, j)`.
    pub fn get(&self, i: u32, j: u32) -> Option<u8> {
        if i < self.size.w && j < self.size.h {
            Some(self.values[(j as usize) * (self.size.w as usize) + i as usize])
        } else {
            None
        }
    }

    /// Values scaled to `[0.0, 1.0]`, the usual classifier input range.
    pub fn to_unit_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| f32::from(v) / 255.0).collect()
    }
}

/// Sample window extent per output cell along one axis: `max(1, floor(src / target))`.
#[inline]
pub fn window_len(src: u32, target: u32) -> u32 {
    (src / target).max(1)
}

/// Downsample `src` to `target_w × target_h` by averaging non-overlapping windows.
///
/// Cell `(i, j)` averages the `wsamp × hsamp` window starting at
/// `(i * wsamp, j * hsamp)`. Windows reaching past the source edge only average
/// their in-bounds samples; a window entirely outside the source yields 0.
/// Averages are rounded half up.
///
/// # Errors
/// [`ScaleError::InvalidTargetResolution`] when either target dimension is zero.
pub fn box_downsample(src: &RasterBuffer, target_w: u32, target_h: u32) -> Result<FeatureVector, ScaleError> {
    if target_w == 0 || target_h == 0 {
        return Err(ScaleError::InvalidTargetResolution { w: target_w, h: target_h });
    }

    let Size { w: src_w, h: src_h } = src.size();
    let wsamp = window_len(src_w, target_w);
    let hsamp = window_len(src_h, target_h);
    let mut values = Vec::with_capacity((target_w as usize) * (target_h as usize));

    for j in 0..target_h {
        let y0 = u64::from(j) * u64::from(hsamp);
        let y1 = (y0 + u64::from(hsamp)).min(u64::from(src_h));
        for i in 0..target_w {
            let x0 = u64::from(i) * u64::from(wsamp);
            let x1 = (x0 + u64::from(wsamp)).min(u64::from(src_w));
            if x0 >= x1 || y0 >= y1 {
                values.push(0);
                continue;
            }

            let mut sum = 0u64;
            for y in y0..y1 {
                let row = src.row(y as u32);
                sum += row[x0 as usize..x1 as usize].iter().map(|&s| u64::from(s)).sum::<u64>();
            }
            let count = (x1 - x0) * (y1 - y0);
            values.push(((2 * sum + count) / (2 * count)) as u8);
        }
    }

    Ok(FeatureVector { size: Size { w: target_w, h: target_h }, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_length_matches_target() {
        let src = RasterBuffer::zeroed(Size::new(280, 280)).unwrap();
        for &(w, h) in &[(28, 28), (1, 1), (7, 13), (280, 280), (300, 10)] {
            let fv = box_downsample(&src, w, h).unwrap();
            assert_eq!(fv.len(), (w * h) as usize);
            assert_eq!(fv.size(), Size::new(w, h));
        }
    }

    #[test]
    fn averages_two_by_two_windows() {
        #[rustfmt::skip]
        let samples = vec![
            0, 255,  10, 10,
            255, 0,  10, 11,
            1, 1,    255, 255,
            1, 2,    255, 255,
        ];
        let src = RasterBuffer::from_vec(4, 4, samples).unwrap();
        let fv = box_downsample(&src, 2, 2).unwrap();
        // 510/4 = 127.5 -> 128, 41/4 = 10.25 -> 10, 5/4 = 1.25 -> 1
        assert_eq!(fv.values(), &[128, 10, 1, 255]);
    }

    #[test]
    fn remainder_columns_are_ignored() {
        // 5 / 2 -> windows of 2; column 4 never sampled.
        let samples = vec![100, 100, 50, 50, 255];
        let src = RasterBuffer::from_vec(5, 1, samples).unwrap();
        let fv = box_downsample(&src, 2, 1).unwrap();
        assert_eq!(fv.values(), &[100, 50]);
    }

    #[test]
    fn upsampling_clips_at_source_edge() {
        let src = RasterBuffer::from_vec(2, 1, vec![40, 80]).unwrap();
        let fv = box_downsample(&src, 4, 2).unwrap();
        assert_eq!(fv.values(), &[40, 80, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn full_ink_stays_full() {
        let src = RasterBuffer::from_vec(280, 280, vec![255; 280 * 280]).unwrap();
        let fv = box_downsample(&src, 28, 28).unwrap();
        assert!(fv.values().iter().all(|&v| v == 255));
    }

    #[test]
    fn zero_target_is_rejected() {
        let src = RasterBuffer::zeroed(Size::new(8, 8)).unwrap();
        assert!(matches!(
            box_downsample(&src, 0, 28),
            Err(ScaleError::InvalidTargetResolution { w: 0, h: 28 })
        ));
    }

    #[test]
    fn unit_range_conversion() {
        let src = RasterBuffer::from_vec(2, 1, vec![0, 255]).unwrap();
        let fv = box_downsample(&src, 2, 1).unwrap();
        assert_eq!(fv.to_unit_f32(), vec![0.0, 1.0]);
        assert_eq!(fv.get(1, 0), Some(255));
        assert_eq!(fv.get(2, 0), None);
    }
}
