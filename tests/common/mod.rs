//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use ink_normalize::error::NormalizeResult;
use ink_normalize::processing::FeatureSink;
use ink_normalize::{FeatureVector, RasterBuffer};

/// Canvas side of the drawing surface the defaults are tuned for.
pub const CANVAS: u32 = 280;

/// A `w`×`h` raster with a fully opaque rectangle at `(x, y)` of `rw`×`rh`.
pub fn raster_with_rect(w: u32, h: u32, x: u32, y: u32, rw: u32, rh: u32) -> RasterBuffer {
    let mut samples = vec![0u8; (w * h) as usize];
    for row in y..y + rh {
        for col in x..x + rw {
            samples[(row * w + col) as usize] = 255;
        }
    }
    RasterBuffer::from_vec(w, h, samples).expect("valid raster")
}

pub fn canvas_with_square(x: u32, y: u32, side: u32) -> RasterBuffer {
    raster_with_rect(CANVAS, CANVAS, x, y, side, side)
}

/// Deterministic sparse noise: roughly one sample in `one_in` is ink.
pub fn speckled_raster(w: u32, h: u32, seed: u64, one_in: u64) -> RasterBuffer {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let samples = (0..w * h)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            if (state >> 33) % one_in == 0 { ((state >> 17) as u8).max(1) } else { 0 }
        })
        .collect();
    RasterBuffer::from_vec(w, h, samples).expect("valid raster")
}

/// Sink that records every vector it receives.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub received: Rc<RefCell<Vec<(FeatureVector, Option<Vec<f32>>)>>>,
}

impl FeatureSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn consume(&mut self, features: &FeatureVector, distribution: Option<&[f32]>) -> NormalizeResult<()> {
        self.received
            .borrow_mut()
            .push((features.clone(), distribution.map(<[f32]>::to_vec)));
        Ok(())
    }
}
