//! # Raster Sources
//!
//! Producers of [`RasterBuffer`] snapshots. The normalization core never talks to
//! an input device; it asks a [`RasterSource`] for the current surface and works
//! on that copy.
//!
//! - [`image_file`]: decoded image files (PNG, JPEG, ...)
//! - [`idx`]: memory-mapped IDX image sets (the MNIST file format)
//! - [`strokes`]: an in-memory drawing surface fed with polylines

pub mod idx;
pub mod image_file;
pub mod strokes;

use image::DynamicImage;
use ink_scale::raster::RasterBuffer;
use serde::{Deserialize, Serialize};

use crate::error::NormalizeResult;

pub use idx::IdxImageSource;
pub use image_file::ImageFileSource;
pub use strokes::{StrokeCanvas, StrokeScript};

/// Abstract interface for raster producers.
/// Enables pluggable input surfaces (files, datasets, drawing canvases).
pub trait RasterSource {
    /// Human-readable name used in logs, reports and errors.
    fn name(&self) -> &str;
    /// Snapshot the current surface.
    fn snapshot(&mut self) -> NormalizeResult<RasterBuffer>;
}

impl<S: RasterSource + ?Sized> RasterSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn snapshot(&mut self) -> NormalizeResult<RasterBuffer> {
        (**self).snapshot()
    }
}

/// Which channel of a color image carries the ink signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InkChannel {
    /// Alpha when the image has one, inverted luma otherwise.
    #[default]
    Auto,
    /// Alpha/coverage, as stored by a transparent drawing canvas.
    Alpha,
    /// Dark ink on light paper.
    InvertedLuma,
    /// Light ink on a dark background (MNIST polarity).
    Luma,
}

impl InkChannel {
    /// Resolve `Auto` against a concrete image.
    pub fn resolve(self, image: &DynamicImage) -> InkChannel {
        match self {
            InkChannel::Auto if image.color().has_alpha() => InkChannel::Alpha,
            InkChannel::Auto => InkChannel::InvertedLuma,
            other => other,
        }
    }
}

/// Extract the ink signal of `image` into a single-channel raster.
pub fn raster_from_image(image: &DynamicImage, channel: InkChannel) -> NormalizeResult<RasterBuffer> {
    let (w, h) = (image.width(), image.height());
    let samples: Vec<u8> = match channel.resolve(image) {
        InkChannel::Alpha => image.to_rgba8().pixels().map(|p| p.0[3]).collect(),
        InkChannel::InvertedLuma => image.to_luma8().into_raw().into_iter().map(|l| 255 - l).collect(),
        InkChannel::Luma | InkChannel::Auto => image.to_luma8().into_raw(),
    };
    Ok(RasterBuffer::from_vec(w, h, samples)?)
}
