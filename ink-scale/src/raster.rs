// SPDX-License-Identifier: MIT
// Row-major u8 rasters plus the error type shared by every stage.

use fast_image_resize as fir;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Number of samples a raster of this size holds.
    pub fn area(self) -> usize {
        (self.w as usize) * (self.h as usize)
    }
}

/// Rectangle in raster pixel coordinates; `x + w` and `y + h` are exclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn fits_within(&self, size: Size) -> bool {
        self.w > 0
            && self.h > 0
            && u64::from(self.x) + u64::from(self.w) <= u64::from(size.w)
            && u64::from(self.y) + u64::from(self.h) <= u64::from(size.h)
    }
}

#[derive(Debug)]
pub enum ScaleError {
    ZeroDimension { w: u32, h: u32 },
    SampleCountMismatch { expected: usize, actual: usize },
    InvalidTargetResolution { w: u32, h: u32 },
    CropOutOfBounds { rect: Rect, size: Size },
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::ZeroDimension { w, h } => write!(f, "Raster dimensions must be non-zero (got {}x{})", w, h),
            ScaleError::SampleCountMismatch { expected, actual } => {
                write!(f, "Raster expects {} samples but {} were supplied", expected, actual)
            }
            ScaleError::InvalidTargetResolution { w, h } => {
                write!(f, "Target resolution must be at least 1x1 (got {}x{})", w, h)
            }
            ScaleError::CropOutOfBounds { rect, size } => write!(
                f,
                "Crop window {}x{}+{}+{} exceeds {}x{} raster",
                rect.w, rect.h, rect.x, rect.y, size.w, size.h
            ),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}

/// Immutable width×height grid of intensity samples in `[0, 255]`, row-major.
///
/// Every stage reads a `RasterBuffer` and produces a new one, so a buffer is
/// never shared between two normalization requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    size: Size,
    samples: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap tightly packed samples. Fails on zero dimensions or a length mismatch.
    pub fn from_vec(w: u32, h: u32, samples: Vec<u8>) -> Result<Self, ScaleError> {
        if w == 0 || h == 0 {
            return Err(ScaleError::ZeroDimension { w, h });
        }
        let size = Size { w, h };
        if samples.len() != size.area() {
            return Err(ScaleError::SampleCountMismatch { expected: size.area(), actual: samples.len() });
        }
        Ok(Self { size, samples })
    }

    /// All-background buffer of the given size.
    pub fn zeroed(size: Size) -> Result<Self, ScaleError> {
        Self::from_vec(size.w, size.h, vec![0; size.area()])
    }

    pub fn width(&self) -> u32 { self.size.w }
    pub fn height(&self) -> u32 { self.size.h }
    pub fn size(&self) -> Size { self.size }
    pub fn samples(&self) -> &[u8] { &self.samples }
    pub fn into_vec(self) -> Vec<u8> { self.samples }

    /// Sample at `(x, y)`, or `None` outside the raster.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.size.w && y < self.size.h {
            Some(self.samples[self.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = (y as usize) * (self.size.w as usize);
        &self.samples[start..start + self.size.w as usize]
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.size.w as usize) + x as usize
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// Copy the `rect` sub-region into a new tightly packed buffer.
    pub fn crop(&self, rect: Rect) -> Result<Self, ScaleError> {
        if !rect.fits_within(self.size) {
            return Err(ScaleError::CropOutOfBounds { rect, size: self.size });
        }
        let row_len = rect.w as usize;
        let mut out = Vec::with_capacity(row_len * rect.h as usize);
        for y in rect.y..rect.y + rect.h {
            let off = self.index(rect.x, y);
            out.extend_from_slice(&self.samples[off..off + row_len]);
        }
        Self::from_vec(rect.w, rect.h, out)
    }
}
