//! # Stroke Canvas
//!
//! In-memory drawing surface standing in for pointer capture. Polylines are
//! rasterized as round-capped strokes by stamping filled discs along each
//! segment; covered pixels get full coverage (255), everything else stays 0.
//!
//! [`StrokeScript`] is the JSON form used by the CLI:
//!
//! ```json
//! { "width": 280, "height": 280, "line_width": 16,
//!   "strokes": [[[140, 40], [140, 240]]] }
//! ```

use std::path::Path;

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;
use ink_scale::raster::RasterBuffer;
use serde::{Deserialize, Serialize};

use super::RasterSource;
use crate::error::{NormalizeError, NormalizeResult};

pub const DEFAULT_CANVAS_SIDE: u32 = 280;
pub const DEFAULT_LINE_WIDTH: u32 = 16;

const INK: Luma<u8> = Luma([255]);

/// Drawing surface accumulating strokes into a coverage raster.
pub struct StrokeCanvas {
    surface: GrayImage,
    line_width: u32,
}

impl Default for StrokeCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIDE, DEFAULT_CANVAS_SIDE)
    }
}

impl StrokeCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: GrayImage::new(width, height),
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    pub fn with_line_width(mut self, line_width: u32) -> Self {
        self.line_width = line_width.max(1);
        self
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Erase everything drawn so far.
    pub fn clear(&mut self) {
        self.surface.pixels_mut().for_each(|p| *p = Luma([0]));
    }

    /// Draw one round-capped segment.
    pub fn draw_segment(&mut self, from: (f32, f32), to: (f32, f32)) {
        let radius = (self.line_width / 2) as i32;
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.hypot(dy).ceil().max(1.0) as u32;
        for k in 0..=steps {
            let t = k as f32 / steps as f32;
            let center = ((from.0 + dx * t).round() as i32, (from.1 + dy * t).round() as i32);
            draw_filled_circle_mut(&mut self.surface, center, radius, INK);
        }
    }

    /// Draw a connected polyline. A single point leaves a dot.
    pub fn draw_polyline(&mut self, points: &[(f32, f32)]) {
        match points {
            [] => {}
            [only] => self.draw_segment(*only, *only),
            _ => {
                for pair in points.windows(2) {
                    self.draw_segment(pair[0], pair[1]);
                }
            }
        }
    }

    /// Copy the current surface.
    pub fn to_raster(&self) -> NormalizeResult<RasterBuffer> {
        Ok(RasterBuffer::from_vec(
            self.surface.width(),
            self.surface.height(),
            self.surface.as_raw().clone(),
        )?)
    }
}

impl RasterSource for StrokeCanvas {
    fn name(&self) -> &str {
        "stroke-canvas"
    }

    fn snapshot(&mut self) -> NormalizeResult<RasterBuffer> {
        self.to_raster()
    }
}

/// Serializable description of a drawing session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeScript {
    #[serde(default = "default_side")]
    pub width: u32,
    #[serde(default = "default_side")]
    pub height: u32,
    #[serde(default = "default_line_width")]
    pub line_width: u32,
    /// Each stroke is a polyline of `[x, y]` points.
    pub strokes: Vec<Vec<[f32; 2]>>,
}

fn default_side() -> u32 {
    DEFAULT_CANVAS_SIDE
}

fn default_line_width() -> u32 {
    DEFAULT_LINE_WIDTH
}

impl StrokeScript {
    pub fn from_json_str(json: &str) -> NormalizeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> NormalizeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| NormalizeError::io_at("read stroke script", path.display().to_string(), e))?;
        Self::from_json_str(&text).map_err(|e| e.with_context(format!("parsing {}", path.display())))
    }

    /// Replay the strokes onto a fresh canvas.
    pub fn render(&self) -> NormalizeResult<StrokeCanvas> {
        if self.width == 0 || self.height == 0 {
            return Err(NormalizeError::config(
                "width/height",
                format!("{}x{}", self.width, self.height),
                "stroke canvas dimensions must be non-zero",
            ));
        }
        let mut canvas = StrokeCanvas::new(self.width, self.height).with_line_width(self.line_width);
        for stroke in &self.strokes {
            let points: Vec<(f32, f32)> = stroke.iter().map(|p| (p[0], p[1])).collect();
            canvas.draw_polyline(&points);
        }
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink_scale::extent::{detect_extent, InkThreshold};

    #[test]
    fn empty_canvas_has_no_ink() {
        let mut canvas = StrokeCanvas::default();
        let raster = canvas.snapshot().unwrap();
        assert_eq!((raster.width(), raster.height()), (280, 280));
        assert!(raster.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn vertical_stroke_has_line_width_thickness() {
        let mut canvas = StrokeCanvas::new(100, 100).with_line_width(10);
        canvas.draw_polyline(&[(50.0, 20.0), (50.0, 80.0)]);
        let raster = canvas.to_raster().unwrap();
        let extent = detect_extent(&raster, InkThreshold::default()).unwrap();
        assert_eq!((extent.x, extent.width), (45, 11));
        assert_eq!((extent.y, extent.height), (15, 71));
    }

    #[test]
    fn clear_erases_strokes() {
        let mut canvas = StrokeCanvas::new(20, 20);
        canvas.draw_polyline(&[(10.0, 10.0)]);
        assert!(canvas.to_raster().unwrap().samples().iter().any(|&s| s > 0));
        canvas.clear();
        assert!(canvas.to_raster().unwrap().samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn script_defaults_and_render() {
        let script = StrokeScript::from_json_str(r#"{"strokes": [[[10, 10], [30, 10]]]}"#).unwrap();
        assert_eq!((script.width, script.height, script.line_width), (280, 280, 16));
        let canvas = script.render().unwrap();
        let raster = canvas.to_raster().unwrap();
        assert!(detect_extent(&raster, InkThreshold::default()).is_some());
    }

    #[test]
    fn script_rejects_zero_canvas() {
        let script = StrokeScript { width: 0, height: 10, line_width: 4, strokes: vec![] };
        assert!(script.render().is_err());
    }
}
