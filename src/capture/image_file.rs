use std::path::{Path, PathBuf};

use ink_scale::raster::RasterBuffer;
use tracing::debug;

use super::{InkChannel, RasterSource, raster_from_image};
use crate::error::{NormalizeError, NormalizeResult};

/// Raster source backed by an image file, decoded on every snapshot.
pub struct ImageFileSource {
    path: PathBuf,
    channel: InkChannel,
    name: String,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>, channel: InkChannel) -> Self {
        let path = path.into();
        let name = format!("image:{}", path.display());
        Self { path, channel, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RasterSource for ImageFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&mut self) -> NormalizeResult<RasterBuffer> {
        let image = image::open(&self.path).map_err(|e| {
            NormalizeError::source_failed(&self.name, e.to_string())
                .with_operation("decode image")
                .with_recovery_suggestion("Pass a readable PNG, JPEG, BMP or GIF file")
        })?;
        debug!(
            path = %self.path.display(),
            width = image.width(),
            height = image.height(),
            channel = ?self.channel.resolve(&image),
            "decoded raster image"
        );
        raster_from_image(&image, self.channel)
    }
}
