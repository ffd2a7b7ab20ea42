//! # IDX Image Sets
//!
//! Memory-mapped reader for IDX files, the container used by the MNIST digit
//! datasets. Handy for checking the pipeline against rasters a classifier was
//! trained on.
//!
//! ## Format
//!
//! | Offset | Size | Content |
//! |--------|------|---------|
//! | 0 | 2 | zero bytes |
//! | 2 | 1 | element type (`0x08` = unsigned byte) |
//! | 3 | 1 | number of dimensions `n` |
//! | 4 | 4·n | dimension sizes, big-endian `u32` |
//! | 4 + 4·n | ... | payload, row-major |
//!
//! Image sets have three dimensions: `(count, rows, cols)`. MNIST stores light
//! ink on a dark background, so samples are used as the ink signal unchanged.

use std::fs::File;
use std::path::{Path, PathBuf};

use ink_scale::raster::RasterBuffer;
use memmap2::Mmap;
use tracing::debug;

use super::RasterSource;
use crate::error::{NormalizeError, NormalizeResult};

const TYPE_UNSIGNED_BYTE: u8 = 0x08;

/// Raster source yielding one image of an IDX image set.
pub struct IdxImageSource {
    path: PathBuf,
    name: String,
    mmap: Mmap,
    count: usize,
    rows: u32,
    cols: u32,
    payload_offset: usize,
    index: usize,
}

impl IdxImageSource {
    /// Map `path` and validate its header. The source starts at image 0.
    pub fn open(path: impl AsRef<Path>) -> NormalizeResult<Self> {
        let path = path.as_ref().to_path_buf();
        let name = format!("idx:{}", path.display());
        let file = File::open(&path)
            .map_err(|e| NormalizeError::io_at("open IDX file", path.display().to_string(), e))?;
        // The mapping is read-only and the file is not expected to change while mapped.
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| NormalizeError::io_at("map IDX file", path.display().to_string(), e))?;

        let header = parse_header(&mmap).map_err(|reason| {
            NormalizeError::source_failed(&name, reason)
                .with_operation("parse IDX header")
                .with_recovery_suggestion("Use an unsigned-byte image set such as t10k-images-idx3-ubyte")
        })?;

        debug!(
            path = %path.display(),
            count = header.count,
            rows = header.rows,
            cols = header.cols,
            "mapped IDX image set"
        );

        Ok(Self {
            path,
            name,
            mmap,
            count: header.count,
            rows: header.rows,
            cols: header.cols,
            payload_offset: header.payload_offset,
            index: 0,
        })
    }

    /// Number of images in the set.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Image dimensions as `(cols, rows)`.
    pub fn image_size(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    /// Choose which image subsequent snapshots return.
    pub fn select(&mut self, index: usize) -> NormalizeResult<()> {
        if index >= self.count {
            return Err(NormalizeError::source_failed(
                &self.name,
                format!("index {} out of range (set holds {} images)", index, self.count),
            )
            .with_metadata("index", index.to_string()));
        }
        self.index = index;
        Ok(())
    }

    /// Copy image `index` into a raster.
    pub fn read_at(&self, index: usize) -> NormalizeResult<RasterBuffer> {
        if index >= self.count {
            return Err(NormalizeError::source_failed(
                &self.name,
                format!("index {} out of range (set holds {} images)", index, self.count),
            ));
        }
        let image_len = (self.rows as usize) * (self.cols as usize);
        let start = self.payload_offset + index * image_len;
        let samples = self.mmap[start..start + image_len].to_vec();
        Ok(RasterBuffer::from_vec(self.cols, self.rows, samples)?)
    }
}

impl RasterSource for IdxImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&mut self) -> NormalizeResult<RasterBuffer> {
        self.read_at(self.index)
    }
}

struct IdxHeader {
    count: usize,
    rows: u32,
    cols: u32,
    payload_offset: usize,
}

fn parse_header(bytes: &[u8]) -> Result<IdxHeader, String> {
    if bytes.len() < 4 {
        return Err(format!("file too short for an IDX header ({} bytes)", bytes.len()));
    }
    if bytes[0] != 0 || bytes[1] != 0 {
        return Err("bad magic: first two bytes must be zero".to_string());
    }
    if bytes[2] != TYPE_UNSIGNED_BYTE {
        return Err(format!("unsupported element type 0x{:02x}, expected unsigned byte", bytes[2]));
    }
    let ndims = bytes[3] as usize;
    if ndims != 3 {
        return Err(format!("expected 3 dimensions (count, rows, cols), found {}", ndims));
    }

    let payload_offset = 4 + 4 * ndims;
    if bytes.len() < payload_offset {
        return Err("truncated dimension table".to_string());
    }
    let dim = |i: usize| {
        let off = 4 + 4 * i;
        u32::from_be_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
    };
    let (count, rows, cols) = (dim(0) as usize, dim(1), dim(2));
    if rows == 0 || cols == 0 {
        return Err(format!("image dimensions must be non-zero (got {}x{})", cols, rows));
    }

    let needed = count
        .checked_mul(rows as usize)
        .and_then(|n| n.checked_mul(cols as usize))
        .and_then(|n| n.checked_add(payload_offset))
        .ok_or_else(|| "dimension table overflows".to_string())?;
    if bytes.len() < needed {
        return Err(format!("payload truncated: need {} bytes, file has {}", needed, bytes.len()));
    }

    Ok(IdxHeader { count, rows, cols, payload_offset })
}
