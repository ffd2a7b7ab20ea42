// SPDX-License-Identifier: MIT
//! # ink-scale: Position and Scale Normalization for Ink Rasters
//!
//! This crate turns a raster of freehand ink into a fixed-resolution grayscale
//! feature vector, the input shape expected by small digit classifiers
//! (28×28 for MNIST-style networks).
//!
//! ## Pipeline
//!
//! The stages are pure functions over owned buffers and run in this order:
//! 1. [`extent::detect_extent`]: minimal bounding box of all ink pixels
//! 2. [`center::center_extent`]: translate that box to the middle of the canvas
//! 3. [`policy::build_plan`]: reject, pass through, or crop to an enlarged window
//! 4. [`boxfilter::box_downsample`]: area-average down to the target resolution
//!
//! The orchestration (absence signals, logging, collaborators) lives in the
//! `ink_normalize` crate; everything here is deterministic and allocation-bounded.
//!
//! ## Key Components
//!
//! - [`raster`]: `RasterBuffer`, `Size`, `Rect` and the crate error type
//! - [`extent`]: bounding box detection with a threshold ink predicate
//! - [`center`]: pure translation into a zero-filled working buffer
//! - [`policy`]: scale factor and the reject / pass-through / crop decision
//! - [`boxfilter`]: non-overlapping box-filter downsampling into a `FeatureVector`
//! - [`preview`]: ASCII and nearest-neighbour magnified views for display
//!
//! ## Usage Example
//!
//! ```rust
//! use ink_scale::boxfilter::box_downsample;
//! use ink_scale::center::center_extent;
//! use ink_scale::extent::{detect_extent, InkThreshold};
//! use ink_scale::policy::{build_plan, RescalePlan, RescalePolicy};
//! use ink_scale::raster::RasterBuffer;
//!
//! let mut samples = vec![0u8; 280 * 280];
//! for y in 100..180 {
//!     for x in 100..180 {
//!         samples[y * 280 + x] = 255;
//!     }
//! }
//! let raster = RasterBuffer::from_vec(280, 280, samples)?;
//!
//! let extent = detect_extent(&raster, InkThreshold::default()).expect("ink present");
//! let centered = center_extent(&raster, extent, raster.size())?;
//! let plan = build_plan(extent, raster.size(), RescalePolicy::default());
//! assert!(matches!(plan, RescalePlan::Crop { .. }));
//! let working = plan.apply(centered)?.expect("cropped, not rejected");
//! let features = box_downsample(&working, 28, 28)?;
//! assert_eq!(features.len(), 784);
//! # Ok::<(), ink_scale::raster::ScaleError>(())
//! ```

pub mod boxfilter;
pub mod center;
pub mod extent;
pub mod policy;
pub mod preview;
pub mod raster;
