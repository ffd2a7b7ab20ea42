//! # Configuration Module
//!
//! This module provides the normalization configuration shared by the CLI and
//! library callers.

pub mod config;

pub use config::NormalizeConfig;
