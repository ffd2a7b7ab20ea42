//! Tracing subscriber setup for the `inknorm` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to
//! the binary (or to the embedding application).

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{NormalizeError, NormalizeResult};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it again is a no-op.
pub fn init_tracing() -> NormalizeResult<()> {
    init_tracing_with_default("info")
}

/// Same as [`init_tracing`] with a custom fallback filter, e.g. `"debug"` for `--verbose`.
pub fn init_tracing_with_default(default_filter: &str) -> NormalizeResult<()> {
    if INITIALISED.set(()).is_err() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| NormalizeError::external("tracing-subscriber", e))
}
