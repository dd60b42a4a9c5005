//! Structured logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is left to the binary or test that drives it.
//! Levels used across the crate:
//!
//! - `info`: a replication starting and finishing
//! - `debug`: the summary of each simulated day
//! - `trace`: every event the booth processes (very verbose)
//! - `warn`: a replication that failed, or a show that sold out
//!
//! `RUST_LOG` overrides the level passed in, e.g. `RUST_LOG=boothsim::booth=trace`.

use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a formatting subscriber at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    init_logging_with_level("info")
}

/// Install a formatting subscriber at the given level (`"trace"`, `"debug"`, `"info"`, `"warn"` or `"error"`).
///
/// Calling this after a global subscriber is already set does nothing, so tests may call it freely.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| format!("boothsim={level}").into());

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true).with_level(true))
        .with(filter)
        .try_init();

    if installed.is_ok() {
        info!(level, "logging initialized");
    }
}
