// ## 📂 File: `src/logging.rs`

//! Opt-in `tracing` subscriber for binaries and tests.
//! The library itself only emits events; it never installs a subscriber.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `info`.
pub fn init() -> bool {
    init_with_default("info")
}

/// Same as [`init`] with a custom fallback filter.
/// Returns `false` when a global subscriber was already set.
pub fn init_with_default(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .is_ok()
}

