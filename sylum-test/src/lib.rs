//! Shared test-support helpers for the `sylum` workspace.
//!
//! Every test module calls [`init`] first, the same way Zebra's tests call
//! `zebra_test::init()`. It installs a `tracing-subscriber` filtered by
//! `RUST_LOG` (default `info`) and a `color-eyre` panic/error hook, and is
//! safe to call from every test in every thread — only the first call does
//! anything.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging and error reporting for a test, idempotently.
///
/// Returns a guard purely for call-site symmetry with crates that do need to
/// hold one; dropping it does nothing.
pub fn init() -> impl Drop {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();

        let _ = color_eyre::install();
    });

    Guard
}

struct Guard;

impl Drop for Guard {
    fn drop(&mut self) {}
}
