//! Shared test infrastructure for the kestrel workspace.
//!
//! The only entry point is [`init`], which installs the tracing subscriber
//! and panic/error report hooks exactly once per test binary. Call it at the
//! top of every test so that failures come with readable spans and colors.

use std::sync::Once;

use tracing_error::ErrorLayer;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize global test context: a tracing subscriber honoring
/// `RUST_LOG`, span-aware error reports, and color-eyre panic hooks.
///
/// Idempotent; later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer().with_target(false);
        // Use RUST_LOG if set, defaulting to info-level output.
        let filter_layer = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .expect("hardcoded filter directive must parse");

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(ErrorLayer::default())
            .init();

        color_eyre::install().expect("color_eyre was not previously installed");
    })
}
