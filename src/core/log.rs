//! Logging setup for the `dolarve` binary.
//!
//! Logs go to stderr. The converter prints its results on stdout, and the
//! `watch` session redraws there, so diagnostics must never share that stream.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Target prefix of every event this crate emits.
const APP_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Per-target filter for the crate's own events plus the `RUST_LOG` fallback level.
fn app_filters(verbose: bool) -> (Targets, &'static str) {
    let (level_filter, fallback) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    };
    (Targets::new().with_target(APP_TARGET, level_filter), fallback)
}

pub fn init_logging(verbose: bool) {
    let (app_filter, fallback) = app_filters(verbose);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .init();
}
