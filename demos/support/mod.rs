#![allow(dead_code)]

use tracing_subscriber::{EnvFilter, fmt};

/// Install a fmt subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dear_harness=info,dear_harness_glow=info,warn".into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();
}

/// Verbose variant for chasing frame-loop issues
pub fn init_tracing_dev() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dear_harness=trace,dear_harness_glow=debug,info".into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
