#![allow(dead_code)]

use std::path::Path;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use orchestrator::config::RunConfig;
use orchestrator::engine::PollSchedule;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// A run config with short intervals so scenarios finish in a few seconds.
pub fn fast_config(name: &str, cmd: &str, log_dir: &Path) -> RunConfig {
    let schedule = PollSchedule::new(vec![
        Duration::from_millis(100),
        Duration::from_millis(200),
        Duration::from_millis(500),
    ])
    .expect("static schedule is valid");

    RunConfig::new(name, cmd)
        .with_log_dir(log_dir)
        .with_timeout(Duration::from_secs(10))
        .with_poll_schedule(schedule)
        .with_termination_grace(Duration::from_secs(2))
        .with_drain_grace(Duration::from_secs(2))
}
