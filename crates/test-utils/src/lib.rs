pub mod fixtures;
pub mod recording_sink;

use std::sync::Once;
use std::time::Duration;

use pollwatch::logging::{build_filter, LOG_ENV};
use tracing_subscriber::fmt;

pub use fixtures::FixtureTree;
pub use recording_sink::RecordingSink;

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary.
///
/// Uses the same filter rules as the binary, so e.g.
/// `POLLWATCH_LOG=pollwatch=trace cargo test` shows every skipped candidate.
/// Output is captured per test and only shown for failures (or with
/// `-- --nocapture`).
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = build_filter(None, std::env::var(LOG_ENV).ok().as_deref());

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Sleep past one kernel timestamp tick, so an mtime stamped afterwards is
/// strictly later than a wall-clock baseline taken before.
pub fn settle() {
    std::thread::sleep(Duration::from_millis(20));
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}
