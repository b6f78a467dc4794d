//! Helpers shared by unit tests.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Routes `tracing` output through the test harness when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=pkgdeptree=debug cargo test -- --nocapture
/// ```
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
