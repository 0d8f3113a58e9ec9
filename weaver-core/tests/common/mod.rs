//! Shared helpers for integration tests.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Install a test subscriber once. `RUST_LOG` controls the output.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
