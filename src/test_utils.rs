//! Shared test helpers: logging setup and assertion macros.
//!
//! Tests call [`init_test_logging`] once at the top, then use
//! [`assert_with_log!`](crate::assert_with_log) so a failing assertion
//! carries the expected/actual pair in the trace output alongside the
//! panic message.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes tracing for tests. Safe to call from every test; only the
/// first call installs the subscriber. Honors `RUST_LOG`.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Asserts a condition, logging the labelled expected/actual pair on both
/// outcomes so failures are diagnosable from the trace alone.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $label:expr, $expected:expr, $actual:expr) => {{
        if $cond {
            tracing::debug!(
                label = $label,
                expected = ?$expected,
                actual = ?$actual,
                "assertion passed"
            );
        } else {
            tracing::error!(
                label = $label,
                expected = ?$expected,
                actual = ?$actual,
                "assertion FAILED"
            );
            panic!(
                "assertion failed: {} (expected {:?}, actual {:?})",
                $label, $expected, $actual
            );
        }
    }};
}

/// Marks the start of a named test phase in the trace output.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = $name, "=== test phase ===");
    };
}

/// Marks a test as complete in the trace output.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = $name, "=== test complete ===");
    };
}
