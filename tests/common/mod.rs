//! Shared helpers for integration tests.
#![allow(dead_code)]

pub use morphlab::test_utils::init_test_logging;

/// Canonical seed for deterministic tests.
pub const DEFAULT_TEST_SEED: u64 = 42;
