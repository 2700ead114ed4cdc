//! Optional tracing integration.
//!
//! When neither tracing feature is enabled, the logging macros compile to
//! no-ops so the runner carries zero overhead.

#[cfg(any(feature = "test-internals", feature = "tracing-integration"))]
pub(crate) use tracing::{debug, info};

#[cfg(not(any(feature = "test-internals", feature = "tracing-integration")))]
mod noop {
    macro_rules! debug {
        ($($args:tt)*) => {};
    }
    macro_rules! info {
        ($($args:tt)*) => {};
    }
    pub(crate) use {debug, info};
}

#[cfg(not(any(feature = "test-internals", feature = "tracing-integration")))]
pub(crate) use noop::{debug, info};
