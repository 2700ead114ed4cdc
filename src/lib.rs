//! Morphlab: a metamorphic testing oracle engine.
//!
//! # Overview
//!
//! Morphlab tests black-box systems without a reference implementation.
//! Instead of checking outputs against expected values, it checks that a
//! system's outputs respect *metamorphic relations*: known consequences of
//! transforming the input. Transposing a matrix must preserve its
//! determinant; removing a key from a JSON document must shrink its
//! serialized form; permuting a triangle's sides must not change its
//! classification. A violated relation is a bug with a reproducible
//! witness, no oracle required.
//!
//! # Core Guarantees
//!
//! - **Determinism**: a run is a pure function of (seed, config). Any case
//!   can be regenerated from its `(seed, index)` alone, so every failure in
//!   a report is replayable in isolation.
//! - **Fault isolation**: a panicking, hanging, or rejecting SUT call
//!   yields an ERROR verdict for that pair; the run continues.
//! - **Honest verdicts**: inapplicable relations report SKIPPED, never a
//!   vacuous PASS, so dead relations are visible in the counters.
//!
//! # Module Structure
//!
//! - [`value`]: domains, generated values, SUT outputs, comparison helpers
//! - [`generate`]: seeded deterministic case generation
//! - [`relation`]: the precondition / transform / compare protocol
//! - [`catalog`]: built-in relation catalogs per domain
//! - [`sut`]: the system-under-test boundary and built-in reference SUTs
//! - [`config`]: run configuration and validation
//! - [`runner`]: the oracle state machine producing verdicts
//! - [`report`](mod@report): aggregation into counters and rendered reports
//! - [`error`](mod@error): error types
//! - [`util`]: deterministic RNG
//!
//! # Example
//!
//! ```
//! use morphlab::{Domain, OracleRunner, RunConfig};
//!
//! let config = RunConfig::new(Domain::IntTriple, 42).with_case_count(50);
//! let report = OracleRunner::builtin(config).unwrap().run().unwrap();
//! assert!(!report.has_failures());
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod generate;
pub mod relation;
pub mod report;
pub mod runner;
pub mod sut;
pub mod util;
pub mod value;

mod tracing_compat;

// ── Test-only modules ───────────────────────────────────────────────────
#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

// Re-exports for convenient access to core types
pub use catalog::{RelationCatalog, Selection};
pub use config::RunConfig;
pub use error::EngineError;
pub use generate::{Case, CaseGenerator, CaseId, GenSpec};
pub use relation::{CompareCtx, Relation, RelationBuilder};
pub use report::{RelationCounters, RelationSummary, RunReport};
pub use runner::{Evidence, OracleRunner, SkipReason, Verdict, VerdictRecord};
pub use sut::{ErrorCause, Sut, SutRejection, builtin_sut};
pub use util::{DetRng, derive_seed};
pub use value::{Domain, Output, SeqOrder, TriangleKind, Value, structural_eq, tolerance_eq};
