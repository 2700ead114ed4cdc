//! Error types for the morphlab engine.
//!
//! Only run-fatal conditions are errors here: configuration problems and
//! generator exhaustion. Per-pair conditions (failed preconditions, undefined
//! transforms, SUT crashes, relation violations) are verdict data, recorded in
//! the run report without aborting the run. See [`crate::runner::SkipReason`]
//! and [`crate::sut::ErrorCause`].

use crate::value::Domain;

/// Fatal engine errors.
///
/// Any of these aborts the run before or during case generation; none of them
/// describes SUT behavior.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Configuration failed validation.
    #[error("invalid configuration: {reason}")]
    Config {
        /// Human-readable validation failure.
        reason: String,
    },

    /// The generator cannot produce a case under the configured constraints.
    #[error("generator exhausted for domain {domain}: {reason}")]
    GeneratorExhaustion {
        /// Domain being generated.
        domain: Domain,
        /// Why no case can be produced.
        reason: String,
    },

    /// A relation name in the selection does not exist in the catalog.
    #[error("unknown relation {name:?} for domain {domain}")]
    UnknownRelation {
        /// The unmatched relation name.
        name: String,
        /// Domain whose catalog was searched.
        domain: Domain,
    },

    /// A relation was registered into a catalog for a different domain.
    #[error("relation {name:?} targets domain {relation_domain}, catalog holds {catalog_domain}")]
    DomainMismatch {
        /// The offending relation.
        name: String,
        /// Domain the relation declares.
        relation_domain: Domain,
        /// Domain the catalog holds.
        catalog_domain: Domain,
    },

    /// Two relations with the same name were registered in one catalog.
    #[error("duplicate relation name {name:?} in catalog for domain {domain}")]
    DuplicateRelation {
        /// The duplicated name.
        name: String,
        /// The catalog's domain.
        domain: Domain,
    },
}

impl EngineError {
    /// Shorthand for a configuration validation failure.
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_are_stable() {
        let err = EngineError::config("case_count must be non-zero");
        assert_eq!(
            err.to_string(),
            "invalid configuration: case_count must be non-zero"
        );

        let err = EngineError::UnknownRelation {
            name: "no_such_relation".into(),
            domain: Domain::Json,
        };
        assert!(err.to_string().contains("no_such_relation"));
        assert!(err.to_string().contains("json"));
    }
}
