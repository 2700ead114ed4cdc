//! Data-driven metamorphic relation records.
//!
//! A relation bundles four pieces: a precondition guard, a source-to-follow-up
//! transform, and a comparator over the two SUT outputs (the SUT invocation
//! itself lives behind [`crate::sut::Sut`]). Relations are pure metadata plus
//! closures; registering one appends to a catalog and nothing else, so adding
//! a relation is a data registration, not new control flow in the runner.
//!
//! A transform may use its own randomness, but always through the injected
//! [`DetRng`], so the runner can replay a specific failing draw.

use std::fmt;

use crate::generate::Case;
use crate::util::DetRng;
use crate::value::{Domain, Output, Value};

/// Context handed to comparators: run-level tolerance settings.
#[derive(Debug, Clone, Copy)]
pub struct CompareCtx {
    /// Epsilon for tolerance comparisons.
    pub epsilon: f64,
}

/// Precondition guard: false means "does not apply", never "failed".
pub type PreconditionFn = dyn Fn(&Case) -> bool + Send + Sync;

/// Source-to-follow-up transform. `None` means the transform is undefined
/// for this case (an applicability gap, scored as skipped).
pub type TransformFn = dyn Fn(&Case, &mut DetRng) -> Option<Value> + Send + Sync;

/// Comparator over the source and follow-up outputs. Must be a pure function
/// of its arguments.
pub type CompareFn = dyn Fn(&Output, &Output, &CompareCtx) -> bool + Send + Sync;

/// A named, domain-scoped metamorphic relation.
pub struct Relation {
    name: &'static str,
    domain: Domain,
    description: &'static str,
    precondition: Box<PreconditionFn>,
    transform: Box<TransformFn>,
    compare: Box<CompareFn>,
}

impl Relation {
    /// Starts building a relation for `domain`.
    #[must_use]
    pub fn builder(name: &'static str, domain: Domain) -> RelationBuilder {
        RelationBuilder {
            name,
            domain,
            description: "",
            precondition: Box::new(|_| true),
            transform: None,
            compare: None,
        }
    }

    /// Relation name (stable identifier in reports).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Domain the relation applies to.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// One-line human description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Evaluates the precondition guard.
    #[must_use]
    pub fn precondition(&self, case: &Case) -> bool {
        (self.precondition)(case)
    }

    /// Derives the follow-up value, drawing randomness from `rng`.
    #[must_use]
    pub fn transform(&self, case: &Case, rng: &mut DetRng) -> Option<Value> {
        (self.transform)(case, rng)
    }

    /// Compares the source and follow-up outputs.
    #[must_use]
    pub fn compare(&self, source: &Output, followup: &Output, ctx: &CompareCtx) -> bool {
        (self.compare)(source, followup, ctx)
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Relation`]. Transform and comparator are mandatory; the
/// precondition defaults to "always applies".
pub struct RelationBuilder {
    name: &'static str,
    domain: Domain,
    description: &'static str,
    precondition: Box<PreconditionFn>,
    transform: Option<Box<TransformFn>>,
    compare: Option<Box<CompareFn>>,
}

impl RelationBuilder {
    /// Sets the one-line description.
    #[must_use]
    pub fn description(mut self, text: &'static str) -> Self {
        self.description = text;
        self
    }

    /// Sets the precondition guard.
    #[must_use]
    pub fn precondition<F>(mut self, f: F) -> Self
    where
        F: Fn(&Case) -> bool + Send + Sync + 'static,
    {
        self.precondition = Box::new(f);
        self
    }

    /// Sets the transform.
    #[must_use]
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&Case, &mut DetRng) -> Option<Value> + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(f));
        self
    }

    /// Sets the comparator.
    #[must_use]
    pub fn compare<F>(mut self, f: F) -> Self
    where
        F: Fn(&Output, &Output, &CompareCtx) -> bool + Send + Sync + 'static,
    {
        self.compare = Some(Box::new(f));
        self
    }

    /// Finishes the relation.
    ///
    /// # Panics
    ///
    /// Panics if the transform or comparator was not provided; builtin
    /// catalogs are constructed at startup, so a missing closure is a
    /// programming error, not a runtime condition.
    #[must_use]
    pub fn build(self) -> Relation {
        Relation {
            name: self.name,
            domain: self.domain,
            description: self.description,
            precondition: self.precondition,
            transform: self
                .transform
                .unwrap_or_else(|| panic!("relation {:?} has no transform", self.name)),
            compare: self
                .compare
                .unwrap_or_else(|| panic!("relation {:?} has no comparator", self.name)),
        }
    }
}
