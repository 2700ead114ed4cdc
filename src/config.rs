//! Run configuration: the recognized-options surface and its validation.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::catalog::Selection;
use crate::error::EngineError;
use crate::generate::GenSpec;
use crate::value::Domain;

/// Configuration for one oracle run.
///
/// Built with `RunConfig::new(domain, seed)` plus `with_*` setters;
/// [`RunConfig::validate`] runs before anything else and a validation
/// failure is fatal.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Domain to generate and evaluate.
    pub domain: Domain,
    /// Relations to evaluate.
    pub relations: Selection,
    /// Number of generated cases.
    pub case_count: u32,
    /// Seed for the whole run.
    pub seed: u64,
    /// Epsilon for tolerance comparisons.
    pub epsilon: f64,
    /// Per-SUT-call timeout; `None` disables the watchdog.
    pub timeout: Option<Duration>,
    /// Cancel the run after this many FAIL/ERROR verdicts; `None` never
    /// cancels.
    pub failure_budget: Option<u32>,
    /// Worker threads evaluating (case, relation) pairs.
    pub workers: usize,
    /// Failing/erroring examples retained per relation.
    pub max_examples: usize,
    /// Structural size range for generated cases.
    pub size_range: RangeInclusive<usize>,
    /// Element value range for generated cases.
    pub value_range: RangeInclusive<i64>,
}

impl RunConfig {
    /// Defaults: 100 cases, epsilon `1e-6`, 2s call timeout, no failure
    /// budget, one worker, 8 retained examples per relation.
    #[must_use]
    pub fn new(domain: Domain, seed: u64) -> Self {
        Self {
            domain,
            relations: Selection::All,
            case_count: 100,
            seed,
            epsilon: 1e-6,
            timeout: Some(Duration::from_secs(2)),
            failure_budget: None,
            workers: 1,
            max_examples: 8,
            size_range: 0..=6,
            value_range: -9..=9,
        }
    }

    /// Sets the relation selection.
    #[must_use]
    pub fn with_relations(mut self, relations: Selection) -> Self {
        self.relations = relations;
        self
    }

    /// Sets the case count.
    #[must_use]
    pub fn with_case_count(mut self, count: u32) -> Self {
        self.case_count = count;
        self
    }

    /// Sets the tolerance epsilon.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets or disables the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets or disables the failure budget.
    #[must_use]
    pub fn with_failure_budget(mut self, budget: Option<u32>) -> Self {
        self.failure_budget = budget;
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the retained example cap per relation.
    #[must_use]
    pub fn with_max_examples(mut self, max: usize) -> Self {
        self.max_examples = max;
        self
    }

    /// Sets the structural size range.
    #[must_use]
    pub fn with_size_range(mut self, range: RangeInclusive<usize>) -> Self {
        self.size_range = range;
        self
    }

    /// Sets the element value range.
    #[must_use]
    pub fn with_value_range(mut self, range: RangeInclusive<i64>) -> Self {
        self.value_range = range;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.case_count == 0 {
            return Err(EngineError::config("case_count must be non-zero"));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(EngineError::config(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if self.workers == 0 {
            return Err(EngineError::config("workers must be at least 1"));
        }
        if self.max_examples == 0 {
            return Err(EngineError::config("max_examples must be at least 1"));
        }
        if self.size_range.is_empty() {
            return Err(EngineError::config(format!(
                "size_range {}..={} is empty",
                self.size_range.start(),
                self.size_range.end()
            )));
        }
        if self.value_range.is_empty() {
            return Err(EngineError::config(format!(
                "value_range {}..={} is empty",
                self.value_range.start(),
                self.value_range.end()
            )));
        }
        if let Some(budget) = self.failure_budget {
            if budget == 0 {
                return Err(EngineError::config(
                    "failure_budget of 0 would cancel before any verdict; use None to disable",
                ));
            }
        }
        Ok(())
    }

    /// The generator spec this configuration implies.
    #[must_use]
    pub fn gen_spec(&self) -> GenSpec {
        GenSpec::new(self.domain, self.seed)
            .with_count(self.case_count)
            .with_size_range(self.size_range.clone())
            .with_value_range(self.value_range.clone())
    }
}
