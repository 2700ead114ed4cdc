//! Seeded input generation.
//!
//! A [`CaseGenerator`] turns a declarative [`GenSpec`] into a reproducible
//! stream of [`Case`]s: size is sampled first, then each element
//! independently and uniformly within the value range. Degenerate sizes
//! (0, 1) stay inside the sampling range because many relations have
//! edge-case behavior exactly there.
//!
//! Each case draws from its own RNG stream derived from `(seed, index)`, so
//! a single failing case replays without regenerating its predecessors.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue, json};

use crate::error::EngineError;
use crate::util::{DetRng, derive_seed};
use crate::value::{Domain, Matrix, Triple, Value};

/// Stable reproducibility tag for a generated case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CaseId {
    /// Seed of the run that produced the case.
    pub seed: u64,
    /// Position of the case within the run.
    pub index: u32,
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seed={} case={}", self.seed, self.index)
    }
}

/// An immutable generated input instance.
///
/// Created by the generator, consumed read-only by every relation;
/// transforms always produce a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Case {
    /// Reproducibility tag.
    pub id: CaseId,
    /// The generated value.
    pub value: Value,
}

/// Declarative generation specification.
#[derive(Debug, Clone)]
pub struct GenSpec {
    /// Domain to generate for.
    pub domain: Domain,
    /// Number of cases to produce.
    pub count: u32,
    /// Structural size range (matrix dimension, JSON entry count).
    pub size_range: RangeInclusive<usize>,
    /// Range elements are sampled from.
    pub value_range: RangeInclusive<i64>,
    /// Seed for the whole stream.
    pub seed: u64,
}

impl GenSpec {
    /// Spec with the default shape budget: 100 cases, sizes `0..=6`,
    /// values `-9..=9`.
    #[must_use]
    pub fn new(domain: Domain, seed: u64) -> Self {
        Self {
            domain,
            count: 100,
            size_range: 0..=6,
            value_range: -9..=9,
            seed,
        }
    }

    /// Sets the case count.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
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
}

/// Relation-agnostic case generator.
#[derive(Debug, Clone)]
pub struct CaseGenerator {
    spec: GenSpec,
}

impl CaseGenerator {
    /// Validates the spec and builds a generator.
    ///
    /// An impossible spec (empty size or value range) is
    /// [`EngineError::GeneratorExhaustion`]: it can never produce a case and
    /// signals a misconfiguration. A zero count is a plain config error.
    pub fn new(spec: GenSpec) -> Result<Self, EngineError> {
        if spec.count == 0 {
            return Err(EngineError::config("case count must be non-zero"));
        }
        if spec.size_range.is_empty() {
            return Err(EngineError::GeneratorExhaustion {
                domain: spec.domain,
                reason: format!(
                    "empty size range {}..={}",
                    spec.size_range.start(),
                    spec.size_range.end()
                ),
            });
        }
        if spec.value_range.is_empty() {
            return Err(EngineError::GeneratorExhaustion {
                domain: spec.domain,
                reason: format!(
                    "empty value range {}..={}",
                    spec.value_range.start(),
                    spec.value_range.end()
                ),
            });
        }
        Ok(Self { spec })
    }

    /// The validated spec.
    #[must_use]
    pub fn spec(&self) -> &GenSpec {
        &self.spec
    }

    /// Generates the full case stream. Same spec, same output.
    #[must_use]
    pub fn generate(&self) -> Vec<Case> {
        (0..self.spec.count).map(|index| self.case(index)).collect()
    }

    /// Regenerates the single case at `index` (replay entry point).
    #[must_use]
    pub fn case(&self, index: u32) -> Case {
        let mut rng = DetRng::new(derive_seed(self.spec.seed, u64::from(index), 0));
        let value = match self.spec.domain {
            Domain::SquareMatrix => Value::Matrix(self.matrix(&mut rng)),
            Domain::Json => Value::Json(self.json(&mut rng)),
            Domain::IntTriple => Value::Triple(self.triple(&mut rng)),
        };
        Case {
            id: CaseId {
                seed: self.spec.seed,
                index,
            },
            value,
        }
    }

    fn sample_size(&self, rng: &mut DetRng) -> usize {
        rng.range_usize(*self.spec.size_range.start(), *self.spec.size_range.end())
    }

    fn sample_element(&self, rng: &mut DetRng) -> i64 {
        rng.range_i64(*self.spec.value_range.start(), *self.spec.value_range.end())
    }

    fn matrix(&self, rng: &mut DetRng) -> Matrix {
        let n = self.sample_size(rng);
        let rows = (0..n)
            .map(|_| (0..n).map(|_| self.sample_element(rng) as f64).collect())
            .collect();
        Matrix::from_rows(rows).unwrap_or_else(|| Matrix::identity(0))
    }

    fn json(&self, rng: &mut DetRng) -> JsonValue {
        let entries = self.sample_size(rng);
        // Roughly two thirds objects, one third arrays, so relations guarded
        // on either root shape see applicable cases.
        if rng.range_usize(0, 2) < 2 {
            let mut map = JsonMap::new();
            for i in 0..entries {
                map.insert(format!("k{i:02}"), self.json_leaf(rng));
            }
            JsonValue::Object(map)
        } else {
            JsonValue::Array((0..entries).map(|_| self.json_leaf(rng)).collect())
        }
    }

    fn json_leaf(&self, rng: &mut DetRng) -> JsonValue {
        match rng.range_usize(0, 3) {
            0 => json!(self.sample_element(rng)),
            1 => json!(format!("v{}", self.sample_element(rng).abs())),
            2 => json!(rng.range_usize(0, 1) == 1),
            _ => {
                let len = rng.range_usize(0, 3);
                JsonValue::Array((0..len).map(|_| json!(self.sample_element(rng))).collect())
            }
        }
    }

    fn triple(&self, rng: &mut DetRng) -> Triple {
        Triple::new(
            self.sample_element(rng),
            self.sample_element(rng),
            self.sample_element(rng),
        )
    }
}
