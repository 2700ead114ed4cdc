//! Verdict aggregation and reporting.
//!
//! Aggregation is a pure fold over the verdict stream: per-relation counters
//! plus a bounded buffer of failing/erroring examples, each carrying the
//! seed, case index, and concrete values needed to replay it. Folding the
//! same stream twice yields identical reports.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::json;

use crate::runner::VerdictRecord;
use crate::value::Domain;

/// Per-relation verdict counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelationCounters {
    /// Comparator accepted.
    pub pass: u64,
    /// Comparator rejected.
    pub fail: u64,
    /// Relation did not apply.
    pub skipped: u64,
    /// SUT boundary failed.
    pub error: u64,
}

impl RelationCounters {
    /// All verdicts recorded for the relation.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pass + self.fail + self.skipped + self.error
    }

    /// Pairs where the relation actually exercised the SUT.
    #[must_use]
    pub const fn attempted(&self) -> u64 {
        self.pass + self.fail + self.error
    }

    /// Pass rate over attempted pairs; 1.0 when nothing was attempted.
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.attempted() == 0 {
            1.0
        } else {
            self.pass as f64 / self.attempted() as f64
        }
    }
}

/// One relation's aggregate: counters plus retained examples.
#[derive(Debug, Clone, Serialize)]
pub struct RelationSummary {
    /// Relation name.
    pub name: &'static str,
    /// Verdict counters.
    pub counters: RelationCounters,
    /// Bounded FAIL/ERROR examples with reproduction evidence.
    pub examples: Vec<VerdictRecord>,
}

/// Aggregate report for a full oracle run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    domain: Domain,
    seed: u64,
    cancelled: bool,
    total_pairs: usize,
    evaluated: usize,
    relations: Vec<RelationSummary>,
}

impl RunReport {
    /// Folds a verdict stream into a report.
    ///
    /// `relation_names` fixes the relation order (catalog order); records
    /// are sorted by (case index, relation order) first so worker
    /// interleaving never changes the rendered output.
    #[must_use]
    pub fn aggregate(
        domain: Domain,
        seed: u64,
        relation_names: &[&'static str],
        mut records: Vec<VerdictRecord>,
        max_examples: usize,
        cancelled: bool,
        total_pairs: usize,
    ) -> Self {
        let position = |name: &str| {
            relation_names
                .iter()
                .position(|n| *n == name)
                .unwrap_or(relation_names.len())
        };
        records.sort_by_key(|r| (r.case.index, position(r.relation)));

        let evaluated = records.len();
        let mut relations: Vec<RelationSummary> = relation_names
            .iter()
            .map(|&name| RelationSummary {
                name,
                counters: RelationCounters::default(),
                examples: Vec::new(),
            })
            .collect();

        for record in records {
            let slot = position(record.relation);
            let Some(summary) = relations.get_mut(slot) else {
                continue;
            };
            match &record.verdict {
                crate::runner::Verdict::Pass => summary.counters.pass += 1,
                crate::runner::Verdict::Fail => summary.counters.fail += 1,
                crate::runner::Verdict::Skipped(_) => summary.counters.skipped += 1,
                crate::runner::Verdict::Error(_) => summary.counters.error += 1,
            }
            if record.verdict.is_failure() && summary.examples.len() < max_examples {
                summary.examples.push(record);
            }
        }

        Self {
            domain,
            seed,
            cancelled,
            total_pairs,
            evaluated,
            relations,
        }
    }

    /// The run's domain.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// The run's seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// True when the run was cancelled (failure budget exhausted).
    #[must_use]
    pub const fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Pairs the run would evaluate uncancelled.
    #[must_use]
    pub const fn total_pairs(&self) -> usize {
        self.total_pairs
    }

    /// Pairs that produced a verdict.
    #[must_use]
    pub const fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Relation names in report order.
    #[must_use]
    pub fn relation_names(&self) -> Vec<&'static str> {
        self.relations.iter().map(|r| r.name).collect()
    }

    /// Per-relation summaries in report order.
    #[must_use]
    pub fn relations(&self) -> &[RelationSummary] {
        &self.relations
    }

    /// Counters for one relation.
    #[must_use]
    pub fn counters(&self, name: &str) -> Option<&RelationCounters> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.counters)
    }

    /// Retained examples for one relation.
    #[must_use]
    pub fn examples(&self, name: &str) -> &[VerdictRecord] {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .map_or(&[], |r| r.examples.as_slice())
    }

    /// Total FAIL verdicts across relations.
    #[must_use]
    pub fn fail_total(&self) -> u64 {
        self.relations.iter().map(|r| r.counters.fail).sum()
    }

    /// Total ERROR verdicts across relations.
    #[must_use]
    pub fn error_total(&self) -> u64 {
        self.relations.iter().map(|r| r.counters.error).sum()
    }

    /// True when any relation has at least one FAIL or ERROR.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.fail_total() + self.error_total() > 0
    }

    /// Suggested process exit status: non-zero iff the run found failures.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_failures())
    }

    /// Renders a human-readable report.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            &mut out,
            "oracle report: domain={} seed={} pairs={}/{}{}",
            self.domain,
            self.seed,
            self.evaluated,
            self.total_pairs,
            if self.cancelled { " (cancelled)" } else { "" }
        );
        for relation in &self.relations {
            let c = &relation.counters;
            let _ = writeln!(
                &mut out,
                "{}: pass={} fail={} skipped={} error={} rate={:.3}",
                relation.name,
                c.pass,
                c.fail,
                c.skipped,
                c.error,
                c.pass_rate()
            );
            for example in &relation.examples {
                let _ = writeln!(
                    &mut out,
                    "  {} {} relation={}",
                    example.verdict.label(),
                    example.case,
                    example.relation
                );
            }
        }
        out
    }

    /// Renders a JSON report convertible to any serialization.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let relations = self
            .relations
            .iter()
            .map(|relation| {
                json!({
                    "name": relation.name,
                    "counters": relation.counters,
                    "pass_rate": relation.counters.pass_rate(),
                    "examples": relation.examples,
                })
            })
            .collect::<Vec<_>>();
        json!({
            "summary": {
                "domain": self.domain,
                "seed": self.seed,
                "total_pairs": self.total_pairs,
                "evaluated": self.evaluated,
                "cancelled": self.cancelled,
                "fail_total": self.fail_total(),
                "error_total": self.error_total(),
            },
            "relations": relations,
        })
    }
}
