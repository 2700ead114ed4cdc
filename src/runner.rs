//! The oracle runner: evaluates every (case, relation) pair.
//!
//! Each pair walks a five-step state machine: precondition, source
//! invocation, transform, follow-up invocation, compare. A false
//! precondition or an undefined transform is SKIPPED; a SUT crash, rejection,
//! or timeout is ERROR; a comparator verdict is PASS or FAIL. Pairs share no
//! mutable state, so the runner may dispatch them across a bounded worker
//! pool; verdicts funnel into a lock-protected append-only sink and outcomes
//! never depend on evaluation order.
//!
//! Cancellation is cooperative: exhausting the failure budget raises a flag
//! that workers check between state-machine steps, abandoning in-flight pairs
//! rather than killing them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;
use serde::Serialize;

use crate::catalog::RelationCatalog;
use crate::config::RunConfig;
use crate::error::EngineError;
use crate::generate::{Case, CaseGenerator, CaseId};
use crate::relation::{CompareCtx, Relation};
use crate::report::RunReport;
use crate::sut::{ErrorCause, Sut, builtin_sut, invoke_bounded};
use crate::tracing_compat::{debug, info};
use crate::util::{DetRng, derive_seed};
use crate::value::{Output, Value};

/// Why a (case, relation) pair was skipped. Never a SUT failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The relation's precondition returned false for this case.
    PreconditionFalse,
    /// The transform is undefined for this case.
    TransformUndefined,
}

/// Classification of one (case, relation) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The comparator accepted the output pair.
    Pass,
    /// The comparator rejected the output pair: a detected inconsistency.
    Fail,
    /// The relation does not apply to this case.
    Skipped(SkipReason),
    /// The SUT boundary failed; reported separately from FAIL so crashes are
    /// not conflated with genuine relation violations.
    Error(ErrorCause),
}

impl Verdict {
    /// Stable lowercase label for reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skipped(_) => "skipped",
            Self::Error(_) => "error",
        }
    }

    /// True for FAIL or ERROR.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Fail | Self::Error(_))
    }
}

/// Concrete values needed to reproduce a FAIL or ERROR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    /// The generated source input.
    pub source_input: Value,
    /// The derived follow-up input, when the state machine got that far.
    pub followup_input: Option<Value>,
    /// Output of the source invocation, when it succeeded.
    pub source_output: Option<Output>,
    /// Output of the follow-up invocation, when it succeeded.
    pub followup_output: Option<Output>,
}

/// One verdict, attributable to exactly one (case, relation) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictRecord {
    /// The case's reproducibility tag.
    pub case: CaseId,
    /// Relation name.
    pub relation: &'static str,
    /// The classification.
    pub verdict: Verdict,
    /// Reproduction values; present exactly on FAIL/ERROR.
    pub evidence: Option<Evidence>,
}

/// The control loop tying generator output to relation evaluation.
pub struct OracleRunner {
    config: RunConfig,
    catalog: RelationCatalog,
    sut: Arc<dyn Sut>,
}

impl fmt::Debug for OracleRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleRunner")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .field("sut", &self.sut.name())
            .finish_non_exhaustive()
    }
}

impl OracleRunner {
    /// Builds a runner, validating the configuration against the catalog.
    pub fn new(
        config: RunConfig,
        catalog: RelationCatalog,
        sut: Arc<dyn Sut>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if catalog.domain() != config.domain {
            return Err(EngineError::config(format!(
                "config domain {} does not match catalog domain {}",
                config.domain,
                catalog.domain()
            )));
        }
        // Resolve the selection now so unknown names fail before generation.
        catalog.select(&config.relations)?;
        Ok(Self {
            config,
            catalog,
            sut,
        })
    }

    /// Runner over the builtin catalog and reference SUT for the domain.
    pub fn builtin(config: RunConfig) -> Result<Self, EngineError> {
        let catalog = RelationCatalog::builtin(config.domain);
        let sut = builtin_sut(config.domain);
        Self::new(config, catalog, sut)
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Evaluates all generated cases against all selected relations.
    pub fn run(&self) -> Result<RunReport, EngineError> {
        let generator = CaseGenerator::new(self.config.gen_spec())?;
        let cases = generator.generate();
        let relations = self.catalog.select(&self.config.relations)?;
        let relation_names: Vec<&'static str> = relations.iter().map(|r| r.name()).collect();
        // Transform streams key off the catalog position, so narrowing the
        // selection never shifts the streams of the relations that remain.
        let catalog_names = self.catalog.names();
        let streams: Vec<u64> = relation_names
            .iter()
            .map(|name| {
                catalog_names
                    .iter()
                    .position(|n| n == name)
                    .unwrap_or(0) as u64
            })
            .collect();
        let ctx = CompareCtx {
            epsilon: self.config.epsilon,
        };
        let total = cases.len() * relations.len();
        info!(
            domain = %self.config.domain,
            seed = self.config.seed,
            cases = cases.len(),
            relations = relations.len(),
            workers = self.config.workers,
            "oracle run start"
        );

        let cancel = AtomicBool::new(false);
        let budget = AtomicI64::new(
            self.config
                .failure_budget
                .map_or(i64::MAX, i64::from),
        );
        let cursor = AtomicUsize::new(0);
        let sink: Mutex<Vec<VerdictRecord>> = Mutex::new(Vec::with_capacity(total));

        thread::scope(|scope| {
            for _ in 0..self.config.workers {
                scope.spawn(|| {
                    loop {
                        if cancel.load(Ordering::Acquire) {
                            break;
                        }
                        let pair = cursor.fetch_add(1, Ordering::Relaxed);
                        if pair >= total {
                            break;
                        }
                        let case = &cases[pair / relations.len()];
                        let relation_index = pair % relations.len();
                        let relation = relations[relation_index];
                        let Some(record) = self.evaluate_pair(
                            case,
                            relation,
                            streams[relation_index],
                            &ctx,
                            &cancel,
                        ) else {
                            // Cancelled mid-pair; the pair is abandoned.
                            break;
                        };
                        let exhausted = record.verdict.is_failure()
                            && budget.fetch_sub(1, Ordering::AcqRel) <= 1;
                        sink.lock().push(record);
                        if exhausted {
                            cancel.store(true, Ordering::Release);
                        }
                    }
                });
            }
        });

        let records = sink.into_inner();
        let cancelled = cancel.load(Ordering::Acquire);
        let report = RunReport::aggregate(
            self.config.domain,
            self.config.seed,
            &relation_names,
            records,
            self.config.max_examples,
            cancelled,
            total,
        );
        info!(
            domain = %self.config.domain,
            seed = self.config.seed,
            evaluated = report.evaluated(),
            cancelled,
            failures = report.has_failures(),
            "oracle run complete"
        );
        Ok(report)
    }

    /// The five-step state machine for one pair. Returns `None` when the run
    /// was cancelled between steps (the pair is abandoned, no verdict).
    fn evaluate_pair(
        &self,
        case: &Case,
        relation: &Relation,
        stream: u64,
        ctx: &CompareCtx,
        cancel: &AtomicBool,
    ) -> Option<VerdictRecord> {
        let timeout = self.config.timeout;
        let record = |verdict: Verdict, evidence: Option<Evidence>| VerdictRecord {
            case: case.id,
            relation: relation.name(),
            verdict,
            evidence,
        };

        // 1. Precondition.
        if !relation.precondition(case) {
            return Some(record(Verdict::Skipped(SkipReason::PreconditionFalse), None));
        }
        if cancel.load(Ordering::Acquire) {
            return None;
        }

        // 2. Source invocation.
        let source_output = match invoke_bounded(&self.sut, &case.value, timeout) {
            Ok(output) => output,
            Err(cause) => {
                debug!(case = %case.id, relation = relation.name(), ?cause, "source invocation error");
                return Some(record(
                    Verdict::Error(cause),
                    Some(Evidence {
                        source_input: case.value.clone(),
                        followup_input: None,
                        source_output: None,
                        followup_output: None,
                    }),
                ));
            }
        };
        if cancel.load(Ordering::Acquire) {
            return None;
        }

        // 3. Transform, with a replayable per-pair random stream. Stream 0
        // belongs to case generation; relations start at 1.
        let mut rng = DetRng::new(derive_seed(
            case.id.seed,
            u64::from(case.id.index),
            stream + 1,
        ));
        let Some(followup_input) = relation.transform(case, &mut rng) else {
            return Some(record(Verdict::Skipped(SkipReason::TransformUndefined), None));
        };
        if cancel.load(Ordering::Acquire) {
            return None;
        }

        // 4. Follow-up invocation.
        let followup_output = match invoke_bounded(&self.sut, &followup_input, timeout) {
            Ok(output) => output,
            Err(cause) => {
                debug!(case = %case.id, relation = relation.name(), ?cause, "follow-up invocation error");
                return Some(record(
                    Verdict::Error(cause),
                    Some(Evidence {
                        source_input: case.value.clone(),
                        followup_input: Some(followup_input),
                        source_output: Some(source_output),
                        followup_output: None,
                    }),
                ));
            }
        };
        if cancel.load(Ordering::Acquire) {
            return None;
        }

        // 5. Compare.
        if relation.compare(&source_output, &followup_output, ctx) {
            Some(record(Verdict::Pass, None))
        } else {
            debug!(case = %case.id, relation = relation.name(), "relation violation");
            Some(record(
                Verdict::Fail,
                Some(Evidence {
                    source_input: case.value.clone(),
                    followup_input: Some(followup_input),
                    source_output: Some(source_output),
                    followup_output: Some(followup_output),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Selection;
    use crate::sut::SutRejection;
    use crate::value::Domain;

    /// A SUT that fails a configurable relation by misbehaving on inputs the
    /// transform produces.
    struct BrokenTriangleSut;

    impl Sut for BrokenTriangleSut {
        fn name(&self) -> &'static str {
            "broken_triangle"
        }

        fn invoke(&self, value: &Value) -> Result<Output, SutRejection> {
            // Delegate, then corrupt the area whenever side `a` is even, so
            // permutations of an odd/even mixed triple disagree.
            let inner = crate::sut::TriangleSut;
            let out = inner.invoke(value)?;
            let t = value.as_triple().expect("triple domain");
            match out {
                Output::Triangle { kind, area } if t.a % 2 == 0 => Ok(Output::Triangle {
                    kind,
                    area: area + 1.0,
                }),
                other => Ok(other),
            }
        }
    }

    fn triple_config(seed: u64) -> RunConfig {
        RunConfig::new(Domain::IntTriple, seed)
            .with_case_count(40)
            .with_value_range(1..=9)
    }

    #[test]
    fn builtin_triple_run_is_all_pass_or_skip() {
        let runner = OracleRunner::builtin(triple_config(42)).unwrap();
        let report = runner.run().unwrap();
        assert!(!report.has_failures(), "report:\n{}", report.to_text());
        assert_eq!(report.evaluated(), report.total_pairs());
    }

    #[test]
    fn broken_sut_is_detected() {
        let config = triple_config(42)
            .with_relations(Selection::Named(vec!["side_permutation_invariance".into()]));
        let runner = OracleRunner::new(
            config,
            RelationCatalog::builtin(Domain::IntTriple),
            Arc::new(BrokenTriangleSut),
        )
        .unwrap();
        let report = runner.run().unwrap();
        assert!(report.has_failures());
        let counters = report.counters("side_permutation_invariance").unwrap();
        assert!(counters.fail > 0);
        // Failing examples carry full reproduction evidence.
        let example = report
            .examples("side_permutation_invariance")
            .iter()
            .find(|r| r.verdict == Verdict::Fail)
            .expect("a failing example is retained");
        let evidence = example.evidence.as_ref().unwrap();
        assert!(evidence.followup_input.is_some());
        assert!(evidence.followup_output.is_some());
    }

    #[test]
    fn same_seed_same_report() {
        let run = |workers| {
            OracleRunner::builtin(triple_config(7).with_workers(workers))
                .unwrap()
                .run()
                .unwrap()
        };
        let a = run(1);
        let b = run(1);
        assert_eq!(a.to_json(), b.to_json());
        // Outcomes are order-independent, so worker count changes nothing.
        let c = run(4);
        assert_eq!(a.to_json(), c.to_json());
    }

    #[test]
    fn domain_mismatch_is_config_error() {
        let err = OracleRunner::new(
            RunConfig::new(Domain::Json, 1),
            RelationCatalog::builtin(Domain::IntTriple),
            builtin_sut(Domain::IntTriple),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }

    #[test]
    fn unknown_relation_fails_before_running() {
        let config = RunConfig::new(Domain::Json, 1)
            .with_relations(Selection::Named(vec!["nope".into()]));
        let err = OracleRunner::builtin(config).unwrap_err();
        assert!(matches!(err, EngineError::UnknownRelation { .. }));
    }

    #[test]
    fn debug_names_config_and_sut() {
        let runner = OracleRunner::builtin(triple_config(1)).unwrap();
        let rendered = format!("{runner:?}");
        assert!(rendered.contains("OracleRunner"));
        assert!(rendered.contains("triangle"));
    }

    #[test]
    fn failure_budget_cancels_run() {
        struct AlwaysPanics;
        impl Sut for AlwaysPanics {
            fn name(&self) -> &'static str {
                "always_panics"
            }
            fn invoke(&self, _: &Value) -> Result<Output, SutRejection> {
                panic!("nope");
            }
        }
        let config = triple_config(3).with_failure_budget(Some(5)).with_timeout(None);
        let runner = OracleRunner::new(
            config,
            RelationCatalog::builtin(Domain::IntTriple),
            Arc::new(AlwaysPanics),
        )
        .unwrap();
        let report = runner.run().unwrap();
        assert!(report.cancelled());
        assert!(report.evaluated() < report.total_pairs());
        assert!(report.error_total() >= 5);
    }

    #[test]
    fn precondition_false_is_skip_not_fail() {
        // Non-positive sides never reach the SUT: every triple relation
        // guards on positivity.
        let config = RunConfig::new(Domain::IntTriple, 11)
            .with_case_count(30)
            .with_value_range(-3..=0);
        let report = OracleRunner::builtin(config).unwrap().run().unwrap();
        assert!(!report.has_failures());
        for name in report.relation_names() {
            let counters = report.counters(name).unwrap();
            assert_eq!(counters.pass + counters.fail + counters.error, 0);
            assert_eq!(counters.skipped, 30);
        }
    }
}
