//! Relation catalogs: ordered, named sets of relations per domain.
//!
//! A catalog is registered once at startup and read-only for the rest of the
//! run. Builtin catalogs ship for the three reference domains; they are
//! pluggable content, not a fixed correctness oracle — integrators register
//! their own relations the same way the builtins do.

use serde_json::Value as JsonValue;

use crate::error::EngineError;
use crate::relation::Relation;
use crate::util::DetRng;
use crate::value::{Domain, SeqOrder, TriangleKind, Value, json_size, structural_eq, tolerance_eq};

/// Which relations of a catalog a run evaluates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every registered relation, in catalog order.
    All,
    /// A named subset; order follows the catalog, unknown names are errors.
    Named(Vec<String>),
}

/// An ordered, named set of relations for one domain.
///
/// The catalog exclusively owns its relation set; registration appends and
/// performs no I/O.
#[derive(Debug)]
pub struct RelationCatalog {
    domain: Domain,
    relations: Vec<Relation>,
}

impl RelationCatalog {
    /// An empty catalog for `domain`.
    #[must_use]
    pub const fn new(domain: Domain) -> Self {
        Self {
            domain,
            relations: Vec::new(),
        }
    }

    /// The builtin catalog for `domain`.
    #[must_use]
    pub fn builtin(domain: Domain) -> Self {
        let mut catalog = Self::new(domain);
        let relations = match domain {
            Domain::SquareMatrix => matrix_relations(),
            Domain::Json => json_relations(),
            Domain::IntTriple => triple_relations(),
        };
        for relation in relations {
            catalog
                .register(relation)
                .expect("builtin catalogs are domain-consistent and duplicate-free");
        }
        catalog
    }

    /// The catalog's domain.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// Appends a relation. Fails on a domain mismatch or duplicate name.
    pub fn register(&mut self, relation: Relation) -> Result<(), EngineError> {
        if relation.domain() != self.domain {
            return Err(EngineError::DomainMismatch {
                name: relation.name().to_string(),
                relation_domain: relation.domain(),
                catalog_domain: self.domain,
            });
        }
        if self.relations.iter().any(|r| r.name() == relation.name()) {
            return Err(EngineError::DuplicateRelation {
                name: relation.name().to_string(),
                domain: self.domain,
            });
        }
        self.relations.push(relation);
        Ok(())
    }

    /// Number of registered relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// True when no relation is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Iterates relations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.relations.iter().map(Relation::name).collect()
    }

    /// Looks up a relation by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name() == name)
    }

    /// Resolves a selection against this catalog, preserving catalog order.
    pub fn select(&self, selection: &Selection) -> Result<Vec<&Relation>, EngineError> {
        match selection {
            Selection::All => Ok(self.relations.iter().collect()),
            Selection::Named(names) => {
                for name in names {
                    if self.get(name).is_none() {
                        return Err(EngineError::UnknownRelation {
                            name: name.clone(),
                            domain: self.domain,
                        });
                    }
                }
                Ok(self
                    .relations
                    .iter()
                    .filter(|r| names.iter().any(|n| n == r.name()))
                    .collect())
            }
        }
    }
}

/// A uniform random permutation of `0..n` (Fisher-Yates).
fn shuffled_indices(n: usize, rng: &mut DetRng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.range_usize(0, i);
        indices.swap(i, j);
    }
    indices
}

fn scalar_pair(a: &crate::value::Output, b: &crate::value::Output) -> Option<(f64, f64)> {
    Some((a.as_scalar()?, b.as_scalar()?))
}

fn parsed_pair(a: &crate::value::Output, b: &crate::value::Output) -> Option<(JsonValue, JsonValue)> {
    let a = serde_json::from_str(a.as_text()?).ok()?;
    let b = serde_json::from_str(b.as_text()?).ok()?;
    Some((a, b))
}

fn triangle_pair(
    a: &crate::value::Output,
    b: &crate::value::Output,
) -> Option<((TriangleKind, f64), (TriangleKind, f64))> {
    use crate::value::Output;
    match (a, b) {
        (
            Output::Triangle { kind: ka, area: xa },
            Output::Triangle { kind: kb, area: xb },
        ) => Some(((*ka, *xa), (*kb, *xb))),
        _ => None,
    }
}

/// Builtin relations over square matrices and their determinant.
fn matrix_relations() -> Vec<Relation> {
    let domain = Domain::SquareMatrix;
    vec![
        Relation::builder("transpose_preserves_determinant", domain)
            .description("det(A^T) = det(A)")
            .transform(|case, _| Some(Value::Matrix(case.value.as_matrix()?.transpose())))
            .compare(|a, b, ctx| {
                scalar_pair(a, b).is_some_and(|(x, y)| tolerance_eq(x, y, ctx.epsilon))
            })
            .build(),
        Relation::builder("row_scale_triples_determinant", domain)
            .description("scaling one row by 3 scales det by 3")
            .precondition(|case| case.value.as_matrix().is_some_and(|m| m.row_count() >= 1))
            .transform(|case, rng| {
                let m = case.value.as_matrix()?;
                let row = rng.range_usize(0, m.row_count().checked_sub(1)?);
                m.scale_row(row, 3.0).map(Value::Matrix)
            })
            .compare(|a, b, ctx| {
                scalar_pair(a, b).is_some_and(|(x, y)| tolerance_eq(3.0 * x, y, ctx.epsilon))
            })
            .build(),
        Relation::builder("zero_row_kills_determinant", domain)
            .description("scaling one row by 0 forces det = 0")
            .precondition(|case| case.value.as_matrix().is_some_and(|m| m.row_count() >= 1))
            .transform(|case, rng| {
                let m = case.value.as_matrix()?;
                let row = rng.range_usize(0, m.row_count().checked_sub(1)?);
                m.scale_row(row, 0.0).map(Value::Matrix)
            })
            .compare(|a, b, ctx| {
                scalar_pair(a, b).is_some_and(|(_, y)| tolerance_eq(y, 0.0, ctx.epsilon))
            })
            .build(),
        Relation::builder("row_swap_negates_determinant", domain)
            .description("exchanging two rows negates det")
            .precondition(|case| case.value.as_matrix().is_some_and(|m| m.row_count() >= 2))
            .transform(|case, rng| {
                let m = case.value.as_matrix()?;
                let i = rng.range_usize(0, m.row_count() - 1);
                let j = rng.range_usize(0, m.row_count() - 2);
                let j = if j >= i { j + 1 } else { j };
                m.swap_rows(i, j).map(Value::Matrix)
            })
            .compare(|a, b, ctx| {
                scalar_pair(a, b).is_some_and(|(x, y)| tolerance_eq(x, -y, ctx.epsilon))
            })
            .build(),
        Relation::builder("row_permutation_preserves_abs_determinant", domain)
            .description("any row permutation preserves |det|")
            .precondition(|case| case.value.as_matrix().is_some_and(|m| m.row_count() >= 2))
            .transform(|case, rng| {
                let m = case.value.as_matrix()?;
                let permutation = shuffled_indices(m.row_count(), rng);
                m.permute_rows(&permutation).map(Value::Matrix)
            })
            .compare(|a, b, ctx| {
                scalar_pair(a, b).is_some_and(|(x, y)| tolerance_eq(x.abs(), y.abs(), ctx.epsilon))
            })
            .build(),
    ]
}

/// Builtin relations over JSON trees and their serialized form.
fn json_relations() -> Vec<Relation> {
    let domain = Domain::Json;
    vec![
        Relation::builder("add_key_grows_serialized_len", domain)
            .description("inserting a fresh key strictly grows the serialized form")
            .precondition(|case| case.value.as_json().is_some_and(JsonValue::is_object))
            .transform(|case, rng| {
                let tree = case.value.as_json()?;
                let mut object = tree.as_object()?.clone();
                // Generated keys are "kNN"; the "z" namespace never collides.
                let key = format!("z{:02}", rng.range_usize(0, 99));
                object.insert(key, JsonValue::from(rng.range_i64(-9, 9)));
                Some(Value::Json(JsonValue::Object(object)))
            })
            .compare(|a, b, _| match (a.as_text(), b.as_text()) {
                (Some(x), Some(y)) => x.len() < y.len(),
                _ => false,
            })
            .build(),
        Relation::builder("remove_key_shrinks_serialized_len", domain)
            .description("removing a key strictly shrinks the serialized form")
            .precondition(|case| {
                case.value
                    .as_json()
                    .and_then(JsonValue::as_object)
                    .is_some_and(|o| !o.is_empty())
            })
            .transform(|case, rng| {
                let mut object = case.value.as_json()?.as_object()?.clone();
                let victim = {
                    let keys: Vec<&String> = object.keys().collect();
                    keys[rng.range_usize(0, keys.len() - 1)].clone()
                };
                object.remove(&victim);
                Some(Value::Json(JsonValue::Object(object)))
            })
            .compare(|a, b, _| match (a.as_text(), b.as_text()) {
                (Some(x), Some(y)) => x.len() > y.len(),
                _ => false,
            })
            .build(),
        Relation::builder("remove_key_drops_one_entry", domain)
            .description("removing a key reduces the entry count by exactly one")
            .precondition(|case| {
                case.value
                    .as_json()
                    .and_then(JsonValue::as_object)
                    .is_some_and(|o| !o.is_empty())
            })
            .transform(|case, rng| {
                let mut object = case.value.as_json()?.as_object()?.clone();
                let victim = {
                    let keys: Vec<&String> = object.keys().collect();
                    keys[rng.range_usize(0, keys.len() - 1)].clone()
                };
                object.remove(&victim);
                Some(Value::Json(JsonValue::Object(object)))
            })
            .compare(|a, b, _| {
                parsed_pair(a, b)
                    .is_some_and(|(x, y)| x.is_object() && y.is_object() && json_size(&x) == json_size(&y) + 1)
            })
            .build(),
        Relation::builder("wrap_in_array_preserves_tree", domain)
            .description("wrapping the root in a one-element array preserves it structurally")
            .transform(|case, _| {
                let tree = case.value.as_json()?.clone();
                Some(Value::Json(JsonValue::Array(vec![tree])))
            })
            .compare(|a, b, ctx| {
                parsed_pair(a, b).is_some_and(|(x, y)| {
                    y.as_array().is_some_and(|items| {
                        items.len() == 1
                            && structural_eq(&x, &items[0], SeqOrder::Positional, ctx.epsilon)
                    })
                })
            })
            .build(),
        Relation::builder("shuffle_array_is_multiset_equal", domain)
            .description("shuffling a root array preserves it as a multiset")
            .precondition(|case| {
                case.value
                    .as_json()
                    .and_then(JsonValue::as_array)
                    .is_some_and(|items| items.len() >= 2)
            })
            .transform(|case, rng| {
                let items = case.value.as_json()?.as_array()?;
                let order = shuffled_indices(items.len(), rng);
                let shuffled = order.iter().map(|&i| items[i].clone()).collect();
                Some(Value::Json(JsonValue::Array(shuffled)))
            })
            .compare(|a, b, ctx| {
                parsed_pair(a, b)
                    .is_some_and(|(x, y)| structural_eq(&x, &y, SeqOrder::Unordered, ctx.epsilon))
            })
            .build(),
    ]
}

/// Builtin relations over integer triples and the triangle classifier.
fn triple_relations() -> Vec<Relation> {
    let domain = Domain::IntTriple;
    let positive = |case: &crate::generate::Case| {
        case.value.as_triple().is_some_and(|t| t.all_positive())
    };
    vec![
        Relation::builder("side_permutation_invariance", domain)
            .description("classification and area are invariant under side permutation")
            .precondition(positive)
            .transform(|case, rng| {
                let t = case.value.as_triple()?;
                Some(Value::Triple(t.permutation(rng.next_u64())))
            })
            .compare(|a, b, ctx| {
                triangle_pair(a, b).is_some_and(|((ka, xa), (kb, xb))| {
                    ka == kb && tolerance_eq(xa, xb, ctx.epsilon)
                })
            })
            .build(),
        Relation::builder("rotation_invariance", domain)
            .description("cyclic side rotation changes nothing")
            .precondition(positive)
            .transform(|case, _| Some(Value::Triple(case.value.as_triple()?.rotated())))
            .compare(|a, b, ctx| {
                triangle_pair(a, b).is_some_and(|((ka, xa), (kb, xb))| {
                    ka == kb && tolerance_eq(xa, xb, ctx.epsilon)
                })
            })
            .build(),
        Relation::builder("uniform_scale_quadruples_area", domain)
            .description("doubling all sides preserves the class and quadruples the area")
            .precondition(positive)
            .transform(|case, _| case.value.as_triple()?.scaled(2).map(Value::Triple))
            .compare(|a, b, ctx| {
                triangle_pair(a, b).is_some_and(|((ka, xa), (kb, xb))| {
                    ka == kb && tolerance_eq(4.0 * xa, xb, ctx.epsilon)
                })
            })
            .build(),
        Relation::builder("degenerate_rewrite_flattens", domain)
            .description("setting the largest side to the sum of the others yields class 0, area 0")
            .precondition(positive)
            .transform(|case, _| case.value.as_triple()?.degenerate_rewrite().map(Value::Triple))
            .compare(|_, b, ctx| match b {
                crate::value::Output::Triangle { kind, area } => {
                    *kind == TriangleKind::Degenerate && tolerance_eq(*area, 0.0, ctx.epsilon)
                }
                _ => false,
            })
            .build(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{Case, CaseId};
    use crate::relation::CompareCtx;
    use crate::value::{Matrix, Output};
    use serde_json::json;

    fn case(value: Value) -> Case {
        Case {
            id: CaseId { seed: 0, index: 0 },
            value,
        }
    }

    #[test]
    fn builtin_catalogs_are_nonempty_and_unique() {
        for domain in [Domain::SquareMatrix, Domain::Json, Domain::IntTriple] {
            let catalog = RelationCatalog::builtin(domain);
            assert!(catalog.len() >= 4, "{domain} catalog too small");
            let names = catalog.names();
            let set: std::collections::BTreeSet<_> = names.iter().collect();
            assert_eq!(set.len(), names.len(), "{domain} duplicate names");
            assert!(catalog.iter().all(|r| r.domain() == domain));
        }
    }

    #[test]
    fn register_rejects_domain_mismatch() {
        let mut catalog = RelationCatalog::new(Domain::Json);
        let relation = Relation::builder("misplaced", Domain::IntTriple)
            .transform(|case, _| Some(case.value.clone()))
            .compare(|_, _, _| true)
            .build();
        assert!(matches!(
            catalog.register(relation),
            Err(EngineError::DomainMismatch { .. })
        ));
    }

    #[test]
    fn register_rejects_duplicate_name() {
        let mut catalog = RelationCatalog::new(Domain::Json);
        for _ in 0..2 {
            let relation = Relation::builder("twice", Domain::Json)
                .transform(|case, _| Some(case.value.clone()))
                .compare(|_, _, _| true)
                .build();
            let _ = catalog.register(relation);
        }
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn select_all_preserves_order() {
        let catalog = RelationCatalog::builtin(Domain::SquareMatrix);
        let selected = catalog.select(&Selection::All).unwrap();
        assert_eq!(
            selected.iter().map(|r| r.name()).collect::<Vec<_>>(),
            catalog.names()
        );
    }

    #[test]
    fn select_named_subset_and_unknown() {
        let catalog = RelationCatalog::builtin(Domain::IntTriple);
        let selected = catalog
            .select(&Selection::Named(vec!["rotation_invariance".into()]))
            .unwrap();
        assert_eq!(selected.len(), 1);

        let err = catalog
            .select(&Selection::Named(vec!["not_a_relation".into()]))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownRelation { .. }));
    }

    #[test]
    fn transpose_relation_applies_to_empty_matrix() {
        // The 0x0 matrix passes the precondition; it is the SUT invocation
        // that errors, which the runner records as ERROR, not SKIPPED.
        let catalog = RelationCatalog::builtin(Domain::SquareMatrix);
        let relation = catalog.get("transpose_preserves_determinant").unwrap();
        assert!(relation.precondition(&case(Value::Matrix(Matrix::identity(0)))));
    }

    #[test]
    fn row_swap_needs_two_rows() {
        let catalog = RelationCatalog::builtin(Domain::SquareMatrix);
        let relation = catalog.get("row_swap_negates_determinant").unwrap();
        assert!(!relation.precondition(&case(Value::Matrix(Matrix::identity(1)))));
        assert!(relation.precondition(&case(Value::Matrix(Matrix::identity(2)))));
    }

    #[test]
    fn row_swap_transform_picks_distinct_rows() {
        let catalog = RelationCatalog::builtin(Domain::SquareMatrix);
        let relation = catalog.get("row_swap_negates_determinant").unwrap();
        let input = case(Value::Matrix(
            Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap(),
        ));
        for seed in 0..32 {
            let mut rng = DetRng::new(seed);
            let out = relation.transform(&input, &mut rng).unwrap();
            assert_ne!(out, input.value, "swap produced the identity");
        }
    }

    #[test]
    fn empty_object_skips_remove_key() {
        let catalog = RelationCatalog::builtin(Domain::Json);
        let relation = catalog.get("remove_key_shrinks_serialized_len").unwrap();
        assert!(!relation.precondition(&case(Value::Json(json!({})))));
        assert!(relation.precondition(&case(Value::Json(json!({"a": 1})))));
    }

    #[test]
    fn comparators_reject_shape_mismatch() {
        let catalog = RelationCatalog::builtin(Domain::SquareMatrix);
        let relation = catalog.get("transpose_preserves_determinant").unwrap();
        let ctx = CompareCtx { epsilon: 1e-6 };
        // A text output where a scalar is expected is a mismatch, not a panic.
        assert!(!relation.compare(
            &Output::Text("{}".into()),
            &Output::Scalar(1.0),
            &ctx
        ));
    }

    #[test]
    fn degenerate_rewrite_compare_checks_followup_only() {
        let catalog = RelationCatalog::builtin(Domain::IntTriple);
        let relation = catalog.get("degenerate_rewrite_flattens").unwrap();
        let ctx = CompareCtx { epsilon: 1e-6 };
        let degenerate = Output::Triangle {
            kind: TriangleKind::Degenerate,
            area: 0.0,
        };
        let scalene = Output::Triangle {
            kind: TriangleKind::Scalene,
            area: 6.0,
        };
        assert!(relation.compare(&scalene, &degenerate, &ctx));
        assert!(!relation.compare(&degenerate, &scalene, &ctx));
    }
}
