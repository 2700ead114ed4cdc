//! The system-under-test adapter boundary.
//!
//! The engine calls exactly one operation per domain: [`Sut::invoke`]. It has
//! no knowledge of how the SUT is packaged; adapters wrap whatever callable
//! the integration layer supplies. Panics and timeouts at this boundary are
//! captured into an [`ErrorCause`] so a crashing SUT never aborts a run.
//!
//! Three reference adapters ship with the crate — a determinant routine, a
//! JSON serializer, and a triangle classifier — matching the builtin relation
//! catalogs. They double as integration examples and as the SUTs the test
//! suite exercises.

use std::cmp::Ordering;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::value::{Domain, Matrix, Output, TriangleKind, Value};

/// A SUT declined the input (not an engine failure, not a relation
/// violation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SutRejection(pub String);

/// Why a SUT invocation produced an ERROR verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCause {
    /// The SUT panicked; payload captured when stringly-typed.
    Panic(String),
    /// The invocation exceeded the per-call timeout.
    Timeout,
    /// The SUT rejected the input.
    Rejected(String),
}

/// The opaque system under test.
///
/// `invoke` must be callable from any thread; the runner may dispatch pairs
/// across a worker pool and runs timed invocations on a watchdog thread.
pub trait Sut: Send + Sync {
    /// Stable adapter name for reports and tracing.
    fn name(&self) -> &'static str;

    /// Runs the SUT on one input.
    fn invoke(&self, value: &Value) -> Result<Output, SutRejection>;
}

/// Invokes the SUT with panic capture.
pub fn invoke_guarded(sut: &dyn Sut, value: &Value) -> Result<Output, ErrorCause> {
    match catch_unwind(AssertUnwindSafe(|| sut.invoke(value))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(rejection)) => Err(ErrorCause::Rejected(rejection.0)),
        Err(payload) => Err(ErrorCause::Panic(panic_message(payload.as_ref()))),
    }
}

/// Invokes the SUT with panic capture and an optional per-call timeout.
///
/// A timed invocation runs on a watchdog thread; on timeout the call is
/// abandoned (the thread finishes in the background and its result is
/// discarded) rather than killed, so a stateful SUT is never corrupted
/// mid-call.
pub fn invoke_bounded(
    sut: &Arc<dyn Sut>,
    value: &Value,
    timeout: Option<Duration>,
) -> Result<Output, ErrorCause> {
    let Some(limit) = timeout else {
        return invoke_guarded(sut.as_ref(), value);
    };

    let (tx, rx) = mpsc::sync_channel(1);
    let moved_sut = Arc::clone(sut);
    let moved_value = value.clone();
    let spawned = thread::Builder::new()
        .name("morphlab-sut".into())
        .spawn(move || {
            let _ = tx.send(invoke_guarded(moved_sut.as_ref(), &moved_value));
        });
    if spawned.is_err() {
        // Could not stand up a watchdog; fall back to an unbounded call.
        return invoke_guarded(sut.as_ref(), value);
    }
    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(_) => Err(ErrorCause::Timeout),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

/// The reference adapter for a domain's builtin catalog.
#[must_use]
pub fn builtin_sut(domain: Domain) -> Arc<dyn Sut> {
    match domain {
        Domain::SquareMatrix => Arc::new(DeterminantSut),
        Domain::Json => Arc::new(JsonCodecSut),
        Domain::IntTriple => Arc::new(TriangleSut),
    }
}

/// Determinant of a square matrix via LU elimination with partial pivoting.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeterminantSut;

impl Sut for DeterminantSut {
    fn name(&self) -> &'static str {
        "determinant"
    }

    fn invoke(&self, value: &Value) -> Result<Output, SutRejection> {
        let matrix = value
            .as_matrix()
            .ok_or_else(|| SutRejection(format!("expected a matrix, got {}", value.domain())))?;
        if matrix.is_empty() {
            return Err(SutRejection("determinant undefined for 0x0 matrix".into()));
        }
        if !matrix.is_square() {
            return Err(SutRejection(format!(
                "matrix is {}x{}, not square",
                matrix.row_count(),
                matrix.col_count()
            )));
        }
        Ok(Output::Scalar(determinant(matrix)))
    }
}

fn determinant(matrix: &Matrix) -> f64 {
    let n = matrix.row_count();
    let mut a: Vec<Vec<f64>> = matrix.rows().to_vec();
    let mut det = 1.0;
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot][col] == 0.0 {
            return 0.0;
        }
        if pivot != col {
            a.swap(pivot, col);
            det = -det;
        }
        det *= a[col][col];
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }
    det
}

/// Compact JSON serializer: the output is the serialized text form.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodecSut;

impl Sut for JsonCodecSut {
    fn name(&self) -> &'static str {
        "json_codec"
    }

    fn invoke(&self, value: &Value) -> Result<Output, SutRejection> {
        let tree = value
            .as_json()
            .ok_or_else(|| SutRejection(format!("expected json, got {}", value.domain())))?;
        serde_json::to_string(tree)
            .map(Output::Text)
            .map_err(|e| SutRejection(format!("serialization failed: {e}")))
    }
}

/// Triangle classifier: classification code plus Heron area.
#[derive(Debug, Default, Clone, Copy)]
pub struct TriangleSut;

impl Sut for TriangleSut {
    fn name(&self) -> &'static str {
        "triangle"
    }

    fn invoke(&self, value: &Value) -> Result<Output, SutRejection> {
        let t = value
            .as_triple()
            .ok_or_else(|| SutRejection(format!("expected a triple, got {}", value.domain())))?;
        if !t.all_positive() {
            return Err(SutRejection(format!(
                "sides must be positive, got ({}, {}, {})",
                t.a, t.b, t.c
            )));
        }
        let [x, y, z] = t.sorted_sides();
        if x + y <= z {
            return Ok(Output::Triangle {
                kind: TriangleKind::Degenerate,
                area: 0.0,
            });
        }
        let kind = if t.a == t.b && t.b == t.c {
            TriangleKind::Equilateral
        } else if t.a == t.b || t.b == t.c || t.a == t.c {
            TriangleKind::Isosceles
        } else {
            TriangleKind::Scalene
        };
        let (a, b, c) = (t.a as f64, t.b as f64, t.c as f64);
        let s = (a + b + c) / 2.0;
        let area = (s * (s - a) * (s - b) * (s - c)).sqrt();
        Ok(Output::Triangle { kind, area })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Triple;
    use serde_json::json;

    #[test]
    fn determinant_of_known_matrix() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let out = DeterminantSut.invoke(&Value::Matrix(m)).unwrap();
        assert!((out.as_scalar().unwrap() - -2.0).abs() < 1e-9);
    }

    #[test]
    fn determinant_identity_is_one() {
        let out = DeterminantSut
            .invoke(&Value::Matrix(Matrix::identity(4)))
            .unwrap();
        assert!((out.as_scalar().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn determinant_singular_is_zero() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        let out = DeterminantSut.invoke(&Value::Matrix(m)).unwrap();
        assert!(out.as_scalar().unwrap().abs() < 1e-9);
    }

    #[test]
    fn determinant_rejects_empty_matrix() {
        let err = DeterminantSut
            .invoke(&Value::Matrix(Matrix::identity(0)))
            .unwrap_err();
        assert!(err.0.contains("0x0"));
    }

    #[test]
    fn determinant_rejects_wrong_domain() {
        assert!(DeterminantSut.invoke(&Value::Json(json!({}))).is_err());
    }

    #[test]
    fn json_codec_emits_compact_text() {
        let out = JsonCodecSut
            .invoke(&Value::Json(json!({"a": "1", "b": "2"})))
            .unwrap();
        assert_eq!(out.as_text().unwrap(), r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn triangle_scalene_area() {
        let out = TriangleSut
            .invoke(&Value::Triple(Triple::new(3, 4, 5)))
            .unwrap();
        assert_eq!(
            out,
            Output::Triangle {
                kind: TriangleKind::Scalene,
                area: 6.0
            }
        );
    }

    #[test]
    fn triangle_degenerate_has_zero_area() {
        let out = TriangleSut
            .invoke(&Value::Triple(Triple::new(1, 2, 3)))
            .unwrap();
        assert_eq!(
            out,
            Output::Triangle {
                kind: TriangleKind::Degenerate,
                area: 0.0
            }
        );
    }

    #[test]
    fn triangle_rejects_nonpositive_sides() {
        assert!(TriangleSut.invoke(&Value::Triple(Triple::new(0, 2, 3))).is_err());
        assert!(TriangleSut.invoke(&Value::Triple(Triple::new(-1, 2, 3))).is_err());
    }

    #[test]
    fn guarded_invoke_captures_panic() {
        struct PanickySut;
        impl Sut for PanickySut {
            fn name(&self) -> &'static str {
                "panicky"
            }
            fn invoke(&self, _: &Value) -> Result<Output, SutRejection> {
                panic!("boom");
            }
        }
        let cause = invoke_guarded(&PanickySut, &Value::Json(json!(null))).unwrap_err();
        assert_eq!(cause, ErrorCause::Panic("boom".into()));
    }

    #[test]
    fn bounded_invoke_times_out() {
        struct SlowSut;
        impl Sut for SlowSut {
            fn name(&self) -> &'static str {
                "slow"
            }
            fn invoke(&self, _: &Value) -> Result<Output, SutRejection> {
                thread::sleep(Duration::from_millis(200));
                Ok(Output::Scalar(0.0))
            }
        }
        let sut: Arc<dyn Sut> = Arc::new(SlowSut);
        let cause = invoke_bounded(
            &sut,
            &Value::Json(json!(null)),
            Some(Duration::from_millis(20)),
        )
        .unwrap_err();
        assert_eq!(cause, ErrorCause::Timeout);
    }

    #[test]
    fn bounded_invoke_passes_through_fast_calls() {
        let sut: Arc<dyn Sut> = Arc::new(TriangleSut);
        let out = invoke_bounded(
            &sut,
            &Value::Triple(Triple::new(3, 4, 5)),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert!(matches!(out, Output::Triangle { .. }));
    }
}
