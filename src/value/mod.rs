//! Domain value model: typed inputs and outputs plus comparison semantics.
//!
//! Heterogeneous SUT shapes (matrix, JSON tree, integer triple) are modeled
//! as tagged unions so the runner never branches on concrete types: a
//! [`Value`] is any generated input, an [`Output`] is any SUT result, and
//! each relation's comparator knows which variants it expects. A comparator
//! that receives an unexpected variant reports a mismatch, not an error.

pub mod compare;
pub mod matrix;
pub mod triple;

use std::fmt;

use serde::Serialize;
use serde_json::Value as JsonValue;

pub use compare::{SeqOrder, json_size, structural_eq, tolerance_eq};
pub use matrix::Matrix;
pub use triple::Triple;

/// The input domain a run operates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Square matrices of `f64` entries.
    SquareMatrix,
    /// JSON value trees.
    Json,
    /// Integer triples (triangle side candidates).
    IntTriple,
}

impl Domain {
    /// Stable lowercase name, used in reports and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SquareMatrix => "square_matrix",
            Self::Json => "json",
            Self::IntTriple => "int_triple",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A generated input value for some domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// A square matrix.
    Matrix(Matrix),
    /// A JSON tree.
    Json(JsonValue),
    /// An integer triple.
    Triple(Triple),
}

impl Value {
    /// The domain this value belongs to.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        match self {
            Self::Matrix(_) => Domain::SquareMatrix,
            Self::Json(_) => Domain::Json,
            Self::Triple(_) => Domain::IntTriple,
        }
    }

    /// Element count: matrix entries, JSON entries, or 3 for a triple.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Matrix(m) => m.len(),
            Self::Json(j) => json_size(j),
            Self::Triple(_) => 3,
        }
    }

    /// Length of the canonical (compact JSON) serialized form of the
    /// payload.
    #[must_use]
    pub fn serialized_len(&self) -> usize {
        let text = match self {
            Self::Matrix(m) => serde_json::to_string(m),
            Self::Json(j) => serde_json::to_string(j),
            Self::Triple(t) => serde_json::to_string(t),
        };
        text.map_or(0, |s| s.len())
    }

    /// Borrows the matrix variant.
    #[must_use]
    pub const fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Self::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// Borrows the JSON variant.
    #[must_use]
    pub const fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(j) => Some(j),
            _ => None,
        }
    }

    /// Copies out the triple variant.
    #[must_use]
    pub const fn as_triple(&self) -> Option<Triple> {
        match self {
            Self::Triple(t) => Some(*t),
            _ => None,
        }
    }
}

/// Triangle classification codes produced by the triangle SUT.
///
/// `Degenerate` is code 0 so "not a triangle" sorts and serializes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangleKind {
    /// Sides violate the triangle inequality; area is zero.
    Degenerate,
    /// All three sides equal.
    Equilateral,
    /// Exactly two sides equal.
    Isosceles,
    /// All sides distinct.
    Scalene,
}

impl TriangleKind {
    /// Discrete classification code for exact comparison.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Degenerate => 0,
            Self::Equilateral => 1,
            Self::Isosceles => 2,
            Self::Scalene => 3,
        }
    }
}

/// A SUT result.
///
/// Carries enough structure for exact, tolerance, or structural comparison;
/// relations pick the semantics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    /// A scalar floating result (e.g. a determinant).
    Scalar(f64),
    /// A serialized text form (e.g. emitted JSON).
    Text(String),
    /// A parsed tree result.
    Json(JsonValue),
    /// A triangle classification with its area.
    Triangle {
        /// Classification code.
        kind: TriangleKind,
        /// Area (0.0 for degenerate triples).
        area: f64,
    },
}

impl Output {
    /// The scalar payload, if this is a scalar output.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    /// The text payload, if this is a text output.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}
