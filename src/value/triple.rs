//! Integer triples (candidate triangle side lengths) and their rewrites.

use serde::Serialize;

/// An ordered triple of integers, interpreted by the triangle SUT as side
/// lengths `(a, b, c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Triple {
    /// First side.
    pub a: i64,
    /// Second side.
    pub b: i64,
    /// Third side.
    pub c: i64,
}

impl Triple {
    /// Creates a triple.
    #[must_use]
    pub const fn new(a: i64, b: i64, c: i64) -> Self {
        Self { a, b, c }
    }

    /// True when every side is strictly positive.
    #[must_use]
    pub const fn all_positive(&self) -> bool {
        self.a > 0 && self.b > 0 && self.c > 0
    }

    /// The `index`-th of the six permutations of the sides (`index % 6`).
    /// Index 0 is the identity.
    #[must_use]
    pub const fn permutation(&self, index: u64) -> Self {
        let (a, b, c) = (self.a, self.b, self.c);
        match index % 6 {
            0 => Self::new(a, b, c),
            1 => Self::new(a, c, b),
            2 => Self::new(b, a, c),
            3 => Self::new(b, c, a),
            4 => Self::new(c, a, b),
            _ => Self::new(c, b, a),
        }
    }

    /// Cyclic rotation `(a, b, c) -> (b, c, a)`.
    #[must_use]
    pub const fn rotated(&self) -> Self {
        Self::new(self.b, self.c, self.a)
    }

    /// All sides multiplied by `factor`. `None` on overflow.
    #[must_use]
    pub fn scaled(&self, factor: i64) -> Option<Self> {
        Some(Self::new(
            self.a.checked_mul(factor)?,
            self.b.checked_mul(factor)?,
            self.c.checked_mul(factor)?,
        ))
    }

    /// Rewrites the largest side to the sum of the other two, producing a
    /// degenerate (zero-area) triangle. `None` on overflow.
    #[must_use]
    pub fn degenerate_rewrite(&self) -> Option<Self> {
        let (a, b, c) = (self.a, self.b, self.c);
        if a >= b && a >= c {
            Some(Self::new(b.checked_add(c)?, b, c))
        } else if b >= a && b >= c {
            Some(Self::new(a, a.checked_add(c)?, c))
        } else {
            Some(Self::new(a, b, a.checked_add(b)?))
        }
    }

    /// Sides in ascending order.
    #[must_use]
    pub fn sorted_sides(&self) -> [i64; 3] {
        let mut sides = [self.a, self.b, self.c];
        sides.sort_unstable();
        sides
    }
}
