// stats.rs - Match/mismatch accumulator for one identity pair

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Counts gathered over gap-free alignment columns.
///
/// `combine` is associative and commutative with `ComparisonStat::default()`
/// (both counts zero) as identity element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComparisonStat {
    /// Columns where neither sequence has a gap
    pub compared: u64,
    /// Subset of `compared` where the characters differ
    pub mismatches: u64,
}

impl ComparisonStat {
    pub fn new(compared: u64, mismatches: u64) -> Self {
        debug_assert!(mismatches <= compared);
        Self {
            compared,
            mismatches,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            compared: self.compared + other.compared,
            mismatches: self.mismatches + other.mismatches,
        }
    }

    /// True when no gap-free column was ever compared
    pub fn is_degenerate(&self) -> bool {
        self.compared == 0
    }

    /// Observed mismatch fraction; `None` for a degenerate statistic
    pub fn raw(&self) -> Option<f64> {
        if self.compared == 0 {
            None
        } else {
            Some(self.mismatches as f64 / self.compared as f64)
        }
    }
}

impl Add for ComparisonStat {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.combine(other)
    }
}

impl AddAssign for ComparisonStat {
    fn add_assign(&mut self, other: Self) {
        *self = self.combine(other);
    }
}

impl Sum for ComparisonStat {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::combine)
    }
}
