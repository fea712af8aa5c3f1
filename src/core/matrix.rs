// matrix.rs - Symmetric pairwise statistic accumulator

use std::collections::HashMap;
use std::ops::Add;

use rayon::prelude::*;

use crate::core::compare::ComparisonKernel;
use crate::core::distance::{corrected_distance, Distance};
use crate::core::stats::ComparisonStat;
use crate::data::block::Block;
use crate::data::identity::{IdentityId, PairKey};
use crate::error::Result;

/// Accumulated statistics keyed by canonical identity pair.
///
/// Merging is entry-wise `ComparisonStat::combine`, so partial matrices can be
/// reduced in any order or grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceMatrix {
    entries: HashMap<PairKey, ComparisonStat>,
}

impl DistanceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partial matrix of one block: every unordered pair of records with distinct identities
    pub fn from_block(block: &Block, kernel: ComparisonKernel) -> Result<Self> {
        let mut matrix = Self::new();
        let records = &block.records;
        for i in 0..records.len() {
            for j in 0..i {
                let Some(key) = PairKey::new(records[i].identity, records[j].identity) else {
                    continue;
                };
                let stat = kernel.compare(&records[i].sequence, &records[j].sequence)?;
                matrix.add_stat(key, stat);
            }
        }
        Ok(matrix)
    }

    /// Map every block to a partial matrix in parallel and reduce them
    pub fn from_blocks(blocks: &[Block], kernel: ComparisonKernel) -> Result<Self> {
        blocks
            .par_iter()
            .map(|block| Self::from_block(block, kernel))
            .try_reduce(Self::new, |a, b| Ok(a.combine(b)))
    }

    /// Combine `stat` into the entry for `key`
    pub fn add_stat(&mut self, key: PairKey, stat: ComparisonStat) {
        *self.entries.entry(key).or_default() += stat;
    }

    /// Fold another matrix into this one
    pub fn merge(&mut self, other: DistanceMatrix) {
        for (key, stat) in other.entries {
            self.add_stat(key, stat);
        }
    }

    /// Merge two matrices, iterating over the smaller one
    pub fn combine(mut self, mut other: DistanceMatrix) -> DistanceMatrix {
        if self.entries.len() < other.entries.len() {
            std::mem::swap(&mut self, &mut other);
        }
        self.merge(other);
        self
    }

    /// Statistic for a pair; zero for the diagonal and for pairs never seen together
    pub fn stat(&self, a: IdentityId, b: IdentityId) -> ComparisonStat {
        PairKey::new(a, b)
            .and_then(|key| self.entries.get(&key).copied())
            .unwrap_or_default()
    }

    /// Corrected distance for a pair; always 0 on the diagonal
    pub fn distance(&self, a: IdentityId, b: IdentityId) -> Distance {
        if a == b {
            return Distance::Value(0.0);
        }
        corrected_distance(&self.stat(a, b))
    }

    pub fn get(&self, key: &PairKey) -> Option<&ComparisonStat> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &ComparisonStat)> {
        self.entries.iter()
    }

    /// Number of pairs with at least one contribution
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Add for DistanceMatrix {
    type Output = DistanceMatrix;

    fn add(self, other: DistanceMatrix) -> DistanceMatrix {
        self.combine(other)
    }
}
