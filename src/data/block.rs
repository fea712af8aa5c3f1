// block.rs - Alignment blocks and their sequence records

use std::collections::HashSet;

use crate::data::identity::IdentityId;

/// Alignment gap character; never counted in comparisons
pub const GAP: u8 = b'-';

/// One `s` line of a block: who it belongs to and its aligned bases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub identity: IdentityId,
    pub sequence: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(identity: IdentityId, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            identity,
            sequence: sequence.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// An `a` section of a MAF stream.
///
/// The reader guarantees that every record has the same aligned length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub records: Vec<SequenceRecord>,
    /// 1-based line number of the `a` line
    pub line: usize,
}

impl Block {
    pub fn new(line: usize) -> Self {
        Self {
            records: Vec::new(),
            line,
        }
    }

    pub fn from_records(records: Vec<SequenceRecord>) -> Self {
        Self { records, line: 0 }
    }

    /// Aligned length shared by all records; `None` for an empty block
    pub fn aligned_length(&self) -> Option<usize> {
        self.records.first().map(|r| r.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct identities present in this block
    pub fn identities(&self) -> HashSet<IdentityId> {
        self.records.iter().map(|r| r.identity).collect()
    }

    /// Per-column flag: true when any record has a gap in that column
    pub fn gap_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.aligned_length().unwrap_or(0)];
        for record in &self.records {
            for (flag, &base) in mask.iter_mut().zip(record.sequence.iter()) {
                *flag |= base == GAP;
            }
        }
        mask
    }

    /// Overwrite every column gapped in any record with a gap in all records.
    ///
    /// Returns the number of columns masked. Sequence lengths are unchanged.
    pub fn mask_gapped_columns(&mut self) -> usize {
        let mask = self.gap_mask();
        for record in &mut self.records {
            for (base, &gapped) in record.sequence.iter_mut().zip(mask.iter()) {
                if gapped {
                    *base = GAP;
                }
            }
        }
        mask.iter().filter(|&&gapped| gapped).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(seqs: &[&str]) -> Block {
        Block::from_records(
            seqs.iter()
                .enumerate()
                .map(|(i, s)| SequenceRecord::new(i, s.as_bytes()))
                .collect(),
        )
    }

    #[test]
    fn test_gap_mask_marks_columns_gapped_anywhere() {
        let b = block(&["AC-T", "ACGT", "A-GT"]);
        assert_eq!(b.gap_mask(), vec![false, true, true, false]);
    }

    #[test]
    fn test_mask_gapped_columns() {
        let mut b = block(&["AC-T", "ACGT", "A-GT"]);
        let masked = b.mask_gapped_columns();
        assert_eq!(masked, 2);
        for record in &b.records {
            assert_eq!(record.len(), 4);
            assert_eq!(record.sequence[1], GAP);
            assert_eq!(record.sequence[2], GAP);
        }
        assert_eq!(b.records[1].sequence, b"A--T".to_vec());
    }

    #[test]
    fn test_identities_are_a_set() {
        let b = Block::from_records(vec![
            SequenceRecord::new(0, "AC"),
            SequenceRecord::new(1, "AC"),
            SequenceRecord::new(0, "AG"),
        ]);
        let ids = b.identities();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&0) && ids.contains(&1));
    }

    #[test]
    fn test_empty_block() {
        let mut b = Block::new(3);
        assert_eq!(b.aligned_length(), None);
        assert!(b.gap_mask().is_empty());
        assert_eq!(b.mask_gapped_columns(), 0);
    }
}
