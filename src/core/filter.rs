// filter.rs - Core-column filter (complete deletion)

use std::collections::HashSet;

use crate::data::block::Block;
use crate::data::identity::IdentityId;

/// What the core filter kept and removed
#[derive(Debug, Clone, Default)]
pub struct CoreFilterSummary {
    pub blocks_in: usize,
    pub blocks_kept: usize,
    pub columns_masked: usize,
}

/// Union of identities over every block of the stream
pub fn full_identity_set(blocks: &[Block]) -> HashSet<IdentityId> {
    blocks.iter().flat_map(|b| b.records.iter().map(|r| r.identity)).collect()
}

/// Keep only blocks covering exactly `full`, then mask every gapped column.
///
/// A block missing any identity is dropped whole. In each kept block a column
/// with a gap in any record becomes a gap in all records.
pub fn apply_core_filter(
    blocks: Vec<Block>,
    full: &HashSet<IdentityId>,
) -> (Vec<Block>, CoreFilterSummary) {
    let mut summary = CoreFilterSummary {
        blocks_in: blocks.len(),
        ..Default::default()
    };

    let mut kept: Vec<Block> = blocks
        .into_iter()
        .filter(|block| block.identities() == *full)
        .collect();
    for block in &mut kept {
        summary.columns_masked += block.mask_gapped_columns();
    }
    summary.blocks_kept = kept.len();
    (kept, summary)
}

/// Buffer-and-filter in one call: computes the full set from `blocks` itself
pub fn core_columns(blocks: Vec<Block>) -> (Vec<Block>, CoreFilterSummary) {
    let full = full_identity_set(&blocks);
    apply_core_filter(blocks, &full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compare::ComparisonKernel;
    use crate::core::matrix::DistanceMatrix;
    use crate::core::stats::ComparisonStat;
    use crate::data::block::{SequenceRecord, GAP};

    fn block(rows: &[(IdentityId, &str)]) -> Block {
        Block::from_records(
            rows.iter()
                .map(|&(id, seq)| SequenceRecord::new(id, seq))
                .collect(),
        )
    }

    #[test]
    fn test_drops_blocks_missing_identities() {
        let blocks = vec![
            block(&[(0, "ACGT"), (1, "ACGT")]),
            block(&[(0, "AAAA"), (1, "AAAT"), (2, "AAAA")]),
        ];
        let (kept, summary) = core_columns(blocks);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].len(), 3);
        assert_eq!(summary.blocks_in, 2);
        assert_eq!(summary.blocks_kept, 1);
    }

    #[test]
    fn test_masks_gapped_columns_for_every_pair() {
        let blocks = vec![block(&[(0, "AC-T"), (1, "ACGT"), (2, "TCGA")])];
        let (kept, summary) = core_columns(blocks);
        assert_eq!(summary.columns_masked, 1);
        assert!(kept[0].records.iter().all(|r| r.sequence[2] == GAP));

        let m = DistanceMatrix::from_blocks(&kept, ComparisonKernel::Scalar).unwrap();
        // column 2 contributes to no pair, including (1, 2) which had no gap there
        assert_eq!(m.stat(1, 2), ComparisonStat::new(3, 2));
        assert_eq!(m.stat(0, 1), ComparisonStat::new(3, 0));
    }

    #[test]
    fn test_duplicate_identities_do_not_break_set_equality() {
        let blocks = vec![
            block(&[(0, "AC"), (0, "AG"), (1, "AC")]),
            block(&[(1, "AC"), (0, "AC")]),
        ];
        let (kept, _) = core_columns(blocks);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_empty_stream() {
        let (kept, summary) = core_columns(Vec::new());
        assert!(kept.is_empty());
        assert_eq!(summary.blocks_kept, 0);
    }
}
