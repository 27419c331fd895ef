//! # Heaviest-Chain Fork Choice
//!
//! Decides whether a freshly indexed block becomes the canonical head.
//!
//! The metric is cumulative chain difficulty (total work), never block
//! number. A longer chain with less work is stored for a possible later
//! reorganization but cannot become head on length alone.
//!
//! Ties keep the existing head: the first block seen with a given total
//! work wins.

use super::block_index::BlockIndex;
use shared_types::Hash;

/// Outcome of comparing a candidate against the current head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Candidate carries strictly more total work: switch head.
    AdoptAsHead,
    /// Candidate (or head) has no cumulative difficulty in the index, so
    /// it cannot be compared.
    RejectLowerDifficulty,
    /// Store the candidate, keep the head.
    ///
    /// `higher_number` flags the anomaly of a taller chain with less work.
    AcceptNonCanonical { higher_number: bool },
}

/// Compare `candidate` with `current_head`. Both must already be indexed.
///
/// Structural validation (known parent, uncles) happens before this is
/// called; this function only looks at work and height.
pub fn select(current_head: &Hash, candidate: &Hash, index: &BlockIndex) -> Decision {
    let (Some(head), Some(cand)) = (index.entry(current_head), index.entry(candidate)) else {
        return Decision::RejectLowerDifficulty;
    };

    if cand.cumulative_difficulty > head.cumulative_difficulty {
        return Decision::AdoptAsHead;
    }

    Decision::AcceptNonCanonical {
        higher_number: cand.block.number() > head.block.number(),
    }
}
