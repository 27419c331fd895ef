//! Uncle validation
//!
//! An uncle is a sibling or cousin header referenced by a later block. The
//! rules bound how far back an uncle may reach and forbid double inclusion.

use super::block_index::BlockIndex;
use shared_types::{Block, Hash};
use std::collections::HashSet;

/// Why a block's uncle list was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UncleViolation {
    #[error("too many uncles: {count} > {max}")]
    TooMany { count: usize, max: usize },

    #[error("uncles hash does not match uncle list")]
    HashMismatch,

    #[error("uncle {index} has zero difficulty")]
    ZeroDifficulty { index: usize },

    #[error("uncle {index} is an ancestor or already included")]
    Ineligible { index: usize },

    #[error("uncle {index} parent is not an eligible ancestor")]
    ParentNotEligible { index: usize },

    #[error("uncle {index} number does not follow its parent")]
    BadNumber { index: usize },
}

/// Validate `block.uncles` against the chain the block extends.
///
/// The parent of `block` must already be indexed.
pub fn validate_uncles(
    block: &Block,
    index: &BlockIndex,
    max_uncles: usize,
    max_uncle_depth: usize,
) -> Result<(), UncleViolation> {
    if block.uncles.len() > max_uncles {
        return Err(UncleViolation::TooMany {
            count: block.uncles.len(),
            max: max_uncles,
        });
    }
    if !block.uncles_hash_matches() {
        return Err(UncleViolation::HashMismatch);
    }
    if block.uncles.is_empty() {
        return Ok(());
    }

    // ancestors[0] is the parent, ancestors[k] the (k+1)-th generation back
    let ancestors = index.ancestors(block.parent_hash(), max_uncle_depth + 1);

    // Grandparent and older may parent an uncle
    let eligible_parents: HashSet<Hash> = ancestors.iter().skip(1).map(|a| a.hash()).collect();

    let mut ineligible: HashSet<Hash> = ancestors.iter().map(|a| a.hash()).collect();
    ineligible.insert(block.hash());
    for ancestor in &ancestors {
        ineligible.extend(ancestor.uncles.iter().map(|u| u.hash()));
    }

    for (i, uncle) in block.uncles.iter().enumerate() {
        if uncle.difficulty.is_zero() {
            return Err(UncleViolation::ZeroDifficulty { index: i });
        }
        if !ineligible.insert(uncle.hash()) {
            return Err(UncleViolation::Ineligible { index: i });
        }
        if !eligible_parents.contains(&uncle.parent_hash) {
            return Err(UncleViolation::ParentNotEligible { index: i });
        }
        let parent_number = ancestors
            .iter()
            .find(|a| a.hash() == uncle.parent_hash)
            .map(|a| a.number());
        if parent_number.map(|n| n + 1) != Some(uncle.number) {
            return Err(UncleViolation::BadNumber { index: i });
        }
    }

    Ok(())
}
