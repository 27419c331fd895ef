//! Difficulty adjustment
//!
//! Frontier rule: the child gets `parent ± parent / block_diff_factor`
//! depending on whether it came faster than the cutoff. The floor is
//! `min(parent, min_difficulty)`, so a chain that starts below the minimum
//! never drops further.

use crate::config::DifficultyConfig;
use shared_types::U256;

/// Difficulty of a child of `parent_difficulty` sealed at `timestamp`.
pub fn calc_difficulty(
    parent_difficulty: U256,
    parent_timestamp: u64,
    timestamp: u64,
    config: &DifficultyConfig,
) -> U256 {
    let factor = U256::from(config.block_diff_factor.max(1));
    let offset = parent_difficulty / factor;
    let fast = timestamp < parent_timestamp.saturating_add(config.adjustment_cutoff_secs);

    let adjusted = if fast {
        parent_difficulty.saturating_add(offset)
    } else {
        parent_difficulty.saturating_sub(offset)
    };

    let floor = parent_difficulty.min(U256::from(config.min_difficulty));
    adjusted.max(floor).max(U256::one())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DifficultyConfig {
        DifficultyConfig::default()
    }

    #[test]
    fn test_fast_block_raises_difficulty() {
        let d = calc_difficulty(U256::from(1024), 100, 105, &config());
        assert_eq!(d, U256::from(1088));
    }

    #[test]
    fn test_slow_block_lowers_difficulty_above_minimum() {
        let parent = U256::from(1_600_000);
        let d = calc_difficulty(parent, 100, 200, &config());
        assert_eq!(d, U256::from(1_500_000));
    }

    #[test]
    fn test_below_minimum_never_drops() {
        let d = calc_difficulty(U256::from(1024), 100, 200, &config());
        assert_eq!(d, U256::from(1024));
    }

    #[test]
    fn test_cutoff_boundary_counts_as_slow() {
        let parent = U256::from(1_600_000);
        let d = calc_difficulty(parent, 100, 113, &config());
        assert_eq!(d, U256::from(1_500_000));
    }
}
