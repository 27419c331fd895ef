//! # Block Tree and Fork Choice Flows
//!
//! Reorganizations, pending-transaction carry-over and storage failure
//! recovery seen from outside the chain store.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use fm_01_chain_store::{ChainApi, ChainError};
use proptest::prelude::*;
use shared_types::{Block, Hash, U256};

use super::fixtures::*;

// =============================================================================
// REORGANIZATION
// =============================================================================

#[test]
fn test_heavier_fork_reorganizes_and_notifies() {
    let g = genesis(GENESIS_DIFFICULTY);
    let (chain, _store) = chain_with_store(g.clone());
    let log = Arc::new(HeadLog::default());
    chain.register_head_observer(log.clone());

    let a1 = child(&g, 100, 0xa1);
    let b1 = child(&g, 50, 0xb1);
    let b2 = child(&b1, 100, 0xb2);

    assert!(chain.add_block(a1.clone(), false).unwrap());
    assert!(chain.add_block(b1.clone(), false).unwrap());
    assert_eq!(chain.head().hash, a1.hash());

    assert!(chain.add_block(b2.clone(), false).unwrap());

    let head = chain.head();
    assert_eq!(head.hash, b2.hash());
    assert_eq!(head.cumulative_difficulty, U256::from(1174));
    assert_eq!(chain.cumulative_difficulty(&a1.hash()), Some(U256::from(1124)));
    assert_eq!(chain.cumulative_difficulty(&b1.hash()), Some(U256::from(1074)));

    // b1 never became head, so observers saw exactly two changes
    let changes = log.changes();
    assert_eq!(log.heads(), vec![a1.hash(), b2.hash()]);
    assert!(!changes[0].is_reorg);
    assert!(changes[1].is_reorg);
    assert_eq!(changes[1].previous_head, a1.hash());

    let metrics = chain.metrics().snapshot();
    assert_eq!(metrics.reorgs, 1);
    assert_eq!(metrics.non_canonical, 1);
}

#[test]
fn test_longer_lighter_branch_never_wins() {
    let g = genesis(GENESIS_DIFFICULTY);
    let (chain, _store) = chain_with_store(g.clone());

    let heavy = child(&g, 5_000, 0x01);
    chain.add_block(heavy.clone(), false).unwrap();

    let mut tip = g;
    for tag in 0..10u8 {
        tip = child(&tip, 10, 0x10 + tag);
        assert!(chain.add_block(tip.clone(), false).unwrap());
    }

    assert_eq!(chain.head().hash, heavy.hash());
    assert_eq!(chain.block_count(), 12);
}

#[test]
fn test_out_of_order_delivery_waits_for_parent() {
    let g = genesis(GENESIS_DIFFICULTY);
    let (chain, _store) = chain_with_store(g.clone());

    let b1 = child(&g, 10, 0x01);
    let b2 = child(&b1, 10, 0x02);

    assert!(!chain.add_block(b2.clone(), false).unwrap());
    assert!(chain.get_block(&b2.hash()).is_none());

    assert!(chain.add_block(b1, false).unwrap());
    assert!(chain.add_block(b2.clone(), false).unwrap());
    assert_eq!(chain.head().hash, b2.hash());
}

#[test]
fn test_replayed_blocks_are_idempotent() {
    let g = genesis(GENESIS_DIFFICULTY);
    let (chain, store) = chain_with_store(g.clone());
    let b1 = child(&g, 10, 0x01);

    assert!(chain.add_block(b1.clone(), false).unwrap());
    let commits = store.commit_count();

    for _ in 0..3 {
        assert!(!chain.add_block(b1.clone(), false).unwrap());
    }
    assert!(!chain.add_block(g, false).unwrap());

    assert_eq!(store.commit_count(), commits);
    assert_eq!(chain.block_count(), 2);
    assert_eq!(chain.head().hash, b1.hash());
}

// =============================================================================
// PENDING TRANSACTIONS
// =============================================================================

#[test]
fn test_pending_transactions_follow_the_canonical_chain() {
    let g = genesis(GENESIS_DIFFICULTY);
    let (chain, _store) = chain_with_store(g.clone());

    for nonce in 0..3 {
        assert!(chain.add_transaction(tx(nonce)));
    }

    // A1 includes tx 0; the rest is carried onto it
    let a1 = child_with(&g, 100, 0xa1, vec![tx(0)]);
    chain.add_block(a1, true).unwrap();
    assert_eq!(chain.pending_transactions(), vec![tx(1), tx(2)]);

    // Heavier fork B includes tx 1 only; tx 0 must not resurface
    let b1 = child_with(&g, 60, 0xb1, vec![tx(1)]);
    let b2 = child(&b1, 60, 0xb2);
    chain.add_block(b1, true).unwrap();
    chain.add_block(b2.clone(), true).unwrap();

    assert_eq!(chain.head().hash, b2.hash());
    assert_eq!(chain.pending_transactions(), vec![tx(2)]);
}

// =============================================================================
// STORAGE FAILURE
// =============================================================================

#[test]
fn test_commit_failure_leaves_chain_untouched_and_retry_succeeds() {
    let g = genesis(GENESIS_DIFFICULTY);
    let (chain, store) = chain_with_store(g.clone());
    let log = Arc::new(HeadLog::default());
    chain.register_head_observer(log.clone());
    chain.add_transaction(tx(7));

    let b1 = child(&g, 10, 0x01);
    store.failure_switch().store(true, Ordering::SeqCst);

    let err = chain.add_block(b1.clone(), true).unwrap_err();
    assert!(matches!(err, ChainError::CommitFailed(_)));
    assert!(err.is_recoverable());
    assert_eq!(chain.head().hash, g.hash());
    assert!(chain.get_block(&b1.hash()).is_none());
    assert_eq!(chain.pending_transactions(), vec![tx(7)]);
    assert!(log.changes().is_empty());
    assert_eq!(chain.metrics().snapshot().commit_failures, 1);

    assert!(chain.add_block(b1.clone(), true).unwrap());
    assert_eq!(chain.head().hash, b1.hash());
    assert_eq!(log.heads(), vec![b1.hash()]);
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Head is always the first block seen with the greatest total work.
    #[test]
    fn prop_head_is_first_heaviest(
        edges in prop::collection::vec((any::<prop::sample::Index>(), 1u64..200), 1..40)
    ) {
        let g = genesis(GENESIS_DIFFICULTY);
        let (chain, _store) = chain_with_store(g.clone());

        let mut blocks: Vec<Block> = vec![g.clone()];
        let mut td: HashMap<Hash, U256> = HashMap::new();
        td.insert(g.hash(), U256::from(GENESIS_DIFFICULTY));
        let mut expected = (g.hash(), U256::from(GENESIS_DIFFICULTY));

        for (i, (parent_ix, difficulty)) in edges.into_iter().enumerate() {
            let parent = blocks[parent_ix.index(blocks.len())].clone();
            let block = Block::new(
                shared_types::BlockHeader {
                    parent_hash: parent.hash(),
                    number: parent.number() + 1,
                    difficulty: U256::from(difficulty),
                    timestamp: parent.header.timestamp + 1,
                    extra_data: (i as u32).to_be_bytes().to_vec(),
                    ..Default::default()
                },
                vec![],
                vec![],
            );
            prop_assert!(chain.add_block(block.clone(), false).unwrap());

            let total = td[&parent.hash()] + U256::from(difficulty);
            td.insert(block.hash(), total);
            if total > expected.1 {
                expected = (block.hash(), total);
            }
            blocks.push(block);

            let head = chain.head();
            prop_assert_eq!(head.hash, expected.0);
            prop_assert_eq!(head.cumulative_difficulty, expected.1);
        }
    }
}
