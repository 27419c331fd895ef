//! Broadcaster for a node without peers: announcements are logged.

use async_trait::async_trait;
use fm_01_chain_store::{BlockBroadcaster, BroadcastError};
use shared_types::{short_hex, Block, U256};
use tracing::info;

#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingBroadcaster;

#[async_trait]
impl BlockBroadcaster for LoggingBroadcaster {
    async fn broadcast_new_block(
        &self,
        block: &Block,
        cumulative_difficulty: U256,
    ) -> Result<(), BroadcastError> {
        info!(
            block = %short_hex(&block.hash()),
            number = block.number(),
            transactions = block.transactions.len(),
            total_difficulty = %cumulative_difficulty,
            "Announcing new block"
        );
        Ok(())
    }
}
