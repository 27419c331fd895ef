//! Broadcaster that records announcements instead of sending them.

use crate::ports::outbound::{BlockBroadcaster, BroadcastError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Block, Hash, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One recorded announcement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Announcement {
    pub hash: Hash,
    pub number: u64,
    pub cumulative_difficulty: U256,
}

/// Records every broadcast; can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingBroadcaster {
    sent: Arc<Mutex<Vec<Announcement>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl BlockBroadcaster for RecordingBroadcaster {
    async fn broadcast_new_block(
        &self,
        block: &Block,
        cumulative_difficulty: U256,
    ) -> Result<(), BroadcastError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BroadcastError::NoPeers);
        }
        self.sent.lock().push(Announcement {
            hash: block.hash(),
            number: block.number(),
            cumulative_difficulty,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::BlockHeader;

    #[tokio::test]
    async fn test_records_and_fails_on_demand() {
        let broadcaster = RecordingBroadcaster::new();
        let block = Block::new(BlockHeader::default(), vec![], vec![]);

        broadcaster
            .broadcast_new_block(&block, U256::from(7))
            .await
            .unwrap();
        broadcaster.set_failing(true);
        assert!(broadcaster
            .broadcast_new_block(&block, U256::from(8))
            .await
            .is_err());

        let sent = broadcaster.announcements();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].cumulative_difficulty, U256::from(7));
    }
}
