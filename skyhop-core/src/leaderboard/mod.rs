//! Leaderboard reads: a cached snapshot of the most recent submissions plus
//! an optional background refresh task.

use crate::contract::{RecentScore, ScoreboardContract};
use crate::error::Result;
use crate::types::ScoreEntry;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// The contract serves at most this many rows per query.
pub const MAX_RECENT_SCORES: u64 = 50;

/// A fetched leaderboard snapshot. `entries` is newest submission first.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    pub entries: Vec<ScoreEntry>,
    /// Total submissions ever made, which can exceed `entries.len()`.
    pub total: u64,
    pub fetched_at: DateTime<Utc>,
}

pub struct LeaderboardReader {
    contract: Arc<ScoreboardContract>,
    cache: RwLock<Option<Leaderboard>>,
}

impl LeaderboardReader {
    pub fn new(contract: Arc<ScoreboardContract>) -> Self {
        Self {
            contract,
            cache: RwLock::new(None),
        }
    }

    /// Last fetched snapshot, if any refresh has succeeded yet.
    pub fn snapshot(&self) -> Option<Leaderboard> {
        self.cache.read().clone()
    }

    /// Fetch the current board and replace the cached snapshot wholesale.
    /// A failed fetch leaves the previous snapshot in place.
    pub async fn refresh(&self) -> Result<Leaderboard> {
        let total = self.contract.get_score_count().await?;

        let entries = if total == 0 {
            Vec::new()
        } else {
            let batch = self
                .contract
                .get_recent_scores(total.min(MAX_RECENT_SCORES))
                .await?;
            assign_ranks(total, batch)
        };

        let board = Leaderboard {
            entries,
            total,
            fetched_at: Utc::now(),
        };

        tracing::debug!(
            "Leaderboard refreshed: {} shown of {} total",
            board.entries.len(),
            board.total
        );
        *self.cache.write() = Some(board.clone());
        Ok(board)
    }

    /// Refresh on a fixed interval until the returned handle is dropped.
    pub fn spawn_polling(self: &Arc<Self>, interval: Duration) -> PollHandle {
        let reader = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = reader.refresh().await {
                    tracing::warn!("leaderboard refresh failed: {}", e);
                }
            }
        });
        PollHandle { task }
    }
}

/// Background refresh task; aborted when dropped.
pub struct PollHandle {
    task: tokio::task::JoinHandle<()>,
}

impl PollHandle {
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The contract returns rows oldest first. Rank counts down from the total
/// submission count, then the batch is flipped so callers see newest first.
/// The reply length is untrusted, so the countdown saturates rather than
/// underflowing on a batch longer than `total`.
fn assign_ranks(total: u64, batch: Vec<RecentScore>) -> Vec<ScoreEntry> {
    let mut entries: Vec<ScoreEntry> = batch
        .into_iter()
        .enumerate()
        .map(|(i, row)| ScoreEntry {
            player: row.player,
            encrypted_score: row.encrypted_score,
            timestamp: DateTime::from_timestamp(row.timestamp as i64, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
            rank: total.saturating_sub(i as u64) as u32,
        })
        .collect();
    entries.reverse();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};

    fn row(byte: u8, timestamp: u64) -> RecentScore {
        RecentScore {
            player: Address::repeat_byte(byte),
            encrypted_score: B256::repeat_byte(byte),
            timestamp,
        }
    }

    #[test]
    fn test_assign_ranks_full_board() {
        let batch = vec![row(1, 100), row(2, 200), row(3, 300)];
        let entries = assign_ranks(3, batch);

        // Newest submission first.
        assert_eq!(entries[0].player, Address::repeat_byte(3));
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[2].rank, 3);
        assert_eq!(entries[2].player, Address::repeat_byte(1));
    }

    #[test]
    fn test_assign_ranks_truncated_board() {
        // 100 total submissions but only the 2 most recent returned.
        let batch = vec![row(1, 100), row(2, 200)];
        let entries = assign_ranks(100, batch);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rank, 99);
        assert_eq!(entries[1].rank, 100);
    }

    #[test]
    fn test_assign_ranks_empty() {
        assert!(assign_ranks(0, Vec::new()).is_empty());
    }

    #[test]
    fn test_assign_ranks_timestamps() {
        let entries = assign_ranks(1, vec![row(1, 1_700_000_000)]);
        assert_eq!(entries[0].timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_assign_ranks_tolerates_overlong_batch() {
        // A reply longer than the reported total must not underflow the
        // countdown; excess rows bottom out at rank 0.
        let entries = assign_ranks(1, vec![row(1, 100), row(2, 200)]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rank, 0);
        assert_eq!(entries[1].rank, 1);
    }

    #[tokio::test]
    async fn test_poll_handle_aborts_task_on_drop() {
        use crate::rpc::RpcClient;
        use std::time::Duration;

        let contract = Arc::new(ScoreboardContract::new(
            Address::ZERO,
            Arc::new(RpcClient::new("http://127.0.0.1:1")),
        ));
        let reader = Arc::new(LeaderboardReader::new(contract));

        let handle = reader.spawn_polling(Duration::from_millis(10));
        drop(handle);

        // The aborted task releases its clone of the reader.
        for _ in 0..100 {
            if Arc::strong_count(&reader) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(Arc::strong_count(&reader), 1);
        assert!(reader.snapshot().is_none());
    }
}
