use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One leaderboard row as served by the contract. The encrypted score is an
/// opaque handle; this crate never decrypts or interprets score bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player: Address,
    pub encrypted_score: B256,
    pub timestamp: DateTime<Utc>,
    /// Position in submission order, derived client-side.
    pub rank: u32,
}

impl ScoreEntry {
    /// `0x1234...abcd` shortening for display.
    pub fn short_player(&self) -> String {
        let full = format!("{}", self.player);
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

/// A locally recorded play session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub score: u32,
    pub played_at: DateTime<Utc>,
    /// Transaction hash once the score was submitted on-chain.
    pub submitted_tx: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_short_player() {
        let entry = ScoreEntry {
            player: Address::from_str("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").unwrap(),
            encrypted_score: B256::ZERO,
            timestamp: Utc::now(),
            rank: 1,
        };
        let short = entry.short_player();
        assert!(short.starts_with("0x"));
        assert!(short.contains("..."));
        assert_eq!(short.len(), 6 + 3 + 4);
    }
}
