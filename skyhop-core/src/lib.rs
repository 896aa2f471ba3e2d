//! Skyhop SDK - Core library for encrypted score submission
//!
//! This library connects a finished Skyhop run to an on-chain leaderboard:
//! scores are encrypted through an FHE relayer, submitted via the player's
//! wallet provider, and read back as opaque handles in submission order.

pub mod config;
pub mod contract;
pub mod error;
pub mod leaderboard;
pub mod relayer;
pub mod rpc;
pub mod storage;
pub mod submit;
pub mod types;
pub mod wallet;

pub use config::{ChainConfig, SEPOLIA_CHAIN_ID};
pub use contract::ScoreboardContract;
pub use error::{Result, SkyhopError};
pub use leaderboard::{Leaderboard, LeaderboardReader, MAX_RECENT_SCORES};
pub use relayer::{RelayerClient, RelayerState};
pub use submit::{ScoreSubmitter, SubmitBlocker, MAX_SUBMITTABLE_SCORE};
pub use types::{ScoreEntry, SessionRecord};
pub use wallet::WalletSession;

pub use alloy_primitives::{Address, B256};
