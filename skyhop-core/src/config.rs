use crate::error::{Result, SkyhopError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sepolia chain id (0xaa36a7), the only network the leaderboard contract is
/// deployed to.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub network: String,
    pub chain_id: u64,
    /// Read-only JSON-RPC endpoint for leaderboard queries.
    pub rpc_url: String,
    /// The connected wallet's own provider endpoint; all writes go through it.
    pub wallet_rpc_url: String,
    /// FHE relayer base URL.
    pub relayer_url: String,
    pub contract_address: Address,
    /// Leaderboard polling interval.
    pub poll_interval: Duration,
    /// Bound on the relayer's encrypt-and-prove round trip.
    pub encryption_timeout: Duration,
    /// Bound on waiting for a submission to be mined.
    pub confirmation_timeout: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::sepolia(Address::ZERO)
    }
}

impl ChainConfig {
    pub fn sepolia(contract_address: Address) -> Self {
        Self {
            network: "sepolia".to_string(),
            chain_id: SEPOLIA_CHAIN_ID,
            rpc_url: "https://sepolia.drpc.org".to_string(),
            wallet_rpc_url: "http://localhost:8545".to_string(),
            relayer_url: "https://relayer.testnet.zama.cloud".to_string(),
            contract_address,
            poll_interval: Duration::from_secs(30),
            encryption_timeout: Duration::from_secs(30),
            confirmation_timeout: Duration::from_secs(120),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(SkyhopError::config("RPC URL cannot be empty"));
        }

        if self.wallet_rpc_url.is_empty() {
            return Err(SkyhopError::config("Wallet RPC URL cannot be empty"));
        }

        if self.relayer_url.is_empty() {
            return Err(SkyhopError::config("Relayer URL cannot be empty"));
        }

        if self.contract_address == Address::ZERO {
            return Err(SkyhopError::config(
                "Leaderboard contract address is not set",
            ));
        }

        if self.encryption_timeout.is_zero() {
            return Err(SkyhopError::config(
                "Encryption timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
