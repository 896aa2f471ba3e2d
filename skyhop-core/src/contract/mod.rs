//! Typed bindings for the encrypted-leaderboard contract.

use crate::error::{Result, SkyhopError};
use crate::rpc::{RpcClient, TransactionReceipt};
use crate::wallet::WalletSession;
use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::{sol, SolCall};
use std::sync::Arc;
use std::time::Duration;

sol! {
    /// Score submissions are encrypted handles plus an attestation produced by
    /// the FHE relayer; reads return the same opaque bytes.
    interface IScoreboard {
        function submitScore(bytes32 encryptedScore, bytes calldata attestation) external;
        function getPlayerBestScore(address player) external view returns (bytes32);
        function hasPlayerSubmitted(address player) external view returns (bool);
        function getScoreCount() external view returns (uint256);
        function getRecentScores(uint256 count) external view returns (
            address[] memory players,
            bytes32[] memory encryptedScores,
            uint256[] memory timestamps
        );
    }
}

/// One row of a `getRecentScores` batch, before ranking.
#[derive(Debug, Clone)]
pub struct RecentScore {
    pub player: Address,
    pub encrypted_score: B256,
    pub timestamp: u64,
}

/// How often a pending submission's receipt is polled.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub struct ScoreboardContract {
    address: Address,
    reader: Arc<RpcClient>,
}

impl ScoreboardContract {
    /// `reader` is the public read-only RPC endpoint; writes go through a
    /// [`WalletSession`] passed per call.
    pub fn new(address: Address, reader: Arc<RpcClient>) -> Self {
        Self { address, reader }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn get_score_count(&self) -> Result<u64> {
        let data = IScoreboard::getScoreCountCall {}.abi_encode();
        let raw = self.reader.eth_call(self.address, &data).await?;
        decode_score_count(&raw)
    }

    pub async fn get_recent_scores(&self, count: u64) -> Result<Vec<RecentScore>> {
        let data = IScoreboard::getRecentScoresCall {
            count: alloy_primitives::U256::from(count),
        }
        .abi_encode();
        let raw = self.reader.eth_call(self.address, &data).await?;
        decode_recent_scores(&raw)
    }

    pub async fn has_player_submitted(&self, player: Address) -> Result<bool> {
        let data = IScoreboard::hasPlayerSubmittedCall { player }.abi_encode();
        let raw = self.reader.eth_call(self.address, &data).await?;
        let ret = IScoreboard::hasPlayerSubmittedCall::abi_decode_returns(&raw, true)
            .map_err(|e| SkyhopError::contract(format!("bad hasPlayerSubmitted return: {}", e)))?;
        Ok(ret._0)
    }

    pub async fn get_player_best_score(&self, player: Address) -> Result<B256> {
        let data = IScoreboard::getPlayerBestScoreCall { player }.abi_encode();
        let raw = self.reader.eth_call(self.address, &data).await?;
        let ret = IScoreboard::getPlayerBestScoreCall::abi_decode_returns(&raw, true)
            .map_err(|e| SkyhopError::contract(format!("bad getPlayerBestScore return: {}", e)))?;
        Ok(ret._0)
    }

    /// Send the encrypted score through the wallet provider. Returns the
    /// transaction hash; confirmation is a separate wait.
    pub async fn submit_score(
        &self,
        wallet: &WalletSession,
        encrypted_score: B256,
        attestation: Bytes,
    ) -> Result<B256> {
        let data = IScoreboard::submitScoreCall {
            encryptedScore: encrypted_score,
            attestation: attestation.to_vec(),
        }
        .abi_encode();

        let tx_hash = wallet.send_transaction(self.address, &data).await?;
        tracing::info!("Submitted encrypted score in tx {}", tx_hash);
        Ok(tx_hash)
    }

    /// Poll until the submission is mined. A reverted transaction is an error;
    /// exceeding `timeout` leaves the transaction pending but re-attemptable.
    pub async fn wait_for_confirmation(
        &self,
        wallet: &WalletSession,
        tx_hash: B256,
        timeout: Duration,
    ) -> Result<TransactionReceipt> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(receipt) = wallet.provider().eth_get_transaction_receipt(tx_hash).await? {
                if receipt.status == Some(false) {
                    return Err(SkyhopError::contract("score submission reverted on-chain"));
                }
                tracing::info!(
                    "Score submission {} confirmed in block {:?}",
                    tx_hash,
                    receipt.block_number
                );
                return Ok(receipt);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(SkyhopError::timeout(format!(
                    "transaction {} not confirmed after {}s",
                    tx_hash,
                    timeout.as_secs()
                )));
            }

            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

fn decode_score_count(raw: &[u8]) -> Result<u64> {
    let ret = IScoreboard::getScoreCountCall::abi_decode_returns(raw, true)
        .map_err(|e| SkyhopError::contract(format!("bad getScoreCount return: {}", e)))?;
    u64::try_from(ret._0)
        .map_err(|_| SkyhopError::contract("score count exceeds u64 range"))
}

fn decode_recent_scores(raw: &[u8]) -> Result<Vec<RecentScore>> {
    let ret = IScoreboard::getRecentScoresCall::abi_decode_returns(raw, true)
        .map_err(|e| SkyhopError::contract(format!("bad getRecentScores return: {}", e)))?;

    if ret.players.len() != ret.encryptedScores.len()
        || ret.players.len() != ret.timestamps.len()
    {
        return Err(SkyhopError::contract(
            "getRecentScores returned mismatched array lengths",
        ));
    }

    ret.players
        .into_iter()
        .zip(ret.encryptedScores)
        .zip(ret.timestamps)
        .map(|((player, encrypted_score), timestamp)| {
            Ok(RecentScore {
                player,
                encrypted_score,
                timestamp: u64::try_from(timestamp)
                    .map_err(|_| SkyhopError::contract("timestamp exceeds u64 range"))?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{keccak256, U256};
    use alloy_sol_types::SolValue;

    #[test]
    fn test_submit_score_selector() {
        let expected = &keccak256("submitScore(bytes32,bytes)".as_bytes())[..4];
        assert_eq!(IScoreboard::submitScoreCall::SELECTOR.as_slice(), expected);
    }

    #[test]
    fn test_read_selectors() {
        let cases: [(&str, [u8; 4]); 4] = [
            ("getScoreCount()", IScoreboard::getScoreCountCall::SELECTOR),
            (
                "getRecentScores(uint256)",
                IScoreboard::getRecentScoresCall::SELECTOR,
            ),
            (
                "hasPlayerSubmitted(address)",
                IScoreboard::hasPlayerSubmittedCall::SELECTOR,
            ),
            (
                "getPlayerBestScore(address)",
                IScoreboard::getPlayerBestScoreCall::SELECTOR,
            ),
        ];
        for (signature, selector) in cases {
            assert_eq!(&keccak256(signature.as_bytes())[..4], selector.as_slice());
        }
    }

    #[test]
    fn test_decode_score_count() {
        let raw = U256::from(42u64).abi_encode();
        assert_eq!(decode_score_count(&raw).unwrap(), 42);
    }

    #[test]
    fn test_decode_recent_scores() {
        let players = vec![Address::repeat_byte(1), Address::repeat_byte(2)];
        let scores = vec![B256::repeat_byte(9), B256::repeat_byte(8)];
        let timestamps = vec![U256::from(100u64), U256::from(200u64)];
        let raw = (players.clone(), scores.clone(), timestamps).abi_encode_params();

        let decoded = decode_recent_scores(&raw).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].player, players[0]);
        assert_eq!(decoded[0].encrypted_score, scores[0]);
        assert_eq!(decoded[0].timestamp, 100);
        assert_eq!(decoded[1].timestamp, 200);
    }

    #[test]
    fn test_decode_recent_scores_rejects_garbage() {
        assert!(decode_recent_scores(&[0u8; 7]).is_err());
    }
}
