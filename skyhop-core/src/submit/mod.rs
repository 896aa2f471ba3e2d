//! The full submission pipeline: encrypt a score through the relayer, send it
//! to the contract via the connected wallet, wait for the receipt.

use crate::config::ChainConfig;
use crate::contract::ScoreboardContract;
use crate::error::{Result, SkyhopError};
use crate::relayer::RelayerClient;
use crate::rpc::TransactionReceipt;
use crate::wallet::WalletSession;
use alloy_primitives::B256;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scores above the contract's euint16 range are clamped, not rejected.
pub const MAX_SUBMITTABLE_SCORE: u32 = u16::MAX as u32;

/// Why a submission cannot start right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocker {
    WalletDisconnected,
    RelayerNotReady,
    ZeroScore,
    SubmissionInFlight,
}

impl fmt::Display for SubmitBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SubmitBlocker::WalletDisconnected => "no wallet connected",
            SubmitBlocker::RelayerNotReady => "relayer is not initialized",
            SubmitBlocker::ZeroScore => "score of zero cannot be submitted",
            SubmitBlocker::SubmissionInFlight => "a submission is already in progress",
        };
        f.write_str(msg)
    }
}

/// A completed submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub tx_hash: B256,
    pub receipt: TransactionReceipt,
    /// The value that actually went on-chain, after clamping.
    pub submitted_score: u16,
}

pub struct ScoreSubmitter {
    config: ChainConfig,
    relayer: Arc<RelayerClient>,
    contract: Arc<ScoreboardContract>,
    wallet: RwLock<Option<Arc<WalletSession>>>,
    in_flight: AtomicBool,
}

impl ScoreSubmitter {
    pub fn new(
        config: ChainConfig,
        relayer: Arc<RelayerClient>,
        contract: Arc<ScoreboardContract>,
    ) -> Self {
        Self {
            config,
            relayer,
            contract,
            wallet: RwLock::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn set_wallet(&self, wallet: Arc<WalletSession>) {
        *self.wallet.write() = Some(wallet);
    }

    pub fn wallet(&self) -> Option<Arc<WalletSession>> {
        self.wallet.read().clone()
    }

    /// First reason the given score cannot be submitted, or `None` when the
    /// pipeline is clear to run.
    pub fn submit_blocker(&self, score: u32) -> Option<SubmitBlocker> {
        blocker_for(
            self.wallet.read().is_some(),
            self.relayer.is_ready(),
            score,
            self.in_flight.load(Ordering::SeqCst),
        )
    }

    pub fn can_submit(&self, score: u32) -> bool {
        self.submit_blocker(score).is_none()
    }

    /// Run the whole pipeline for one score. Only one submission may be in
    /// flight at a time; the guard clears on every exit path.
    pub async fn submit(&self, score: u32) -> Result<SubmissionOutcome> {
        if let Some(blocker) = self.submit_blocker(score) {
            return Err(SkyhopError::invalid_state(blocker.to_string()));
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SkyhopError::invalid_state(
                SubmitBlocker::SubmissionInFlight.to_string(),
            ));
        }
        let _guard = InFlightGuard(&self.in_flight);

        let wallet = self
            .wallet()
            .ok_or_else(|| SkyhopError::wallet("no wallet connected"))?;

        wallet.ensure_chain(self.config.chain_id).await?;

        let submitted_score = clamp_score(score);
        if u32::from(submitted_score) != score {
            tracing::warn!(
                "Score {} exceeds the submittable range, clamping to {}",
                score,
                submitted_score
            );
        }

        let mut builder = self
            .relayer
            .create_encrypted_input(self.contract.address(), wallet.address());
        builder.add16(submitted_score);
        let encrypted = builder.encrypt().await?;
        encrypted.validate()?;

        let tx_hash = self
            .contract
            .submit_score(&wallet, encrypted.handle()?, encrypted.input_proof.clone())
            .await?;

        let receipt = self
            .contract
            .wait_for_confirmation(&wallet, tx_hash, self.config.confirmation_timeout)
            .await?;

        tracing::info!("Score {} submitted in tx {}", submitted_score, tx_hash);
        Ok(SubmissionOutcome {
            tx_hash,
            receipt,
            submitted_score,
        })
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn clamp_score(score: u32) -> u16 {
    score.min(MAX_SUBMITTABLE_SCORE) as u16
}

fn blocker_for(
    wallet_connected: bool,
    relayer_ready: bool,
    score: u32,
    in_flight: bool,
) -> Option<SubmitBlocker> {
    if !wallet_connected {
        return Some(SubmitBlocker::WalletDisconnected);
    }
    if !relayer_ready {
        return Some(SubmitBlocker::RelayerNotReady);
    }
    if score == 0 {
        return Some(SubmitBlocker::ZeroScore);
    }
    if in_flight {
        return Some(SubmitBlocker::SubmissionInFlight);
    }
    None
}
