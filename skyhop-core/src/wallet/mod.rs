//! Connected-wallet session. Writes are delegated to the wallet's own
//! provider endpoint; this crate never holds key material.

use crate::error::{Result, SkyhopError};
use crate::rpc::RpcClient;
use alloy_primitives::{Address, B256};
use std::time::Duration;

pub struct WalletSession {
    rpc: RpcClient,
    address: Address,
}

impl WalletSession {
    /// Connect to a wallet provider and bind to its first exposed account.
    pub async fn connect(wallet_rpc_url: &str) -> Result<Self> {
        let rpc = RpcClient::new(wallet_rpc_url);
        let accounts = rpc.eth_accounts().await?;
        let address = accounts
            .first()
            .copied()
            .ok_or_else(|| SkyhopError::wallet("wallet provider exposes no accounts"))?;

        tracing::info!("Connected wallet account {}", address);
        Ok(Self { rpc, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &RpcClient {
        &self.rpc
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.rpc.eth_chain_id().await
    }

    /// Request a switch to `expected` if the wallet reports another chain.
    /// Rejection is tolerated: the submission itself will fail with a clearer
    /// error if the wallet really is on the wrong network.
    pub async fn ensure_chain(&self, expected: u64) -> Result<()> {
        let current = match self.rpc.eth_chain_id().await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("chain id query failed, continuing: {}", e);
                return Ok(());
            }
        };

        if current == expected {
            return Ok(());
        }

        match self.rpc.wallet_switch_chain(expected).await {
            Ok(()) => {
                tracing::info!("Switched wallet network {} -> {}", current, expected);
                // Give the provider a moment to settle on the new chain.
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => tracing::warn!("network switch request rejected: {}", e),
        }

        Ok(())
    }

    pub async fn send_transaction(&self, to: Address, data: &[u8]) -> Result<B256> {
        self.rpc.eth_send_transaction(self.address, to, data).await
    }
}
