//! Client for the FHE relayer service that turns a plaintext score into an
//! opaque (handle, proof) pair the contract will accept.
//!
//! Initialization is modeled as an explicit state machine instead of a
//! nullable instance: `init` is idempotent, re-attemptable after failure, and
//! refuses to stack concurrent attempts.

use crate::error::{Result, SkyhopError};
use alloy_primitives::{Address, Bytes, B256};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayerState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Encrypted payload returned by the relayer. The handle references the
/// ciphertext; the proof attests it was correctly constructed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedInput {
    pub handles: Vec<B256>,
    pub input_proof: Bytes,
}

impl EncryptedInput {
    /// Both halves must be present before anything goes on-chain.
    pub fn validate(&self) -> Result<()> {
        if self.handles.is_empty() {
            return Err(SkyhopError::relayer("encryption returned no handles"));
        }
        if self.input_proof.is_empty() {
            return Err(SkyhopError::relayer("encryption returned no proof"));
        }
        Ok(())
    }

    pub fn handle(&self) -> Result<B256> {
        self.handles
            .first()
            .copied()
            .ok_or_else(|| SkyhopError::relayer("encryption returned no handles"))
    }
}

#[derive(Debug, Clone, Serialize)]
struct InputValue {
    bits: u32,
    value: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputProofRequest {
    contract_address: String,
    user_address: String,
    values: Vec<InputValue>,
}

pub struct RelayerClient {
    http: reqwest::Client,
    base_url: String,
    encryption_timeout: Duration,
    state: RwLock<RelayerState>,
}

impl RelayerClient {
    pub fn new(base_url: impl Into<String>, encryption_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            encryption_timeout,
            state: RwLock::new(RelayerState::Uninitialized),
        }
    }

    pub fn state(&self) -> RelayerState {
        *self.state.read()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == RelayerState::Ready
    }

    /// Idempotent initialization: returns immediately when already ready,
    /// refuses while another attempt is in progress, retries after a failure.
    pub async fn init(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            match *state {
                RelayerState::Ready => return Ok(()),
                RelayerState::Initializing => {
                    return Err(SkyhopError::invalid_state(
                        "relayer initialization already in progress",
                    ))
                }
                RelayerState::Uninitialized | RelayerState::Failed => {
                    *state = RelayerState::Initializing;
                }
            }
        }

        match self.fetch_key_material().await {
            Ok(()) => {
                *self.state.write() = RelayerState::Ready;
                tracing::info!("Relayer ready at {}", self.base_url);
                Ok(())
            }
            Err(e) => {
                *self.state.write() = RelayerState::Failed;
                tracing::warn!("Relayer initialization failed: {}", e);
                Err(e)
            }
        }
    }

    async fn fetch_key_material(&self) -> Result<()> {
        let url = format!("{}/v1/keyurl", self.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SkyhopError::relayer(format!(
                "relayer key endpoint returned {}",
                status
            )));
        }

        // The key material itself is opaque to us; a well-formed reply is all
        // the readiness check needs.
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|_| SkyhopError::relayer("relayer connection issue, please try again"))?;
        Ok(())
    }

    /// A builder scoped to one (contract, user) pair, per the relayer's
    /// binding rules.
    pub fn create_encrypted_input(&self, contract: Address, user: Address) -> EncryptedInputBuilder {
        EncryptedInputBuilder {
            client: self,
            contract,
            user,
            values: Vec::new(),
        }
    }

    async fn post_input_proof(&self, request: &InputProofRequest) -> Result<EncryptedInput> {
        let url = format!("{}/v1/input-proof", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SkyhopError::relayer(format!(
                "relayer returned {}: {}",
                status,
                text.trim()
            )));
        }

        serde_json::from_str::<EncryptedInput>(&text)
            .map_err(|_| SkyhopError::relayer("relayer connection issue, please try again"))
    }
}

pub struct EncryptedInputBuilder<'a> {
    client: &'a RelayerClient,
    contract: Address,
    user: Address,
    values: Vec<InputValue>,
}

impl EncryptedInputBuilder<'_> {
    /// Append a 16-bit value (the contract stores scores as euint16).
    pub fn add16(&mut self, value: u16) -> &mut Self {
        self.values.push(InputValue {
            bits: 16,
            value: u64::from(value),
        });
        self
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Encrypt and prove all added values, bounded by the configured timeout.
    pub async fn encrypt(&self) -> Result<EncryptedInput> {
        if !self.client.is_ready() {
            return Err(SkyhopError::invalid_state("relayer is not initialized"));
        }
        if self.values.is_empty() {
            return Err(SkyhopError::invalid_state(
                "encrypted input has no values to encrypt",
            ));
        }

        let request = InputProofRequest {
            contract_address: self.contract.to_string(),
            user_address: self.user.to_string(),
            values: self.values.clone(),
        };

        let timeout = self.client.encryption_timeout;
        match tokio::time::timeout(timeout, self.client.post_input_proof(&request)).await {
            Ok(result) => result,
            Err(_) => Err(SkyhopError::timeout(format!(
                "encryption timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> RelayerClient {
        // Unroutable endpoint: initialization must fail fast.
        RelayerClient::new("http://127.0.0.1:1", Duration::from_secs(1))
    }

    #[test]
    fn test_starts_uninitialized() {
        let client = test_client();
        assert_eq!(client.state(), RelayerState::Uninitialized);
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_failed_init_is_retryable() {
        let client = test_client();
        assert!(client.init().await.is_err());
        assert_eq!(client.state(), RelayerState::Failed);

        // A second attempt runs again rather than being rejected.
        assert!(client.init().await.is_err());
        assert_eq!(client.state(), RelayerState::Failed);
    }

    #[tokio::test]
    async fn test_encrypt_requires_ready_relayer() {
        let client = test_client();
        let mut builder = client.create_encrypted_input(Address::ZERO, Address::ZERO);
        builder.add16(42);
        let err = builder.encrypt().await.unwrap_err();
        assert!(matches!(err, SkyhopError::InvalidState(_)));
    }

    #[test]
    fn test_builder_accumulates_values() {
        let client = test_client();
        let mut builder = client.create_encrypted_input(Address::ZERO, Address::ZERO);
        builder.add16(1).add16(2);
        assert_eq!(builder.value_count(), 2);
    }

    #[test]
    fn test_validate_rejects_missing_handle() {
        let input = EncryptedInput {
            handles: vec![],
            input_proof: Bytes::from(vec![1u8]),
        };
        assert!(input.validate().is_err());
        assert!(input.handle().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_proof() {
        let input = EncryptedInput {
            handles: vec![B256::ZERO],
            input_proof: Bytes::new(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_complete_payload() {
        let input = EncryptedInput {
            handles: vec![B256::repeat_byte(7)],
            input_proof: Bytes::from(vec![1, 2, 3]),
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.handle().unwrap(), B256::repeat_byte(7));
    }

    #[test]
    fn test_encrypted_input_deserializes_relayer_reply() {
        let json = r#"{
            "handles": ["0x0101010101010101010101010101010101010101010101010101010101010101"],
            "inputProof": "0xdeadbeef"
        }"#;
        let input: EncryptedInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.handles.len(), 1);
        assert_eq!(input.input_proof.len(), 4);
        assert!(input.validate().is_ok());
    }
}
