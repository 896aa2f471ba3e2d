use serde::{Deserialize, Serialize};
use skyhop_core::{Address, ChainConfig, Result, SkyhopError};
use std::path::Path;
use std::str::FromStr;

/// Persisted CLI settings, stored as `config.json` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub network: String,
    /// Leaderboard contract address, also settable per run via `--contract`.
    pub contract_address: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: "sepolia".to_string(),
            contract_address: None,
        }
    }
}

impl CliConfig {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("config.json");
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Resolve the on-chain configuration, with `--contract` taking
    /// precedence over the stored address.
    pub fn chain_config(&self, contract_override: Option<&str>) -> Result<ChainConfig> {
        let address = match contract_override.or(self.contract_address.as_deref()) {
            Some(s) => {
                Address::from_str(s).map_err(|_| SkyhopError::InvalidAddress(s.to_string()))?
            }
            None => Address::ZERO,
        };
        Ok(ChainConfig::sepolia(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_takes_precedence() {
        let config = CliConfig {
            network: "sepolia".to_string(),
            contract_address: Some("0x1111111111111111111111111111111111111111".to_string()),
        };
        let chain = config
            .chain_config(Some("0x2222222222222222222222222222222222222222"))
            .unwrap();
        assert_eq!(chain.contract_address, Address::repeat_byte(0x22));
    }

    #[test]
    fn test_missing_contract_defaults_to_zero() {
        let chain = CliConfig::default().chain_config(None).unwrap();
        assert_eq!(chain.contract_address, Address::ZERO);
        assert!(chain.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_address() {
        assert!(CliConfig::default().chain_config(Some("0xnope")).is_err());
    }
}
