//! Run parameters read from the environment.

use crate::{ManifestPaths, ParamsError};
use provisioner_types::{Address, PrivateKey};
use std::path::PathBuf;

/// Default maximum batch data size for the inbox constructors.
pub const DEFAULT_MAX_DATA_SIZE: u64 = 117_964;

/// Parameters of a bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapParams {
    /// `CHILD_CHAIN_NAME`, recorded in the chain-info manifest.
    pub chain_name: String,
    /// `DEPLOYER_PRIVKEY`.
    pub private_key: PrivateKey,
    /// `PARENT_CHAIN_RPC`.
    pub parent_chain_rpc: String,
    /// `PARENT_CHAIN_ID`.
    pub parent_chain_id: u64,
    /// `MAX_DATA_SIZE`.
    pub max_data_size: u64,
    /// `FEE_TOKEN_ADDRESS`, zero for the native asset.
    pub fee_token: Address,
    /// `DEPLOYMENT_FILE` and `CHAIN_INFO_FILE`.
    pub manifests: ManifestPaths,
    /// False when `DISABLE_VERIFICATION` is set.
    pub verify: bool,
    /// `DEV_DEPLOYMENT`.
    pub dev_deployment: bool,
}

impl BootstrapParams {
    /// Read parameters through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ParamsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ParamsError::Missing(key));

        let chain_name = require("CHILD_CHAIN_NAME")?;
        let private_key = PrivateKey::new(require("DEPLOYER_PRIVKEY")?);
        let parent_chain_rpc = require("PARENT_CHAIN_RPC")?;
        let parent_chain_id = parse_u64("PARENT_CHAIN_ID", &require("PARENT_CHAIN_ID")?)?;

        let max_data_size = match get("MAX_DATA_SIZE") {
            Some(raw) => parse_u64("MAX_DATA_SIZE", &raw)?,
            None => DEFAULT_MAX_DATA_SIZE,
        };
        let fee_token = match get("FEE_TOKEN_ADDRESS") {
            Some(raw) => Address::from_hex(raw.trim()).map_err(|e| ParamsError::Invalid {
                key: "FEE_TOKEN_ADDRESS",
                reason: e.to_string(),
            })?,
            None => Address::ZERO,
        };

        let defaults = ManifestPaths::default();
        let manifests = ManifestPaths {
            deployment: get("DEPLOYMENT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.deployment),
            chain_info: get("CHAIN_INFO_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.chain_info),
        };

        let disable_verification = match get("DISABLE_VERIFICATION") {
            Some(raw) => parse_flag("DISABLE_VERIFICATION", &raw)?,
            None => false,
        };
        let dev_deployment = match get("DEV_DEPLOYMENT") {
            Some(raw) => parse_flag("DEV_DEPLOYMENT", &raw)?,
            None => true,
        };

        Ok(Self {
            chain_name,
            private_key,
            parent_chain_rpc,
            parent_chain_id,
            max_data_size,
            fee_token,
            manifests,
            verify: !disable_verification,
            dev_deployment,
        })
    }

    /// Read parameters from the process environment.
    pub fn from_env() -> Result<Self, ParamsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64, ParamsError> {
    raw.trim().parse().map_err(|_| ParamsError::Invalid {
        key,
        reason: format!("expected an unsigned integer, got {raw:?}"),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ParamsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ParamsError::Invalid {
            key,
            reason: format!("expected true or false, got {raw:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("CHILD_CHAIN_NAME", "devnet"),
        ("DEPLOYER_PRIVKEY", "0xac09"),
        ("PARENT_CHAIN_RPC", "http://localhost:8545"),
        ("PARENT_CHAIN_ID", "1337"),
    ];

    #[test]
    fn test_defaults() {
        let params = BootstrapParams::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(params.chain_name, "devnet");
        assert_eq!(params.parent_chain_id, 1337);
        assert_eq!(params.max_data_size, DEFAULT_MAX_DATA_SIZE);
        assert_eq!(params.fee_token, Address::ZERO);
        assert_eq!(params.manifests, ManifestPaths::default());
        assert!(params.verify);
        assert!(params.dev_deployment);
    }

    #[test]
    fn test_each_required_key_is_enforced() {
        for (missing, _) in REQUIRED {
            let pairs: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = BootstrapParams::from_lookup(lookup(&pairs)).unwrap_err();
            assert_eq!(err, ParamsError::Missing(missing));
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("CHILD_CHAIN_NAME", "");
        let err = BootstrapParams::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err, ParamsError::Missing("CHILD_CHAIN_NAME"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("MAX_DATA_SIZE", "104857"),
            ("FEE_TOKEN_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            ("DEPLOYMENT_FILE", "out/deployment.json"),
            ("DISABLE_VERIFICATION", "true"),
            ("DEV_DEPLOYMENT", "false"),
        ]);
        let params = BootstrapParams::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(params.max_data_size, 104_857);
        assert_eq!(
            params.fee_token.to_hex(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
        assert_eq!(params.manifests.deployment, PathBuf::from("out/deployment.json"));
        assert!(!params.verify);
        assert!(!params.dev_deployment);
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs[3] = ("PARENT_CHAIN_ID", "mainnet");
        assert!(matches!(
            BootstrapParams::from_lookup(lookup(&pairs)),
            Err(ParamsError::Invalid { key: "PARENT_CHAIN_ID", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FEE_TOKEN_ADDRESS", "0x1234"));
        assert!(matches!(
            BootstrapParams::from_lookup(lookup(&pairs)),
            Err(ParamsError::Invalid { key: "FEE_TOKEN_ADDRESS", .. })
        ));
    }
}
