//! Durable output of a bootstrap run.
//!
//! Two manifests are written: the raw child-chain creation result, and a
//! one-element array holding the chain info tagged with the chain name.
//! Both files are staged next to their targets and only moved into place
//! once both have been written, so a failure never leaves a half-written
//! file behind.

use crate::ManifestError;
use provisioner_core::ChildChain;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Key added to the chain info.
pub const CHAIN_NAME_KEY: &str = "chain-name";

/// Where the two manifests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPaths {
    /// Raw creation result.
    pub deployment: PathBuf,
    /// Chain info.
    pub chain_info: PathBuf,
}

impl Default for ManifestPaths {
    fn default() -> Self {
        Self {
            deployment: PathBuf::from("deployment.json"),
            chain_info: PathBuf::from("l2_chain_info.json"),
        }
    }
}

/// Chain info augmented with the chain name, wrapped in a one-element array.
pub fn render_chain_info(chain_info: &Map<String, Value>, chain_name: &str) -> Value {
    let mut info = chain_info.clone();
    info.insert(CHAIN_NAME_KEY.to_string(), Value::from(chain_name));
    Value::Array(vec![Value::Object(info)])
}

/// Write both manifests, overwriting any previous run's output.
pub fn write_manifests(
    paths: &ManifestPaths,
    chain: &ChildChain,
    chain_name: &str,
) -> Result<(), ManifestError> {
    let deployment = serde_json::to_string_pretty(&chain.rollup_creation_result)?;
    let chain_info = serde_json::to_string_pretty(&render_chain_info(&chain.chain_info, chain_name))?;

    let staged_deployment = stage(&paths.deployment, &deployment)?;
    let staged_chain_info = stage(&paths.chain_info, &chain_info)?;

    persist(staged_deployment, &paths.deployment)?;
    persist(staged_chain_info, &paths.chain_info)?;

    info!(
        deployment = %paths.deployment.display(),
        chain_info = %paths.chain_info.display(),
        "Wrote manifests"
    );
    Ok(())
}

fn stage(path: &Path, contents: &str) -> Result<NamedTempFile, ManifestError> {
    let write_error = |source: std::io::Error| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.write_all(b"\n").map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    Ok(file)
}

fn persist(file: NamedTempFile, path: &Path) -> Result<(), ManifestError> {
    file.persist(path).map_err(|e| ManifestError::Write {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
