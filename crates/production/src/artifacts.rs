//! Compiled contract artifacts on disk.
//!
//! Accepts both a flat directory of `<Contract>.json` files and the Foundry
//! `out/` layout (`<Contract>.sol/<Contract>.json`, `<Contract>.yul/<Contract>.json`).

use provisioner_core::{BackendError, ContractFactory, CreationCode};
use provisioner_types::CodeTemplate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(default)]
    abi: Vec<AbiItem>,
    bytecode: Bytecode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Bytecode {
    Plain(String),
    Object { object: String },
}

#[derive(Debug, Deserialize)]
struct AbiItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
}

#[derive(Debug, Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

impl AbiParam {
    /// Canonical type, expanding tuples into their components.
    fn canonical(&self) -> String {
        match self.kind.strip_prefix("tuple") {
            Some(suffix) => format!("({}){}", canonical_list(&self.components), suffix),
            None => self.kind.clone(),
        }
    }
}

fn canonical_list(params: &[AbiParam]) -> String {
    params
        .iter()
        .map(AbiParam::canonical)
        .collect::<Vec<_>>()
        .join(",")
}

/// Constructor signature for `abi`, or `None` if it takes no arguments.
fn constructor_signature(abi: &[AbiItem]) -> Option<String> {
    abi.iter()
        .find(|item| item.kind == "constructor")
        .filter(|item| !item.inputs.is_empty())
        .map(|item| format!("constructor({})", canonical_list(&item.inputs)))
}

/// [`ContractFactory`] reading compiled artifacts from a directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn locate(&self, contract: &str) -> Option<PathBuf> {
        let file = format!("{contract}.json");
        [
            self.dir.join(&file),
            self.dir.join(format!("{contract}.sol")).join(&file),
            self.dir.join(format!("{contract}.yul")).join(&file),
        ]
        .into_iter()
        .find(|path| path.is_file())
    }

    /// Load creation code for a compiled contract.
    pub fn load(&self, contract: &str) -> Result<CreationCode, BackendError> {
        let path = self
            .locate(contract)
            .ok_or_else(|| BackendError::MissingArtifact {
                contract: contract.to_string(),
            })?;
        let raw = std::fs::read_to_string(&path)?;
        let artifact: Artifact =
            serde_json::from_str(&raw).map_err(|e| BackendError::InvalidArtifact {
                contract: contract.to_string(),
                reason: e.to_string(),
            })?;

        let code = match artifact.bytecode {
            Bytecode::Plain(code) | Bytecode::Object { object: code } => code,
        };
        let digits = code.trim_start_matches("0x");
        if digits.is_empty() {
            return Err(BackendError::InvalidArtifact {
                contract: contract.to_string(),
                reason: "empty bytecode (abstract contract or interface?)".to_string(),
            });
        }

        Ok(CreationCode {
            contract: contract.to_string(),
            bytecode: format!("0x{digits}"),
            constructor: constructor_signature(&artifact.abi),
        })
    }
}

impl ContractFactory for ArtifactStore {
    fn creation_code(
        &self,
        resource: &str,
        template: &CodeTemplate,
    ) -> Result<CreationCode, BackendError> {
        match template {
            CodeTemplate::Artifact { contract } => self.load(contract),
            CodeTemplate::Raw {
                bytecode,
                constructor,
            } => Ok(CreationCode {
                contract: resource.to_string(),
                bytecode: bytecode.clone(),
                constructor: constructor.clone(),
            }),
        }
    }
}
