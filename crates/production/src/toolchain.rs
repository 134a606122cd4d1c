//! Running Foundry toolchain processes.

use provisioner_types::PrivateKey;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Environment variable `cast` reads the signing key from.
pub const PRIVATE_KEY_ENV: &str = "ETH_PRIVATE_KEY";

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Stderr if present, stdout otherwise, trimmed.
    pub fn diagnostic(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        text.trim().to_string()
    }

    /// Last non-empty line of stdout.
    pub fn last_line(&self) -> Option<&str> {
        self.stdout.lines().map(str::trim).rfind(|l| !l.is_empty())
    }
}

/// Locations of the `cast` and `forge` executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cast: PathBuf,
    pub forge: PathBuf,
    /// Working directory for `forge` (the contracts project root).
    pub project_root: Option<PathBuf>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cast: PathBuf::from("cast"),
            forge: PathBuf::from("forge"),
            project_root: None,
        }
    }
}

impl Toolchain {
    pub async fn cast<I, S>(&self, args: I) -> std::io::Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        run(&self.cast, args, None).await
    }

    /// Run `cast` with `key` handed over through [`PRIVATE_KEY_ENV`].
    ///
    /// The key never appears on the command line.
    pub async fn cast_signed<I, S>(
        &self,
        key: &PrivateKey,
        args: I,
    ) -> std::io::Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.cast);
        command
            .args(args)
            .env(PRIVATE_KEY_ENV, key.expose())
            .stdin(std::process::Stdio::null());
        capture(&mut command).await
    }

    pub async fn forge<I, S>(&self, args: I) -> std::io::Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        run(&self.forge, args, self.project_root.as_deref()).await
    }
}

/// Run `program` to completion, capturing output. Never inherits stdin.
pub async fn run<I, S>(program: &Path, args: I, cwd: Option<&Path>) -> std::io::Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).stdin(std::process::Stdio::null());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    capture(&mut command).await
}

/// Run a prepared command to completion, capturing output.
pub async fn capture(command: &mut Command) -> std::io::Result<ToolOutput> {
    let output = command.kill_on_drop(true).output().await?;
    let result = ToolOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(
        program = ?command.as_std().get_program(),
        success = result.success,
        "Toolchain process finished"
    );
    Ok(result)
}
