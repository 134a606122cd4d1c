//! Orchestrator tunables.

/// Configuration for a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// Read template slots back after a recovered configuration call.
    pub verify_configuration: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            verify_configuration: true,
        }
    }
}

impl ProvisionConfig {
    /// Enable or disable the post-recovery read-back.
    pub fn with_verify_configuration(mut self, enabled: bool) -> Self {
        self.verify_configuration = enabled;
        self
    }
}
