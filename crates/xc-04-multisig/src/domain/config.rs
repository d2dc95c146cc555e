//! Coordinator configuration.

use shared_types::GENESIS_ACCOUNT_LABEL;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How long an incomplete context stays in the registry.
    pub context_ttl: Duration,
    /// Per-signer response timeout during fan-out.
    pub signer_timeout: Duration,
    /// Account label that marks the shared threshold account.
    pub genesis_label: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            context_ttl: Duration::from_secs(600),
            signer_timeout: Duration::from_secs(5),
            genesis_label: GENESIS_ACCOUNT_LABEL.to_string(),
        }
    }
}

impl CoordinatorConfig {
    pub fn for_testing() -> Self {
        Self {
            context_ttl: Duration::from_secs(30),
            signer_timeout: Duration::from_millis(500),
            ..Default::default()
        }
    }
}
