//! # Node Configuration
//!
//! Defaults suit a developer machine; every field can be overridden through
//! `XC_*` environment variables.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `XC_DATA_ROOT` | `data_root` | `./express-data` |
//! | `XC_PORT_BASE` | `port_base` | `49000` |
//! | `XC_SECONDS_PER_BLOCK` | `seconds_per_block` | `15` |
//! | `XC_LOG_LEVEL` | `log_level` | `info` |
//! | `XC_JSON_LOGS` | `json_logs` | `false` |

use shared_types::{port_number, DEFAULT_PORT_BASE, WEB_SOCKET_PORT_SUFFIX};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use xc_02_checkpoint::CheckpointConfig;
use xc_03_tx_builder::FeeSchedule;
use xc_04_multisig::CoordinatorConfig;
use xc_05_rpc_gateway::GatewayConfig;

/// Largest network `create_network` produces; port derivation must fit it.
const MAX_NODES: u32 = 7;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Parent of every node's data directory.
    pub data_root: PathBuf,
    pub port_base: u16,
    pub seconds_per_block: u32,
    pub log_level: String,
    pub json_logs: bool,
    pub fees: FeeSchedule,
    pub coordinator: CoordinatorConfig,
    pub checkpoint: CheckpointConfig,
    /// Host and limits; the port comes from the node descriptor.
    pub gateway: GatewayConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./express-data"),
            port_base: DEFAULT_PORT_BASE,
            seconds_per_block: 15,
            log_level: "info".to_string(),
            json_logs: false,
            fees: FeeSchedule::default(),
            coordinator: CoordinatorConfig::default(),
            checkpoint: CheckpointConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("port base {0} leaves no room for a seven node network")]
    InvalidPortBase(u16),

    #[error("seconds per block must be at least 1")]
    InvalidBlockTime,

    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),

    #[error(transparent)]
    Gateway(#[from] xc_05_rpc_gateway::ConfigError),
}

fn parse_var<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value })
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source, then validate.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(root) = lookup("XC_DATA_ROOT") {
            config.data_root = PathBuf::from(root);
        }
        if let Some(value) = lookup("XC_PORT_BASE") {
            config.port_base = parse_var("XC_PORT_BASE", value)?;
        }
        if let Some(value) = lookup("XC_SECONDS_PER_BLOCK") {
            config.seconds_per_block = parse_var("XC_SECONDS_PER_BLOCK", value)?;
        }
        if let Some(level) = lookup("XC_LOG_LEVEL") {
            config.log_level = level.trim().to_ascii_lowercase();
        }
        if let Some(value) = lookup("XC_JSON_LOGS") {
            config.json_logs = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "XC_JSON_LOGS",
                        value,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Small coordinator timeouts, localhost gateway, data under `data_root`.
    pub fn for_testing(data_root: impl Into<PathBuf>) -> Self {
        let data_root = data_root.into();
        Self {
            checkpoint: CheckpointConfig::for_testing(data_root.join(".scratch")),
            data_root,
            coordinator: CoordinatorConfig::for_testing(),
            gateway: GatewayConfig::for_testing(),
            log_level: "debug".to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let highest = u32::from(self.port_base)
            + (MAX_NODES - 1) * 1000
            + u32::from(WEB_SOCKET_PORT_SUFFIX);
        if self.port_base == 0 || highest > u32::from(u16::MAX) {
            return Err(ConfigError::InvalidPortBase(self.port_base));
        }
        if self.seconds_per_block == 0 {
            return Err(ConfigError::InvalidBlockTime);
        }
        if tracing::Level::from_str(&self.log_level).is_err() {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        self.gateway.validate()?;
        Ok(())
    }

    /// RPC port of the node at `index`.
    pub fn rpc_port(&self, index: u16) -> Option<u16> {
        port_number(self.port_base, index, shared_types::RPC_PORT_SUFFIX)
    }
}
