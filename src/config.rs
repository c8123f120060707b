use std::path::PathBuf;

use alloy::primitives::Address;
use clap::Parser;

use crate::data::contracts::ContractRegistry;
use crate::data::error::ConfigError;
use crate::data::types::ContractName;

#[derive(Parser, Debug)]
#[command(
    name = "dex-events",
    about = "Terminal dashboard for DEX events and token approvals"
)]
pub struct Config {
    /// RPC endpoint URL
    #[arg(short, long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// DEX contract address
    #[arg(long, env = "DEX_ADDRESS")]
    pub dex_address: Option<Address>,

    /// Token (Balloons) contract address
    #[arg(long, env = "TOKEN_ADDRESS")]
    pub token_address: Option<Address>,

    /// Deployments JSON file mapping contract names to addresses and ABIs
    #[arg(short, long)]
    pub deployments: Option<PathBuf>,

    /// Private key used to sign transactions (defaults to the node's first unlocked account)
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Block explorer base URL used for address and transaction links
    #[arg(long)]
    pub explorer_url: Option<String>,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,

    /// Log file path (defaults to the user cache directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Contracts from the deployments file, with explicit addresses taking precedence.
    pub fn contract_registry(&self) -> Result<ContractRegistry, ConfigError> {
        let mut registry = ContractRegistry::new();
        if let Some(path) = &self.deployments {
            registry = registry.load_deployments(path)?;
        }
        if let Some(address) = self.dex_address {
            registry = registry.with_builtin(ContractName::Dex, address);
        }
        if let Some(address) = self.token_address {
            registry = registry.with_builtin(ContractName::Balloons, address);
        }
        Ok(registry)
    }
}
