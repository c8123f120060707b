use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;

use alloy::json_abi::{Event, Function, JsonAbi};
use alloy::primitives::Address;
use serde::Deserialize;

use crate::data::error::ConfigError;
use crate::data::types::{ContractName, EventName, EventStreamQuery};

/// Address and interface of a deployed contract.
#[derive(Debug, Clone)]
pub struct ContractRef {
    pub name: ContractName,
    pub address: Address,
    pub abi: JsonAbi,
}

impl ContractRef {
    pub fn event(&self, event: EventName) -> Option<&Event> {
        self.abi.event(event.as_str()).and_then(|overloads| overloads.first())
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.abi.function(name).and_then(|overloads| overloads.first())
    }
}

// --- Built-in ABI singletons ---

static DEX_ABI: OnceLock<JsonAbi> = OnceLock::new();
static BALLOONS_ABI: OnceLock<JsonAbi> = OnceLock::new();

fn builtin_abi(name: ContractName) -> &'static JsonAbi {
    match name {
        ContractName::Dex => DEX_ABI.get_or_init(|| {
            serde_json::from_str(include_str!("../../abis/dex.json"))
                .expect("built-in DEX ABI should be valid")
        }),
        ContractName::Balloons => BALLOONS_ABI.get_or_init(|| {
            serde_json::from_str(include_str!("../../abis/balloons.json"))
                .expect("built-in Balloons ABI should be valid")
        }),
    }
}

/// One entry of a deployments file.
#[derive(Debug, Deserialize)]
struct DeploymentEntry {
    address: String,
    #[serde(default)]
    abi: Option<JsonAbi>,
}

/// The contracts known to this session.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<ContractName, ContractRef>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract at `address` using its built-in ABI.
    pub fn with_builtin(mut self, name: ContractName, address: Address) -> Self {
        self.insert(ContractRef {
            name,
            address,
            abi: builtin_abi(name).clone(),
        });
        self
    }

    pub fn insert(&mut self, contract: ContractRef) {
        self.contracts.insert(contract.name, contract);
    }

    pub fn get(&self, name: ContractName) -> Option<&ContractRef> {
        self.contracts.get(&name)
    }

    /// Load contracts from a deployments JSON file keyed by contract name.
    ///
    /// Entries without an `abi` fall back to the built-in ABI. Unknown names are ignored.
    pub fn load_deployments(mut self, path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        self.merge_deployments(&data)?;
        Ok(self)
    }

    fn merge_deployments(&mut self, json: &str) -> Result<(), ConfigError> {
        let entries: HashMap<String, DeploymentEntry> = serde_json::from_str(json)?;
        for name in [ContractName::Dex, ContractName::Balloons] {
            let Some(entry) = entries.get(name.as_str()) else {
                continue;
            };
            let address = entry
                .address
                .parse::<Address>()
                .map_err(|_| ConfigError::InvalidAddress {
                    contract: name,
                    value: entry.address.clone(),
                })?;
            let abi = entry
                .abi
                .clone()
                .unwrap_or_else(|| builtin_abi(name).clone());
            self.insert(ContractRef { name, address, abi });
        }
        Ok(())
    }

    /// Build the query for `event` from genesis, checking the emitting contract defines it.
    pub fn stream_query(&self, event: EventName) -> Result<EventStreamQuery, ConfigError> {
        let contract_name = event.contract();
        let contract = self
            .get(contract_name)
            .ok_or(ConfigError::MissingContract(contract_name))?;
        if contract.event(event).is_none() {
            return Err(ConfigError::UnknownEvent {
                contract: contract_name,
                event,
            });
        }
        Ok(EventStreamQuery {
            contract: contract_name,
            event,
            from_block: 0,
        })
    }

    /// Queries for every dashboard stream, in display order.
    pub fn dashboard_queries(&self) -> Result<Vec<EventStreamQuery>, ConfigError> {
        EventName::ALL
            .iter()
            .map(|event| self.stream_query(*event))
            .collect()
    }

    /// Check that the token contract exposes `approve`.
    pub fn check_writable(&self) -> Result<(), ConfigError> {
        let token = self
            .get(ContractName::Balloons)
            .ok_or(ConfigError::MissingContract(ContractName::Balloons))?;
        if token.function("approve").is_none() {
            return Err(ConfigError::UnknownFunction {
                contract: ContractName::Balloons,
                function: "approve".to_string(),
            });
        }
        Ok(())
    }
}
