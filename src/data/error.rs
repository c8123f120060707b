use thiserror::Error;

use crate::data::types::{ContractName, EventName};

/// Problems in the contract setup. These stop the program at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no address configured for contract {0}")]
    MissingContract(ContractName),
    #[error("contract {contract} does not define event {event}")]
    UnknownEvent {
        contract: ContractName,
        event: EventName,
    },
    #[error("contract {contract} does not define function {function}")]
    UnknownFunction {
        contract: ContractName,
        function: String,
    },
    #[error("invalid address for {contract}: {value}")]
    InvalidAddress {
        contract: ContractName,
        value: String,
    },
    #[error("failed to read deployments file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse deployments file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A failed event query.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("contract {0} is not configured")]
    UnknownContract(ContractName),
    #[error("event {0} is not in the contract ABI")]
    UnknownEvent(EventName),
    #[error("start block {from_block} is ahead of chain head {head}")]
    FromBlockAhead { from_block: u64, head: u64 },
    #[error("no contract code at {0}")]
    NotDeployed(String),
    #[error("failed to decode {event} log: {reason}")]
    Decode { event: EventName, reason: String },
    #[error("node request failed: {0}")]
    Node(String),
}

/// A failed contract write, by category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("transaction rejected by signer: {0}")]
    UserRejected(String),
    #[error("insufficient funds or allowance: {0}")]
    Insufficient(String),
    #[error("reverted by contract: {0}")]
    Reverted(String),
    #[error("node or network error: {0}")]
    Network(String),
    #[error("cannot build transaction: {0}")]
    Encoding(String),
}

impl TransactionError {
    /// Sort a provider error message into a category.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("user rejected") || lower.contains("user denied") {
            TransactionError::UserRejected(message)
        } else if lower.contains("insufficient") || lower.contains("exceeds allowance") {
            TransactionError::Insufficient(message)
        } else if lower.contains("revert") {
            TransactionError::Reverted(message)
        } else {
            TransactionError::Network(message)
        }
    }
}

/// A decimal amount the user typed that cannot become minor units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a decimal number")]
    Malformed(String),
    #[error("'{0}' is too large")]
    Overflow(String),
}
