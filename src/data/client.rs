use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::data::contracts::ContractRef;
use crate::data::error::{FetchError, TransactionError};
use crate::data::types::{ContractName, EventBatch, EventStreamQuery, WriteCall};

/// Reads and writes against the chain the dashboard is connected to.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address and ABI of a configured contract.
    fn contract(&self, name: ContractName) -> Option<&ContractRef>;

    /// Confirm the contract has code deployed and return its address.
    async fn resolve_contract(&self, name: ContractName) -> Result<Address, FetchError>;

    async fn latest_block_number(&self) -> Result<u64, FetchError>;

    /// Full history of one event from `query.from_block` to the current head.
    async fn query_events(&self, query: &EventStreamQuery) -> Result<EventBatch, FetchError>;

    /// Sign and send a contract call, resolving once it is mined successfully.
    async fn write_contract(&self, call: &WriteCall) -> Result<B256, TransactionError>;
}
