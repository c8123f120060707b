use alloy::dyn_abi::JsonAbiExt;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use color_eyre::eyre::{Result, eyre};
use tracing::{debug, info, warn};

use crate::data::client::ChainClient;
use crate::data::contracts::{ContractRef, ContractRegistry};
use crate::data::decoder::LogDecoder;
use crate::data::error::{FetchError, TransactionError};
use crate::data::types::{ContractName, EventBatch, EventStreamQuery, WriteCall};

/// Chain client backed by an alloy HTTP provider.
///
/// The provider is boxed as a trait object so the wallet and non-wallet
/// builder types share one field.
pub struct AlloyChainClient {
    provider: Box<dyn Provider + Send + Sync>,
    chain_id: u64,
    sender: Address,
    contracts: ContractRegistry,
}

impl AlloyChainClient {
    /// Connect to a node over HTTP.
    ///
    /// With a private key, transactions are signed locally. Without one, the
    /// node's first unlocked account sends them (local dev chains).
    pub async fn connect(
        rpc_url: &str,
        private_key: Option<&str>,
        contracts: ContractRegistry,
    ) -> Result<Self> {
        let url = rpc_url.parse()?;
        let (provider, sender): (Box<dyn Provider + Send + Sync>, Address) = match private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key.parse()?;
                let sender = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .on_http(url);
                (Box::new(provider), sender)
            }
            None => {
                let provider = ProviderBuilder::new().on_http(url);
                let accounts = provider.get_accounts().await?;
                let sender = accounts
                    .first()
                    .copied()
                    .ok_or_else(|| eyre!("node has no unlocked accounts; pass --private-key"))?;
                (Box::new(provider), sender)
            }
        };
        let chain_id = provider.get_chain_id().await?;
        info!(%sender, chain_id, "connected to {rpc_url}");
        Ok(Self {
            provider,
            chain_id,
            sender,
            contracts,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    fn contract_ref(&self, name: ContractName) -> Result<&ContractRef, FetchError> {
        self.contracts
            .get(name)
            .ok_or(FetchError::UnknownContract(name))
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    fn contract(&self, name: ContractName) -> Option<&ContractRef> {
        self.contracts.get(name)
    }

    async fn resolve_contract(&self, name: ContractName) -> Result<Address, FetchError> {
        let contract = self.contract_ref(name)?;
        let code = self
            .provider
            .get_code_at(contract.address)
            .await
            .map_err(|e| FetchError::Node(e.to_string()))?;
        if code.is_empty() {
            return Err(FetchError::NotDeployed(contract.address.to_string()));
        }
        Ok(contract.address)
    }

    async fn latest_block_number(&self) -> Result<u64, FetchError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| FetchError::Node(e.to_string()))
    }

    async fn query_events(&self, query: &EventStreamQuery) -> Result<EventBatch, FetchError> {
        let contract = self.contract_ref(query.contract)?;
        let abi_event = contract
            .event(query.event)
            .ok_or(FetchError::UnknownEvent(query.event))?;

        let head = self.latest_block_number().await?;
        if query.from_block > head {
            return Err(FetchError::FromBlockAhead {
                from_block: query.from_block,
                head,
            });
        }

        let filter = Filter::new()
            .address(contract.address)
            .event_signature(abi_event.selector())
            .from_block(query.from_block)
            .to_block(head);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| FetchError::Node(e.to_string()))?;
        debug!(event = %query.event, logs = logs.len(), head, "fetched logs");

        let records = LogDecoder::decode_all(query.event, abi_event, &logs)?;
        Ok(EventBatch {
            records: records.into(),
            head,
        })
    }

    async fn write_contract(&self, call: &WriteCall) -> Result<B256, TransactionError> {
        let contract = self
            .contracts
            .get(call.contract)
            .ok_or_else(|| TransactionError::Encoding(format!("{} is not configured", call.contract)))?;
        let function = contract.function(call.function).ok_or_else(|| {
            TransactionError::Encoding(format!("{} has no function {}", call.contract, call.function))
        })?;
        let input = function
            .abi_encode_input(&call.args)
            .map_err(|e| TransactionError::Encoding(e.to_string()))?;

        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(contract.address)
            .with_input(input);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| TransactionError::classify(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, function = call.function, "transaction sent");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| TransactionError::classify(e.to_string()))?;
        if !receipt.status() {
            warn!(%tx_hash, "transaction reverted");
            return Err(TransactionError::Reverted(format!(
                "{} reverted in transaction {tx_hash}",
                call.function
            )));
        }
        Ok(receipt.transaction_hash)
    }
}
