use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, B256, U256};

/// The two contracts the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContractName {
    Dex,
    Balloons,
}

impl ContractName {
    /// The name used in deployment files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractName::Dex => "DEX",
            ContractName::Balloons => "Balloons",
        }
    }
}

impl std::fmt::Display for ContractName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every event stream shown on the dashboard. Ordering is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventName {
    Approval,
    EthToTokenSwap,
    TokenToEthSwap,
    LiquidityProvided,
    LiquidityRemoved,
}

impl EventName {
    pub const ALL: [EventName; 5] = [
        EventName::Approval,
        EventName::EthToTokenSwap,
        EventName::TokenToEthSwap,
        EventName::LiquidityProvided,
        EventName::LiquidityRemoved,
    ];

    /// Event name as declared in the contract ABI.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Approval => "Approval",
            EventName::EthToTokenSwap => "EthToTokenSwap",
            EventName::TokenToEthSwap => "TokenToEthSwap",
            EventName::LiquidityProvided => "LiquidityProvided",
            EventName::LiquidityRemoved => "LiquidityRemoved",
        }
    }

    /// Contract that emits this event.
    pub fn contract(&self) -> ContractName {
        match self {
            EventName::Approval => ContractName::Balloons,
            _ => ContractName::Dex,
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded event argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Address(Address),
    Uint(U256),
    Other(String),
}

impl ArgValue {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            ArgValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            ArgValue::Uint(u) => Some(*u),
            _ => None,
        }
    }
}

/// One decoded log entry. Never mutated after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub event: EventName,
    pub args: BTreeMap<String, ArgValue>,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<u64>,
}

impl EventRecord {
    pub fn address(&self, arg: &str) -> Option<Address> {
        self.args.get(arg).and_then(ArgValue::as_address)
    }

    pub fn uint(&self, arg: &str) -> Option<U256> {
        self.args.get(arg).and_then(ArgValue::as_uint)
    }
}

/// Unit of fetch and refresh: one event of one contract from a fixed start block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStreamQuery {
    pub contract: ContractName,
    pub event: EventName,
    pub from_block: u64,
}

/// Full history of one stream, valid as of `head`.
#[derive(Debug, Clone)]
pub struct EventBatch {
    pub records: Arc<[EventRecord]>,
    pub head: u64,
}

/// State-changing operations the dashboard can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Approve,
}

impl WriteOp {
    /// Streams whose on-chain history changes when this operation succeeds.
    pub fn invalidates(&self) -> &'static [EventName] {
        match self {
            WriteOp::Approve => &[EventName::Approval],
        }
    }
}

/// A contract call ready to be signed and sent.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteCall {
    pub op: WriteOp,
    pub contract: ContractName,
    pub function: &'static str,
    pub args: Vec<DynSolValue>,
}

impl WriteCall {
    /// `approve(spender, amount)` on the token contract.
    pub fn approve(spender: Address, amount: U256) -> Self {
        Self {
            op: WriteOp::Approve,
            contract: ContractName::Balloons,
            function: "approve",
            args: vec![DynSolValue::Address(spender), DynSolValue::Uint(amount, 256)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_contracts() {
        assert_eq!(EventName::Approval.contract(), ContractName::Balloons);
        for event in &EventName::ALL[1..] {
            assert_eq!(event.contract(), ContractName::Dex);
        }
    }

    #[test]
    fn test_approve_invalidates_only_approval() {
        assert_eq!(WriteOp::Approve.invalidates(), &[EventName::Approval]);
    }

    #[test]
    fn test_approve_call_args() {
        let spender = Address::repeat_byte(0x11);
        let call = WriteCall::approve(spender, U256::from(5u64));
        assert_eq!(call.contract, ContractName::Balloons);
        assert_eq!(call.function, "approve");
        assert_eq!(
            call.args,
            vec![
                DynSolValue::Address(spender),
                DynSolValue::Uint(U256::from(5u64), 256)
            ]
        );
    }

    #[test]
    fn test_record_accessors() {
        let mut args = BTreeMap::new();
        args.insert("owner".to_string(), ArgValue::Address(Address::ZERO));
        args.insert("value".to_string(), ArgValue::Uint(U256::from(7u64)));
        let record = EventRecord {
            event: EventName::Approval,
            args,
            block_number: Some(3),
            transaction_hash: None,
            log_index: Some(0),
        };
        assert_eq!(record.address("owner"), Some(Address::ZERO));
        assert_eq!(record.uint("value"), Some(U256::from(7u64)));
        assert_eq!(record.uint("owner"), None);
        assert_eq!(record.address("missing"), None);
    }
}
