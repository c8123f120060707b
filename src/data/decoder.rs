use std::collections::BTreeMap;

use alloy::dyn_abi::{DynSolValue, EventExt};
use alloy::json_abi::Event;
use alloy::rpc::types::Log;

use crate::data::error::FetchError;
use crate::data::types::{ArgValue, EventName, EventRecord};

pub struct LogDecoder;

impl LogDecoder {
    /// Decode one raw log into an `EventRecord` using the ABI event definition.
    ///
    /// Indexed values come back from the topics and body values from the data
    /// section; both are matched to the ABI inputs by declaration order.
    pub fn decode(name: EventName, abi_event: &Event, log: &Log) -> Result<EventRecord, FetchError> {
        let decoded = abi_event
            .decode_log(&log.inner.data, true)
            .map_err(|e| FetchError::Decode {
                event: name,
                reason: e.to_string(),
            })?;

        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        let mut args = BTreeMap::new();

        for input in &abi_event.inputs {
            let value = if input.indexed {
                indexed.next()
            } else {
                body.next()
            };
            let Some(value) = value else {
                return Err(FetchError::Decode {
                    event: name,
                    reason: format!("missing value for '{}'", input.name),
                });
            };
            args.insert(input.name.clone(), to_arg_value(value));
        }

        Ok(EventRecord {
            event: name,
            args,
            block_number: log.block_number,
            transaction_hash: log.transaction_hash,
            log_index: log.log_index,
        })
    }

    /// Decode a batch of logs and order them by emission (block, then log index).
    pub fn decode_all(
        name: EventName,
        abi_event: &Event,
        logs: &[Log],
    ) -> Result<Vec<EventRecord>, FetchError> {
        let mut records = logs
            .iter()
            .map(|log| Self::decode(name, abi_event, log))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|r| (r.block_number, r.log_index));
        Ok(records)
    }
}

fn to_arg_value(value: DynSolValue) -> ArgValue {
    match value {
        DynSolValue::Address(a) => ArgValue::Address(a),
        DynSolValue::Uint(u, _) => ArgValue::Uint(u),
        DynSolValue::Bool(b) => ArgValue::Other(b.to_string()),
        DynSolValue::Int(i, _) => ArgValue::Other(i.to_string()),
        DynSolValue::String(s) => ArgValue::Other(s),
        DynSolValue::FixedBytes(b, size) => {
            ArgValue::Other(format!("0x{}", alloy::primitives::hex::encode(&b[..size])))
        }
        DynSolValue::Bytes(b) => ArgValue::Other(format!("0x{}", alloy::primitives::hex::encode(b))),
        other => ArgValue::Other(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::json_abi::JsonAbi;
    use alloy::primitives::{Address, B256, Bytes, Log as PrimitiveLog, LogData, U256};

    fn abi_event(json: &str, name: &str) -> Event {
        let abi: JsonAbi = serde_json::from_str(json).unwrap();
        abi.event(name).unwrap()[0].clone()
    }

    fn approval_event() -> Event {
        abi_event(include_str!("../../abis/balloons.json"), "Approval")
    }

    fn swap_event() -> Event {
        abi_event(include_str!("../../abis/dex.json"), "EthToTokenSwap")
    }

    fn address_topic(addr: Address) -> B256 {
        let mut topic = B256::ZERO;
        topic.0[12..].copy_from_slice(addr.as_slice());
        topic
    }

    fn make_log(topics: Vec<B256>, data: Vec<u8>, block: u64, index: u64) -> Log {
        Log {
            inner: PrimitiveLog {
                address: Address::ZERO,
                data: LogData::new(topics, Bytes::from(data)).unwrap(),
            },
            block_hash: None,
            block_number: Some(block),
            block_timestamp: None,
            transaction_hash: Some(B256::repeat_byte(block as u8)),
            transaction_index: None,
            log_index: Some(index),
            removed: false,
        }
    }

    fn approval_log(owner: Address, spender: Address, value: U256, block: u64, index: u64) -> Log {
        let event = approval_event();
        make_log(
            vec![event.selector(), address_topic(owner), address_topic(spender)],
            value.to_be_bytes::<32>().to_vec(),
            block,
            index,
        )
    }

    #[test]
    fn test_decode_approval_indexed_and_body() {
        let owner = Address::repeat_byte(0xaa);
        let spender = Address::repeat_byte(0xbb);
        let value = U256::from(1_000_000u64);
        let log = approval_log(owner, spender, value, 7, 2);

        let record = LogDecoder::decode(EventName::Approval, &approval_event(), &log).unwrap();
        assert_eq!(record.event, EventName::Approval);
        assert_eq!(record.address("owner"), Some(owner));
        assert_eq!(record.address("spender"), Some(spender));
        assert_eq!(record.uint("value"), Some(value));
        assert_eq!(record.block_number, Some(7));
        assert_eq!(record.log_index, Some(2));
    }

    #[test]
    fn test_decode_non_indexed_swap() {
        let event = swap_event();
        let swapper = Address::repeat_byte(0x42);
        let mut data = Vec::new();
        data.extend_from_slice(&address_topic(swapper).0);
        data.extend_from_slice(&U256::from(500u64).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(9u64).to_be_bytes::<32>());
        let log = make_log(vec![event.selector()], data, 1, 0);

        let record = LogDecoder::decode(EventName::EthToTokenSwap, &event, &log).unwrap();
        assert_eq!(record.address("swapper"), Some(swapper));
        assert_eq!(record.uint("tokenOutput"), Some(U256::from(500u64)));
        assert_eq!(record.uint("ethInput"), Some(U256::from(9u64)));
    }

    #[test]
    fn test_decode_wrong_selector_fails() {
        let log = make_log(
            vec![B256::ZERO, B256::ZERO, B256::ZERO],
            vec![0u8; 32],
            1,
            0,
        );
        let err = LogDecoder::decode(EventName::Approval, &approval_event(), &log).unwrap_err();
        assert!(matches!(err, FetchError::Decode { event: EventName::Approval, .. }));
    }

    #[test]
    fn test_decode_all_orders_by_emission() {
        let owner = Address::repeat_byte(0x01);
        let spender = Address::repeat_byte(0x02);
        let logs = vec![
            approval_log(owner, spender, U256::from(3u64), 9, 0),
            approval_log(owner, spender, U256::from(2u64), 4, 5),
            approval_log(owner, spender, U256::from(1u64), 4, 1),
        ];
        let records = LogDecoder::decode_all(EventName::Approval, &approval_event(), &logs).unwrap();
        let values: Vec<_> = records.iter().map(|r| r.uint("value").unwrap()).collect();
        assert_eq!(values, vec![U256::from(1u64), U256::from(2u64), U256::from(3u64)]);
    }

    #[test]
    fn test_decode_all_empty() {
        let records = LogDecoder::decode_all(EventName::Approval, &approval_event(), &[]).unwrap();
        assert!(records.is_empty());
    }
}
