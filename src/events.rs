use alloy::primitives::{Address, B256};
use chrono::{DateTime, Local};

use crate::data::error::{FetchError, TransactionError};
use crate::data::types::{ContractName, EventBatch, EventName, WriteOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Error,
}

/// A message for the user, shown in the status bar.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
    pub at: DateTime<Local>,
}

impl Notification {
    pub fn new(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Local::now(),
        }
    }
}

/// Events sent from background data tasks to the main app loop
#[derive(Debug)]
pub enum AppEvent {
    // Chain
    Connected(u64), // chain_id
    LatestBlockNumber(u64),
    ContractResolved {
        contract: ContractName,
        result: Result<Address, FetchError>,
    },

    // Event streams
    StreamSettled {
        event: EventName,
        generation: u64,
        result: Result<EventBatch, FetchError>,
    },

    // Writes
    WriteSettled {
        op: WriteOp,
        result: Result<B256, TransactionError>,
    },

    // User actions
    Refetch(EventName),

    // Status
    Notify(Notification),
}
