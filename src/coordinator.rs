use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::data::DataService;
use crate::data::client::ChainClient;
use crate::data::error::AmountError;
use crate::data::stream::{EventStreams, Settle, StreamState};
use crate::data::types::{ContractName, EventName, EventStreamQuery, WriteCall, WriteOp};
use crate::events::{AppEvent, Notification, NotifyLevel};
use crate::utils;

/// Pending token approval typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ApprovalRequest {
    /// DEX address once the contract is confirmed deployed.
    pub spender: Option<Address>,
    pub amount: String,
}

/// Where the write path currently is. Validation happens synchronously
/// inside `submit_approval`, so it has no phase of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePhase {
    Idle,
    Submitting(WriteOp),
    /// Write confirmed; waiting for these streams to settle.
    Refreshing(Vec<EventName>),
}

/// Owns the dashboard's event streams and the approval write path.
pub struct Coordinator {
    data: DataService,
    streams: EventStreams,
    approval: ApprovalRequest,
    phase: WritePhase,
    /// A DEX resolution request is in flight.
    resolving: bool,
    /// The last DEX resolution failed and the user has been told.
    resolve_failed: bool,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Coordinator {
    pub fn new(
        client: Arc<dyn ChainClient>,
        queries: Vec<EventStreamQuery>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            data: DataService::new(client, event_tx.clone()),
            streams: EventStreams::new(queries),
            approval: ApprovalRequest::default(),
            phase: WritePhase::Idle,
            resolving: false,
            resolve_failed: false,
            event_tx,
        }
    }

    /// Issue every initial request without waiting on any of them.
    pub fn start(&mut self) {
        self.resolve_dex();
        self.data.fetch_latest_block_number();
        for event in EventName::ALL {
            self.refetch(event);
        }
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        self.data.client()
    }

    pub fn stream(&self, event: EventName) -> Option<&StreamState> {
        self.streams.get(event)
    }

    pub fn streams(&self) -> &EventStreams {
        &self.streams
    }

    pub fn phase(&self) -> &WritePhase {
        &self.phase
    }

    pub fn approval(&self) -> &ApprovalRequest {
        &self.approval
    }

    pub fn amount_mut(&mut self) -> &mut String {
        &mut self.approval.amount
    }

    /// The submit control is disabled only while a write is in flight.
    pub fn submit_enabled(&self) -> bool {
        !matches!(self.phase, WritePhase::Submitting(_))
    }

    /// Re-read the head block. Also retries the DEX lookup until it succeeds.
    pub fn refresh_head(&mut self) {
        self.data.fetch_latest_block_number();
        if self.approval.spender.is_none() {
            self.resolve_dex();
        }
    }

    fn resolve_dex(&mut self) {
        if !self.resolving {
            self.resolving = true;
            self.data.resolve_contract(ContractName::Dex);
        }
    }

    /// Re-query the full history of one stream. The previous records stay
    /// visible until the new result lands.
    pub fn refetch(&mut self, event: EventName) {
        if let Some((query, generation)) = self.streams.begin_fetch(event) {
            self.data.fetch_stream(query, generation);
        }
    }

    /// Refetch exactly the given streams.
    pub fn invalidate(&mut self, events: &[EventName]) {
        for event in events {
            self.refetch(*event);
        }
    }

    /// Validate the approval form and submit `approve(dex, amount)`.
    ///
    /// Returns whether a write was issued.
    pub fn submit_approval(&mut self) -> bool {
        if !self.submit_enabled() {
            return false;
        }

        let Some(spender) = self.approval.spender else {
            self.resolve_dex();
            self.notify(
                NotifyLevel::Error,
                "DEX contract is not available yet, try again shortly",
            );
            return false;
        };

        let amount = match utils::parse_units(&self.approval.amount, utils::TOKEN_DECIMALS) {
            Ok(amount) => amount,
            Err(AmountError::Empty) => {
                self.notify(NotifyLevel::Error, "Please enter an amount to approve");
                return false;
            }
            Err(e) => {
                self.notify(NotifyLevel::Error, format!("Invalid amount: {e}"));
                return false;
            }
        };

        info!(%spender, %amount, "submitting approval");
        self.phase = WritePhase::Submitting(WriteOp::Approve);
        self.data.submit_write(WriteCall::approve(spender, amount));
        true
    }

    /// Apply a background result. Events the coordinator does not own are
    /// handed back to the caller.
    pub fn handle_event(&mut self, event: AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::ContractResolved { contract, result } => {
                if contract == ContractName::Dex {
                    self.resolving = false;
                }
                match result {
                    Ok(address) => {
                        info!(%contract, %address, "contract resolved");
                        if contract == ContractName::Dex {
                            self.approval.spender = Some(address);
                            self.resolve_failed = false;
                        }
                    }
                    Err(e) => {
                        error!(%contract, "contract resolution failed: {e}");
                        // Retries repeat the same failure; report it once.
                        if !self.resolve_failed {
                            self.notify(
                                NotifyLevel::Error,
                                format!("{contract} contract unavailable: {e}"),
                            );
                        }
                        if contract == ContractName::Dex {
                            self.resolve_failed = true;
                        }
                    }
                }
                None
            }
            AppEvent::StreamSettled {
                event,
                generation,
                result,
            } => {
                if let Err(e) = &result {
                    warn!(%event, generation, "fetch failed: {e}");
                }
                if self.streams.settle(event, generation, result) == Settle::Applied {
                    self.finish_refresh(event);
                }
                None
            }
            AppEvent::WriteSettled { op, result } => {
                match result {
                    Ok(tx_hash) => {
                        info!(?op, %tx_hash, "write confirmed");
                        self.notify(
                            NotifyLevel::Success,
                            "You've approved the DEX to use your tokens",
                        );
                        self.approval.amount.clear();
                        let affected = op.invalidates();
                        self.phase = WritePhase::Refreshing(affected.to_vec());
                        self.invalidate(affected);
                    }
                    Err(e) => {
                        error!(?op, "write failed: {e}");
                        self.notify(
                            NotifyLevel::Error,
                            format!("Failed to approve tokens for the DEX: {e}"),
                        );
                        self.phase = WritePhase::Idle;
                    }
                }
                None
            }
            other => Some(other),
        }
    }

    fn finish_refresh(&mut self, event: EventName) {
        if let WritePhase::Refreshing(waiting) = &mut self.phase {
            waiting.retain(|e| *e != event);
            if waiting.is_empty() {
                self.phase = WritePhase::Idle;
            }
        }
    }

    fn notify(&self, level: NotifyLevel, message: impl Into<String>) {
        let notification = Notification::new(level, message);
        match level {
            NotifyLevel::Success => info!("notify: {}", notification.message),
            NotifyLevel::Error => warn!("notify: {}", notification.message),
        }
        let _ = self.event_tx.send(AppEvent::Notify(notification));
    }
}
