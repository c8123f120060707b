pub mod client;
pub mod contracts;
pub mod decoder;
pub mod error;
pub mod provider;
pub mod stream;
pub mod types;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::data::client::ChainClient;
use crate::data::types::{ContractName, EventStreamQuery, WriteCall};
use crate::events::AppEvent;

/// Runs chain requests in background tasks and reports results as `AppEvent`s.
///
/// Nothing here holds dashboard state; a send to a closed channel (the app
/// has gone away) is ignored.
pub struct DataService {
    client: Arc<dyn ChainClient>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl DataService {
    pub fn new(client: Arc<dyn ChainClient>, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { client, event_tx }
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    /// Fetch the latest block number and send it as an event.
    pub fn fetch_latest_block_number(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match client.latest_block_number().await {
                Ok(number) => {
                    let _ = tx.send(AppEvent::LatestBlockNumber(number));
                }
                Err(e) => warn!("failed to get block number: {e}"),
            }
        });
    }

    /// Check that a contract is deployed at its configured address.
    pub fn resolve_contract(&self, contract: ContractName) {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = client.resolve_contract(contract).await;
            let _ = tx.send(AppEvent::ContractResolved { contract, result });
        });
    }

    /// Query the full history of one stream. `generation` is echoed back so
    /// the receiver can drop superseded results.
    pub fn fetch_stream(&self, query: EventStreamQuery, generation: u64) {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            debug!(event = %query.event, generation, "fetching stream");
            let result = client.query_events(&query).await;
            let _ = tx.send(AppEvent::StreamSettled {
                event: query.event,
                generation,
                result,
            });
        });
    }

    /// Submit a contract write and report when it settles.
    pub fn submit_write(&self, call: WriteCall) {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = client.write_contract(&call).await;
            let _ = tx.send(AppEvent::WriteSettled {
                op: call.op,
                result,
            });
        });
    }
}
