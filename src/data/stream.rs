use std::collections::BTreeMap;
use std::sync::Arc;

use crate::data::error::FetchError;
use crate::data::types::{EventBatch, EventName, EventRecord, EventStreamQuery};

/// Loading flag and last-known-good data for one event stream.
///
/// `records` and `loading` are independent: a refetch keeps the previous
/// records visible until its result replaces them wholesale.
#[derive(Debug, Clone)]
pub struct StreamState {
    pub query: EventStreamQuery,
    records: Arc<[EventRecord]>,
    loading: bool,
    generation: u64,
    head: Option<u64>,
    last_error: Option<String>,
}

impl StreamState {
    fn new(query: EventStreamQuery) -> Self {
        Self {
            query,
            records: Arc::from(Vec::new()),
            loading: false,
            generation: 0,
            head: None,
            last_error: None,
        }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Chain head the current records were fetched at.
    pub fn head(&self) -> Option<u64> {
        self.head
    }

    /// True when the last settled fetch failed. The records are empty in that
    /// case, exactly as for a stream with no events.
    pub fn failed(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether any fetch has settled yet.
    pub fn settled_once(&self) -> bool {
        self.head.is_some() || self.last_error.is_some()
    }
}

/// What happened when a fetch result was offered to the stream set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Applied,
    /// A newer fetch was issued after this one, or the stream is unknown.
    Stale,
}

/// All event streams on the dashboard, keyed by event tag.
#[derive(Debug, Clone, Default)]
pub struct EventStreams {
    streams: BTreeMap<EventName, StreamState>,
}

impl EventStreams {
    pub fn new(queries: impl IntoIterator<Item = EventStreamQuery>) -> Self {
        Self {
            streams: queries
                .into_iter()
                .map(|q| (q.event, StreamState::new(q)))
                .collect(),
        }
    }

    pub fn get(&self, event: EventName) -> Option<&StreamState> {
        self.streams.get(&event)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamState> {
        self.streams.values()
    }

    /// Mark a stream as loading and return the generation of the new fetch.
    pub fn begin_fetch(&mut self, event: EventName) -> Option<(EventStreamQuery, u64)> {
        let state = self.streams.get_mut(&event)?;
        state.generation += 1;
        state.loading = true;
        Some((state.query, state.generation))
    }

    /// Apply the result of fetch `generation`. Only the newest issued fetch
    /// may write; older results are dropped.
    pub fn settle(
        &mut self,
        event: EventName,
        generation: u64,
        result: Result<EventBatch, FetchError>,
    ) -> Settle {
        let Some(state) = self.streams.get_mut(&event) else {
            return Settle::Stale;
        };
        if generation != state.generation {
            return Settle::Stale;
        }
        state.loading = false;
        match result {
            Ok(batch) => {
                state.records = batch.records;
                state.head = Some(batch.head);
                state.last_error = None;
            }
            Err(e) => {
                state.records = Arc::from(Vec::new());
                state.last_error = Some(e.to_string());
            }
        }
        Settle::Applied
    }
}
