//! In-memory repository, the reference implementation

use super::OrderBookRepository;
use crate::domain::{BookEvent, MarketAsset, OrderBook};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Default)]
struct State {
    events: Vec<BookEvent>,
    snapshots: HashMap<MarketAsset, OrderBook>,
}

/// Keeps the whole event log in one append-only vector and the latest
/// snapshot per asset in a map. The columnar implementation is tested
/// against this one.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored events, across all assets
    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderBookRepository for InMemoryRepository {
    fn append_event(&self, event: &BookEvent) -> Result<()> {
        self.lock().events.push(event.clone());
        Ok(())
    }

    fn get_events_since(
        &self,
        asset: &MarketAsset,
        sequence_number: u64,
    ) -> Result<Vec<BookEvent>> {
        let state = self.lock();
        let mut matching: Vec<BookEvent> = state
            .events
            .iter()
            .filter(|e| e.asset() == asset && e.sequence() > sequence_number)
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.sequence());
        Ok(matching)
    }

    fn store_snapshot(&self, book: &OrderBook) -> Result<()> {
        self.lock()
            .snapshots
            .insert(book.asset().clone(), book.clone());
        Ok(())
    }

    fn get_latest_snapshot(&self, asset: &MarketAsset) -> Result<Option<OrderBook>> {
        Ok(self.lock().snapshots.get(asset).cloned())
    }
}
