//! Ingestion service
//!
//! Assigns global sequence numbers, persists every event, and keeps the
//! live per-asset projections up to date.

use crate::domain::{BookEvent, MarketAsset, OrderBook, Price, Spread};
use crate::error::{Error, Result};
use crate::feed::MarketDataFeed;
use crate::repository::OrderBookRepository;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Projection {
    books: BTreeMap<MarketAsset, OrderBook>,
    next_sequence: u64,
}

/// Shared pipeline state; the feed callback and the query surface both
/// go through here
struct Ingestor {
    repository: Arc<dyn OrderBookRepository>,
    state: Mutex<Projection>,
    snapshot_interval: u64,
}

impl Ingestor {
    fn lock(&self) -> MutexGuard<'_, Projection> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stamp, persist, project, and maybe snapshot — one critical section,
    /// so sequence numbers, log order, and projection order agree
    fn on_event(&self, mut event: BookEvent) {
        let mut state = self.lock();

        event.set_sequence(state.next_sequence);
        state.next_sequence += 1;

        if let Err(e) = self.repository.append_event(&event) {
            tracing::error!(error = %e, sequence = event.sequence(), "Failed to persist event");
        }

        let asset = event.asset().clone();
        let book = state
            .books
            .entry(asset.clone())
            .or_insert_with(|| OrderBook::empty(asset.clone()));
        *book = book.apply(&event);

        let last_sequence = book.last_sequence();
        if self.snapshot_interval > 0 && last_sequence % self.snapshot_interval == 0 {
            let snapshot = book.clone();
            if let Err(e) = self.repository.store_snapshot(&snapshot) {
                tracing::error!(error = %e, asset = %asset, "Failed to store snapshot");
            } else {
                tracing::debug!(asset = %asset, sequence = last_sequence, "Stored periodic snapshot");
            }
        }
    }
}

/// Event-sourced order-book service.
///
/// On construction it registers itself as the feed's event callback;
/// every delivered event is stamped with the next global sequence
/// number, appended to the repository, and applied to the in-memory
/// projection for its asset.
pub struct OrderBookService {
    ingestor: Arc<Ingestor>,
    feed: Arc<dyn MarketDataFeed>,
}

impl OrderBookService {
    /// `snapshot_interval` is in events; 0 disables periodic snapshots
    pub fn new(
        repository: Arc<dyn OrderBookRepository>,
        feed: Arc<dyn MarketDataFeed>,
        snapshot_interval: u64,
    ) -> Self {
        let ingestor = Arc::new(Ingestor {
            repository,
            state: Mutex::new(Projection {
                books: BTreeMap::new(),
                next_sequence: 1,
            }),
            snapshot_interval,
        });

        let callback_target = ingestor.clone();
        feed.set_on_event(Arc::new(move |event| callback_target.on_event(event)));

        Self { ingestor, feed }
    }

    pub fn subscribe(&self, token_id: &str) {
        self.feed.subscribe(token_id);
    }

    pub fn start(&self) {
        self.feed.start();
    }

    pub fn stop(&self) {
        self.feed.stop();
    }

    /// Current projection for an asset, by value
    pub fn get_current_book(&self, asset: &MarketAsset) -> Result<OrderBook> {
        self.ingestor
            .lock()
            .books
            .get(asset)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no book for {asset}")))
    }

    pub fn get_current_spread(&self, asset: &MarketAsset) -> Result<Spread> {
        self.get_current_book(asset)?.spread()
    }

    pub fn get_midpoint(&self, asset: &MarketAsset) -> Result<Price> {
        self.get_current_book(asset)?.midpoint()
    }

    /// First tracked asset whose token id matches
    pub fn resolve_asset(&self, token_id: &str) -> Option<MarketAsset> {
        self.ingestor
            .lock()
            .books
            .keys()
            .find(|asset| asset.token_id() == token_id)
            .cloned()
    }

    /// Number of events ingested so far
    pub fn event_count(&self) -> u64 {
        self.ingestor.lock().next_sequence - 1
    }

    /// Number of live book projections
    pub fn book_count(&self) -> usize {
        self.ingestor.lock().books.len()
    }

    /// Rebuild a book from storage: latest snapshot plus every event
    /// recorded after it. Returns `None` when the repository holds
    /// nothing for the asset.
    pub fn restore_book(&self, asset: &MarketAsset) -> Result<Option<OrderBook>> {
        let snapshot = self.ingestor.repository.get_latest_snapshot(asset)?;
        let base = match snapshot {
            Some(book) => book,
            None => OrderBook::empty(asset.clone()),
        };

        let since = base.last_sequence();
        let events = self.ingestor.repository.get_events_since(asset, since)?;
        if events.is_empty() && base.last_sequence() == 0 {
            return Ok(None);
        }

        let restored = events.iter().fold(base, |book, event| book.apply(event));
        Ok(Some(restored))
    }
}
