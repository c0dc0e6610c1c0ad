//! Event log and snapshot persistence

pub mod columnar;
mod memory;

pub use columnar::ColumnarRepository;
pub use memory::InMemoryRepository;

use crate::domain::{BookEvent, MarketAsset, OrderBook};
use crate::error::Result;

/// Storage capability consumed by the ingestion service and by restore.
///
/// The event log is the source of truth; snapshots are a projection kept
/// for fast cold starts (one live snapshot per asset).
pub trait OrderBookRepository: Send + Sync {
    /// Durably record an event in the order log
    fn append_event(&self, event: &BookEvent) -> Result<()>;

    /// Every stored event for `asset` with `sequence > sequence_number`,
    /// ascending by sequence. Includes events still sitting in write
    /// buffers.
    fn get_events_since(&self, asset: &MarketAsset, sequence_number: u64)
        -> Result<Vec<BookEvent>>;

    /// Persist the book as the latest snapshot for its asset, replacing
    /// any prior snapshot
    fn store_snapshot(&self, book: &OrderBook) -> Result<()>;

    /// The most recently stored snapshot for `asset`, if any
    fn get_latest_snapshot(&self, asset: &MarketAsset) -> Result<Option<OrderBook>>;
}
