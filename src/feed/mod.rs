//! Market-data feed contract and implementations
//!
//! The ingestion service only sees this callback contract; the live
//! binding speaks the Polymarket CLOB WebSocket protocol.

mod manual;
pub mod parser;
mod polymarket;

pub use manual::ManualFeed;
pub use polymarket::{PolymarketFeed, PolymarketFeedConfig, POLYMARKET_WS_URL};

use crate::domain::BookEvent;
use std::sync::Arc;

/// Callback invoked with every parsed event. Events arrive with
/// `sequence == 0`; the ingestion service assigns the real number.
pub type EventCallback = Arc<dyn Fn(BookEvent) + Send + Sync>;

/// Upstream event source.
///
/// After `start`, the callback is invoked zero or more times, possibly
/// from another thread but never concurrently with itself. `start` and
/// `stop` are best-effort and return promptly.
pub trait MarketDataFeed: Send + Sync {
    fn set_on_event(&self, callback: EventCallback);
    fn subscribe(&self, token_id: &str);
    fn start(&self);
    fn stop(&self);
}
