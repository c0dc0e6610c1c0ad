//! Typed order-book events as delivered by the venue

use super::types::{MarketAsset, Price, PriceLevel, Quantity, Side, Timestamp};
use serde::{Deserialize, Serialize};

/// Full replacement of every level on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub asset: MarketAsset,
    pub timestamp: Timestamp,
    pub sequence: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub hash: String,
}

/// One price-level change inside a delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevelDelta {
    pub asset_id: String,
    pub price: Price,
    pub new_size: Quantity,
    pub side: Side,
    pub best_bid: Price,
    pub best_ask: Price,
}

/// Incremental set of price-level changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDelta {
    pub asset: MarketAsset,
    pub timestamp: Timestamp,
    pub sequence: u64,
    pub changes: Vec<PriceLevelDelta>,
}

/// A trade print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub asset: MarketAsset,
    pub timestamp: Timestamp,
    pub sequence: u64,
    pub price: Price,
    pub size: Quantity,
    pub side: Side,
    /// Carried opaque, exactly as the venue sends it
    pub fee_rate_bps: String,
}

/// The market's minimum price increment changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSizeChange {
    pub asset: MarketAsset,
    pub timestamp: Timestamp,
    pub sequence: u64,
    pub old_tick_size: Price,
    pub new_tick_size: Price,
}

/// Tagged union of everything the feed can deliver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BookEvent {
    Snapshot(BookSnapshot),
    Delta(BookDelta),
    Trade(TradeEvent),
    TickSize(TickSizeChange),
}

/// Storage identity of an event variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    BookSnapshot,
    BookDelta,
    TradeEvent,
    TickSizeChange,
}

impl EventType {
    /// Partition directory name for this variant
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::BookSnapshot => "book_snapshot",
            EventType::BookDelta => "book_delta",
            EventType::TradeEvent => "trade_event",
            EventType::TickSizeChange => "tick_size_change",
        }
    }

    pub const ALL: [EventType; 4] = [
        EventType::BookSnapshot,
        EventType::BookDelta,
        EventType::TradeEvent,
        EventType::TickSizeChange,
    ];
}

impl BookEvent {
    pub fn asset(&self) -> &MarketAsset {
        match self {
            BookEvent::Snapshot(e) => &e.asset,
            BookEvent::Delta(e) => &e.asset,
            BookEvent::Trade(e) => &e.asset,
            BookEvent::TickSize(e) => &e.asset,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            BookEvent::Snapshot(e) => e.timestamp,
            BookEvent::Delta(e) => e.timestamp,
            BookEvent::Trade(e) => e.timestamp,
            BookEvent::TickSize(e) => e.timestamp,
        }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            BookEvent::Snapshot(e) => e.sequence,
            BookEvent::Delta(e) => e.sequence,
            BookEvent::Trade(e) => e.sequence,
            BookEvent::TickSize(e) => e.sequence,
        }
    }

    pub fn set_sequence(&mut self, sequence: u64) {
        match self {
            BookEvent::Snapshot(e) => e.sequence = sequence,
            BookEvent::Delta(e) => e.sequence = sequence,
            BookEvent::Trade(e) => e.sequence = sequence,
            BookEvent::TickSize(e) => e.sequence = sequence,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            BookEvent::Snapshot(_) => EventType::BookSnapshot,
            BookEvent::Delta(_) => EventType::BookDelta,
            BookEvent::Trade(_) => EventType::TradeEvent,
            BookEvent::TickSize(_) => EventType::TickSizeChange,
        }
    }
}
