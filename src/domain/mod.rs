//! Domain model
//!
//! Value types, the event vocabulary, and the order-book aggregate

mod book;
mod events;
mod types;

pub use book::{OrderBook, Spread};
pub use events::{
    BookDelta, BookEvent, BookSnapshot, EventType, PriceLevelDelta, TickSizeChange, TradeEvent,
};
pub use types::{MarketAsset, Price, PriceLevel, Quantity, Side, Timestamp};
