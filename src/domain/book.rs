//! Immutable order-book aggregate

use super::events::{BookDelta, BookEvent, BookSnapshot, TickSizeChange, TradeEvent};
use super::types::{MarketAsset, Price, PriceLevel, Quantity, Side, Timestamp};
use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Best bid and ask at an instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub best_bid: Price,
    pub best_ask: Price,
}

impl Spread {
    pub fn value(&self) -> Decimal {
        self.best_ask.value() - self.best_bid.value()
    }
}

/// L2 projection for one asset, rebuilt by applying events.
///
/// Bids are strictly price-descending, asks strictly price-ascending, and no
/// level ever carries a zero quantity. Every `apply` returns a new book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    asset: MarketAsset,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    latest_trade: Option<TradeEvent>,
    tick_size: Price,
    timestamp: Timestamp,
    last_sequence: u64,
    book_hash: String,
}

impl OrderBook {
    /// Create an empty book for an asset
    pub fn empty(asset: MarketAsset) -> Self {
        Self {
            asset,
            bids: Vec::new(),
            asks: Vec::new(),
            latest_trade: None,
            tick_size: Price::default_tick(),
            timestamp: Timestamp::default(),
            last_sequence: 0,
            book_hash: String::new(),
        }
    }

    /// Replace the whole level set from a snapshot
    pub fn apply_snapshot(&self, event: &BookSnapshot) -> Self {
        let mut bids = event.bids.clone();
        bids.sort_by(|a, b| b.price.cmp(&a.price));

        let mut asks = event.asks.clone();
        asks.sort_by(|a, b| a.price.cmp(&b.price));

        Self {
            asset: self.asset.clone(),
            bids,
            asks,
            latest_trade: self.latest_trade.clone(),
            tick_size: self.tick_size,
            timestamp: event.timestamp,
            last_sequence: event.sequence,
            book_hash: event.hash.clone(),
        }
    }

    /// Patch individual price levels.
    ///
    /// A change may reference a foreign `asset_id`; it is applied unchanged.
    /// Routing deltas onto the right book is the ingestion service's job.
    pub fn apply_delta(&self, event: &BookDelta) -> Self {
        let mut bids = self.bids.clone();
        let mut asks = self.asks.clone();

        for change in &event.changes {
            match change.side {
                Side::Buy => update_levels(&mut bids, change.price, change.new_size, true),
                Side::Sell => update_levels(&mut asks, change.price, change.new_size, false),
            }
        }

        Self {
            asset: self.asset.clone(),
            bids,
            asks,
            latest_trade: self.latest_trade.clone(),
            tick_size: self.tick_size,
            timestamp: event.timestamp,
            last_sequence: event.sequence,
            book_hash: self.book_hash.clone(),
        }
    }

    /// Record the latest trade; levels stay untouched
    pub fn apply_trade(&self, event: &TradeEvent) -> Self {
        Self {
            asset: self.asset.clone(),
            bids: self.bids.clone(),
            asks: self.asks.clone(),
            latest_trade: Some(event.clone()),
            tick_size: self.tick_size,
            timestamp: event.timestamp,
            last_sequence: event.sequence,
            book_hash: self.book_hash.clone(),
        }
    }

    /// Adopt a new tick size
    pub fn apply_tick_size(&self, event: &TickSizeChange) -> Self {
        Self {
            asset: self.asset.clone(),
            bids: self.bids.clone(),
            asks: self.asks.clone(),
            latest_trade: self.latest_trade.clone(),
            tick_size: event.new_tick_size,
            timestamp: event.timestamp,
            last_sequence: event.sequence,
            book_hash: self.book_hash.clone(),
        }
    }

    /// Variant dispatch
    pub fn apply(&self, event: &BookEvent) -> Self {
        match event {
            BookEvent::Snapshot(e) => self.apply_snapshot(e),
            BookEvent::Delta(e) => self.apply_delta(e),
            BookEvent::Trade(e) => self.apply_trade(e),
            BookEvent::TickSize(e) => self.apply_tick_size(e),
        }
    }

    pub fn best_bid(&self) -> Result<Price> {
        self.bids
            .first()
            .map(|l| l.price)
            .ok_or(Error::Empty("bids"))
    }

    pub fn best_ask(&self) -> Result<Price> {
        self.asks
            .first()
            .map(|l| l.price)
            .ok_or(Error::Empty("asks"))
    }

    pub fn spread(&self) -> Result<Spread> {
        Ok(Spread {
            best_bid: self.best_bid()?,
            best_ask: self.best_ask()?,
        })
    }

    pub fn midpoint(&self) -> Result<Price> {
        let bid = self.best_bid()?.value();
        let ask = self.best_ask()?.value();
        Price::new((bid + ask) / Decimal::TWO)
    }

    /// Level count of the deeper side
    pub fn depth(&self) -> usize {
        self.bids.len().max(self.asks.len())
    }

    pub fn asset(&self) -> &MarketAsset {
        &self.asset
    }

    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    pub fn latest_trade(&self) -> Option<&TradeEvent> {
        self.latest_trade.as_ref()
    }

    pub fn tick_size(&self) -> Price {
        self.tick_size
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn book_hash(&self) -> &str {
        &self.book_hash
    }
}

/// Apply one level change to a sorted side, keeping the sort order.
///
/// Zero size removes the level; an existing level is resized in place;
/// otherwise the level is inserted at its sorted position.
fn update_levels(levels: &mut Vec<PriceLevel>, price: Price, new_size: Quantity, descending: bool) {
    let existing = levels.iter().position(|l| l.price == price);

    if new_size.is_zero() {
        if let Some(idx) = existing {
            levels.remove(idx);
        }
    } else if let Some(idx) = existing {
        levels[idx].size = new_size;
    } else {
        let insert_at = levels
            .iter()
            .position(|l| {
                if descending {
                    l.price < price
                } else {
                    l.price > price
                }
            })
            .unwrap_or(levels.len());
        levels.insert(insert_at, PriceLevel::new(price, new_size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::PriceLevelDelta;
    use rust_decimal_macros::dec;

    fn asset() -> MarketAsset {
        MarketAsset::new("0xbd31dc", "6581861").unwrap()
    }

    fn level(price: &str, size: &str) -> PriceLevel {
        PriceLevel::from_strings(price, size).unwrap()
    }

    fn snapshot(sequence: u64) -> BookSnapshot {
        BookSnapshot {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_000_000).unwrap(),
            sequence,
            bids: vec![level("0.30", "10"), level("0.49", "20"), level("0.40", "15")],
            asks: vec![level("0.60", "10"), level("0.52", "25"), level("0.55", "5")],
            hash: "abc123".to_string(),
        }
    }

    fn delta(sequence: u64, price: &str, new_size: &str, side: Side) -> BookDelta {
        BookDelta {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_001_000).unwrap(),
            sequence,
            changes: vec![PriceLevelDelta {
                asset_id: "6581861".to_string(),
                price: Price::parse(price).unwrap(),
                new_size: Quantity::parse(new_size).unwrap(),
                side,
                best_bid: Price::parse("0.49").unwrap(),
                best_ask: Price::parse("0.52").unwrap(),
            }],
        }
    }

    #[test]
    fn test_empty_book() {
        let book = OrderBook::empty(asset());
        assert_eq!(book.last_sequence(), 0);
        assert_eq!(book.tick_size().value(), dec!(0.01));
        assert_eq!(book.depth(), 0);
        assert!(matches!(book.best_bid(), Err(Error::Empty("bids"))));
        assert!(matches!(book.best_ask(), Err(Error::Empty("asks"))));
        assert!(book.midpoint().is_err());
    }

    #[test]
    fn test_snapshot_sorts_both_sides() {
        let book = OrderBook::empty(asset()).apply_snapshot(&snapshot(1));

        let bid_prices: Vec<_> = book.bids().iter().map(|l| l.price.value()).collect();
        assert_eq!(bid_prices, vec![dec!(0.49), dec!(0.40), dec!(0.30)]);

        let ask_prices: Vec<_> = book.asks().iter().map(|l| l.price.value()).collect();
        assert_eq!(ask_prices, vec![dec!(0.52), dec!(0.55), dec!(0.60)]);

        assert_eq!(book.best_bid().unwrap().value(), dec!(0.49));
        assert_eq!(book.best_ask().unwrap().value(), dec!(0.52));
        assert_eq!(book.depth(), 3);
        assert_eq!(book.last_sequence(), 1);
        assert_eq!(book.book_hash(), "abc123");
    }

    #[test]
    fn test_snapshot_preserves_trade_and_tick() {
        let trade = TradeEvent {
            asset: asset(),
            timestamp: Timestamp::from_millis(5).unwrap(),
            sequence: 1,
            price: Price::parse("0.50").unwrap(),
            size: Quantity::parse("10").unwrap(),
            side: Side::Buy,
            fee_rate_bps: "0".to_string(),
        };
        let book = OrderBook::empty(asset())
            .apply_trade(&trade)
            .apply_snapshot(&snapshot(2));

        assert!(book.latest_trade().is_some());
        assert_eq!(book.tick_size().value(), dec!(0.01));
    }

    #[test]
    fn test_delta_removes_level() {
        let book = OrderBook::empty(asset())
            .apply_snapshot(&snapshot(1))
            .apply_delta(&delta(2, "0.40", "0", Side::Buy));

        let bid_prices: Vec<_> = book.bids().iter().map(|l| l.price.value()).collect();
        assert_eq!(bid_prices, vec![dec!(0.49), dec!(0.30)]);
        assert_eq!(book.best_bid().unwrap().value(), dec!(0.49));
        assert_eq!(book.last_sequence(), 2);
    }

    #[test]
    fn test_delta_removing_absent_level_is_noop() {
        let book = OrderBook::empty(asset())
            .apply_snapshot(&snapshot(1))
            .apply_delta(&delta(2, "0.45", "0", Side::Buy));
        assert_eq!(book.bids().len(), 3);
    }

    #[test]
    fn test_delta_updates_existing_level() {
        let book = OrderBook::empty(asset())
            .apply_snapshot(&snapshot(1))
            .apply_delta(&delta(2, "0.49", "99", Side::Buy));

        assert_eq!(book.bids()[0].size.value(), dec!(99));
        assert_eq!(book.bids().len(), 3);
    }

    #[test]
    fn test_delta_inserts_in_sorted_position() {
        let book = OrderBook::empty(asset())
            .apply_snapshot(&snapshot(1))
            .apply_delta(&delta(2, "0.45", "7", Side::Buy))
            .apply_delta(&delta(3, "0.53", "8", Side::Sell));

        let bid_prices: Vec<_> = book.bids().iter().map(|l| l.price.value()).collect();
        assert_eq!(
            bid_prices,
            vec![dec!(0.49), dec!(0.45), dec!(0.40), dec!(0.30)]
        );

        let ask_prices: Vec<_> = book.asks().iter().map(|l| l.price.value()).collect();
        assert_eq!(
            ask_prices,
            vec![dec!(0.52), dec!(0.53), dec!(0.55), dec!(0.60)]
        );
    }

    #[test]
    fn test_delta_insert_at_extremes() {
        let book = OrderBook::empty(asset())
            .apply_snapshot(&snapshot(1))
            .apply_delta(&delta(2, "0.50", "5", Side::Buy))
            .apply_delta(&delta(3, "0.20", "5", Side::Buy));

        assert_eq!(book.best_bid().unwrap().value(), dec!(0.50));
        assert_eq!(book.bids().last().unwrap().price.value(), dec!(0.20));
    }

    #[test]
    fn test_idempotent_delta_keeps_level_set() {
        let before = OrderBook::empty(asset()).apply_snapshot(&snapshot(1));
        let after = before.apply_delta(&delta(2, "0.49", "20", Side::Buy));
        assert_eq!(before.bids(), after.bids());
        assert_eq!(before.asks(), after.asks());
    }

    #[test]
    fn test_trade_leaves_levels_untouched() {
        let trade = TradeEvent {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_002_000).unwrap(),
            sequence: 2,
            price: Price::parse("0.50").unwrap(),
            size: Quantity::parse("10").unwrap(),
            side: Side::Buy,
            fee_rate_bps: "100".to_string(),
        };
        let book = OrderBook::empty(asset())
            .apply_snapshot(&snapshot(1))
            .apply_trade(&trade);

        assert_eq!(book.depth(), 3);
        assert_eq!(
            book.latest_trade().unwrap().price.value(),
            dec!(0.50)
        );
        let spread = book.spread().unwrap();
        assert_eq!(spread.best_bid.value(), dec!(0.49));
        assert_eq!(spread.best_ask.value(), dec!(0.52));
        assert_eq!(spread.value(), dec!(0.03));
        assert_eq!(book.midpoint().unwrap().value(), dec!(0.505));
    }

    #[test]
    fn test_tick_size_change() {
        let change = TickSizeChange {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_003_000).unwrap(),
            sequence: 2,
            old_tick_size: Price::parse("0.01").unwrap(),
            new_tick_size: Price::parse("0.001").unwrap(),
        };
        let book = OrderBook::empty(asset())
            .apply_snapshot(&snapshot(1))
            .apply_tick_size(&change);

        assert_eq!(book.tick_size().value(), dec!(0.001));
        assert_eq!(book.last_sequence(), 2);
        assert_eq!(book.depth(), 3);
    }

    #[test]
    fn test_variant_dispatch_matches_direct_apply() {
        let snap = snapshot(1);
        let direct = OrderBook::empty(asset()).apply_snapshot(&snap);
        let dispatched = OrderBook::empty(asset()).apply(&BookEvent::Snapshot(snap));
        assert_eq!(direct, dispatched);
    }

    #[test]
    fn test_no_zero_quantity_levels_survive() {
        let book = OrderBook::empty(asset())
            .apply_snapshot(&snapshot(1))
            .apply_delta(&delta(2, "0.49", "0", Side::Buy))
            .apply_delta(&delta(3, "0.52", "0", Side::Sell));

        assert!(book.bids().iter().all(|l| !l.size.is_zero()));
        assert!(book.asks().iter().all(|l| !l.size.is_zero()));
        assert_eq!(book.bids().len(), 2);
        assert_eq!(book.asks().len(), 2);
    }
}
