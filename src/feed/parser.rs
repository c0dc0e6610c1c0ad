//! Wire parser for Polymarket CLOB market messages
//!
//! A message is a JSON array of event objects or a lone object. Each
//! object carries an `event_type` discriminator; objects without one, or
//! with an unrecognized one, are skipped. One bad field anywhere fails
//! the whole message.

use crate::domain::{
    BookDelta, BookEvent, BookSnapshot, MarketAsset, Price, PriceLevel, PriceLevelDelta, Quantity,
    TickSizeChange, Timestamp, TradeEvent,
};
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

fn default_fee() -> String {
    "0".to_string()
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    price: String,
    size: String,
}

#[derive(Debug, Deserialize)]
struct RawBook {
    market: String,
    asset_id: String,
    timestamp: String,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    bids: Vec<RawLevel>,
    #[serde(default)]
    asks: Vec<RawLevel>,
}

#[derive(Debug, Deserialize)]
struct RawPriceChange {
    asset_id: String,
    price: String,
    size: String,
    side: String,
    best_bid: String,
    best_ask: String,
}

#[derive(Debug, Deserialize)]
struct RawPriceChangeMessage {
    market: String,
    timestamp: String,
    price_changes: Vec<RawPriceChange>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    market: String,
    asset_id: String,
    timestamp: String,
    price: String,
    size: String,
    side: String,
    #[serde(default = "default_fee")]
    fee_rate_bps: String,
}

#[derive(Debug, Deserialize)]
struct RawTickSizeChange {
    market: String,
    asset_id: String,
    timestamp: String,
    old_tick_size: String,
    new_tick_size: String,
}

/// Parse one wire message into typed events.
///
/// A `price_change` message fans out into one `BookDelta` per distinct
/// inner `asset_id`. Parsed events always carry `sequence == 0`.
pub fn parse_message(text: &str) -> Result<Vec<BookEvent>> {
    let value: Value = serde_json::from_str(text)?;

    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut events = Vec::new();
    for item in items {
        let Some(event_type) = item.get("event_type").and_then(Value::as_str) else {
            continue;
        };

        match event_type {
            "book" => events.push(parse_book(item)?),
            "price_change" => events.extend(parse_price_change(item)?),
            "last_trade_price" => events.push(parse_trade(item)?),
            "tick_size_change" => events.push(parse_tick_size_change(item)?),
            other => {
                tracing::trace!(event_type = other, "Skipping unknown event type");
            }
        }
    }

    Ok(events)
}

fn parse_levels(raw: Vec<RawLevel>) -> Result<Vec<PriceLevel>> {
    raw.into_iter()
        .map(|level| PriceLevel::from_strings(&level.price, &level.size))
        .collect()
}

fn parse_book(item: Value) -> Result<BookEvent> {
    let raw: RawBook = serde_json::from_value(item)?;
    Ok(BookEvent::Snapshot(BookSnapshot {
        asset: MarketAsset::new(raw.market, raw.asset_id)?,
        timestamp: Timestamp::parse(&raw.timestamp)?,
        sequence: 0,
        bids: parse_levels(raw.bids)?,
        asks: parse_levels(raw.asks)?,
        hash: raw.hash,
    }))
}

fn parse_price_change(item: Value) -> Result<Vec<BookEvent>> {
    let raw: RawPriceChangeMessage = serde_json::from_value(item)?;
    let timestamp = Timestamp::parse(&raw.timestamp)?;

    // One delta per distinct asset; BTreeMap keeps the fan-out order stable
    let mut by_asset: BTreeMap<String, Vec<PriceLevelDelta>> = BTreeMap::new();
    for change in raw.price_changes {
        let delta = PriceLevelDelta {
            asset_id: change.asset_id.clone(),
            price: Price::parse(&change.price)?,
            new_size: Quantity::parse(&change.size)?,
            side: change.side.parse()?,
            best_bid: Price::parse(&change.best_bid)?,
            best_ask: Price::parse(&change.best_ask)?,
        };
        by_asset.entry(change.asset_id).or_default().push(delta);
    }

    by_asset
        .into_iter()
        .map(|(asset_id, changes)| {
            Ok(BookEvent::Delta(BookDelta {
                asset: MarketAsset::new(raw.market.clone(), asset_id)?,
                timestamp,
                sequence: 0,
                changes,
            }))
        })
        .collect()
}

fn parse_trade(item: Value) -> Result<BookEvent> {
    let raw: RawTrade = serde_json::from_value(item)?;
    Ok(BookEvent::Trade(TradeEvent {
        asset: MarketAsset::new(raw.market, raw.asset_id)?,
        timestamp: Timestamp::parse(&raw.timestamp)?,
        sequence: 0,
        price: Price::parse(&raw.price)?,
        size: Quantity::parse(&raw.size)?,
        side: raw.side.parse()?,
        fee_rate_bps: raw.fee_rate_bps,
    }))
}

fn parse_tick_size_change(item: Value) -> Result<BookEvent> {
    let raw: RawTickSizeChange = serde_json::from_value(item)?;
    Ok(BookEvent::TickSize(TickSizeChange {
        asset: MarketAsset::new(raw.market, raw.asset_id)?,
        timestamp: Timestamp::parse(&raw.timestamp)?,
        sequence: 0,
        old_tick_size: Price::parse(&raw.old_tick_size)?,
        new_tick_size: Price::parse(&raw.new_tick_size)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_book_message() {
        let json = r#"{
            "event_type": "book",
            "market": "0xbd31dc",
            "asset_id": "6581861",
            "timestamp": "1704067200000",
            "hash": "abc123",
            "bids": [{"price": "0.30", "size": "10"}, {"price": "0.49", "size": "20"}],
            "asks": [{"price": "0.60", "size": "10"}]
        }"#;

        let events = parse_message(json).unwrap();
        assert_eq!(events.len(), 1);

        let BookEvent::Snapshot(snap) = &events[0] else {
            panic!("expected snapshot");
        };
        assert_eq!(snap.asset.condition_id(), "0xbd31dc");
        assert_eq!(snap.asset.token_id(), "6581861");
        assert_eq!(snap.sequence, 0);
        assert_eq!(snap.bids.len(), 2);
        assert_eq!(snap.asks.len(), 1);
        assert_eq!(snap.hash, "abc123");
    }

    #[test]
    fn test_parse_array_wrapping() {
        let json = r#"[{
            "event_type": "last_trade_price",
            "market": "0xbd31dc",
            "asset_id": "6581861",
            "timestamp": "1704067200000",
            "price": "0.50",
            "size": "10",
            "side": "BUY"
        }]"#;

        let events = parse_message(json).unwrap();
        assert_eq!(events.len(), 1);
        let BookEvent::Trade(trade) = &events[0] else {
            panic!("expected trade");
        };
        assert_eq!(trade.price.value(), dec!(0.50));
        assert_eq!(trade.side, Side::Buy);
        assert_eq!(trade.fee_rate_bps, "0");
    }

    #[test]
    fn test_price_change_fan_out() {
        let json = r#"{
            "event_type": "price_change",
            "market": "0xbd31dc",
            "timestamp": "1704067200000",
            "price_changes": [
                {"asset_id": "111", "price": "0.40", "size": "5", "side": "BUY",
                 "best_bid": "0.40", "best_ask": "0.42"},
                {"asset_id": "222", "price": "0.58", "size": "7", "side": "SELL",
                 "best_bid": "0.56", "best_ask": "0.58"}
            ]
        }"#;

        let events = parse_message(json).unwrap();
        assert_eq!(events.len(), 2);

        for event in &events {
            let BookEvent::Delta(delta) = event else {
                panic!("expected delta");
            };
            assert_eq!(delta.asset.condition_id(), "0xbd31dc");
            assert_eq!(delta.timestamp.millis(), 1704067200000);
            assert_eq!(delta.changes.len(), 1);
        }

        let token_ids: Vec<_> = events.iter().map(|e| e.asset().token_id()).collect();
        assert_eq!(token_ids, vec!["111", "222"]);
    }

    #[test]
    fn test_price_change_groups_same_asset() {
        let json = r#"{
            "event_type": "price_change",
            "market": "0xbd31dc",
            "timestamp": "1704067200000",
            "price_changes": [
                {"asset_id": "111", "price": "0.40", "size": "5", "side": "BUY",
                 "best_bid": "0.40", "best_ask": "0.42"},
                {"asset_id": "111", "price": "0.41", "size": "6", "side": "BUY",
                 "best_bid": "0.41", "best_ask": "0.42"}
            ]
        }"#;

        let events = parse_message(json).unwrap();
        assert_eq!(events.len(), 1);
        let BookEvent::Delta(delta) = &events[0] else {
            panic!("expected delta");
        };
        assert_eq!(delta.changes.len(), 2);
    }

    #[test]
    fn test_parse_tick_size_change() {
        let json = r#"{
            "event_type": "tick_size_change",
            "market": "0xbd31dc",
            "asset_id": "6581861",
            "timestamp": "1704067200000",
            "old_tick_size": "0.01",
            "new_tick_size": "0.001"
        }"#;

        let events = parse_message(json).unwrap();
        let BookEvent::TickSize(tick) = &events[0] else {
            panic!("expected tick size change");
        };
        assert_eq!(tick.new_tick_size.value(), dec!(0.001));
    }

    #[test]
    fn test_unknown_event_type_skipped() {
        let json = r#"[
            {"event_type": "heartbeat"},
            {"no_event_type": true},
            {"event_type": "last_trade_price", "market": "0xbd31dc",
             "asset_id": "6581861", "timestamp": "1", "price": "0.5",
             "size": "1", "side": "SELL"}
        ]"#;

        let events = parse_message(json).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], BookEvent::Trade(_)));
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(matches!(parse_message("{not json"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_bad_field_fails_whole_parse() {
        let json = r#"[
            {"event_type": "book", "market": "0xbd31dc", "asset_id": "6581861",
             "timestamp": "1704067200000",
             "bids": [{"price": "0.30", "size": "10"}], "asks": []},
            {"event_type": "book", "market": "0xbd31dc", "asset_id": "6581861",
             "timestamp": "1704067200000",
             "bids": [{"price": "1.30", "size": "10"}], "asks": []}
        ]"#;

        assert!(matches!(
            parse_message(json),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_invalid_side_fails() {
        let json = r#"{
            "event_type": "last_trade_price", "market": "0xbd31dc",
            "asset_id": "6581861", "timestamp": "1", "price": "0.5",
            "size": "1", "side": "buy"
        }"#;

        assert!(matches!(parse_message(json), Err(Error::InvalidEnum(_))));
    }

    #[test]
    fn test_missing_hash_defaults_empty() {
        let json = r#"{
            "event_type": "book", "market": "0xbd31dc", "asset_id": "6581861",
            "timestamp": "1704067200000", "bids": [], "asks": []
        }"#;

        let events = parse_message(json).unwrap();
        let BookEvent::Snapshot(snap) = &events[0] else {
            panic!("expected snapshot");
        };
        assert!(snap.hash.is_empty());
    }
}
