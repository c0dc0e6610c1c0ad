//! RecordBatch encoding and decoding for events and book snapshots

use super::schema;
use crate::domain::{
    BookDelta, BookEvent, BookSnapshot, EventType, MarketAsset, OrderBook, Price, PriceLevel,
    PriceLevelDelta, Quantity, Side, TickSizeChange, Timestamp, TradeEvent,
};
use crate::error::{Error, Result};
use arrow::array::{
    Array, ArrayRef, BooleanArray, BooleanBuilder, Float64Array, Float64Builder, Int64Array,
    Int64Builder, ListArray, ListBuilder, StringArray, StringBuilder, UInt64Array, UInt64Builder,
    UInt8Array, UInt8Builder,
};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Shared builders for the base column prefix
#[derive(Default)]
struct BaseBuilders {
    condition_ids: StringBuilder,
    token_ids: StringBuilder,
    timestamps: Int64Builder,
    sequences: UInt64Builder,
}

impl BaseBuilders {
    fn append(&mut self, asset: &MarketAsset, timestamp: Timestamp, sequence: u64) {
        self.condition_ids.append_value(asset.condition_id());
        self.token_ids.append_value(asset.token_id());
        self.timestamps.append_value(timestamp.millis());
        self.sequences.append_value(sequence);
    }

    fn finish(mut self) -> Vec<ArrayRef> {
        vec![
            Arc::new(self.condition_ids.finish()),
            Arc::new(self.token_ids.finish()),
            Arc::new(self.timestamps.finish()),
            Arc::new(self.sequences.finish()),
        ]
    }
}

/// Encode one per-type buffer into a RecordBatch
pub fn encode_events(event_type: EventType, events: &[BookEvent]) -> Result<RecordBatch> {
    match event_type {
        EventType::BookSnapshot => encode_book_snapshots(events),
        EventType::BookDelta => encode_book_deltas(events),
        EventType::TradeEvent => encode_trade_events(events),
        EventType::TickSizeChange => encode_tick_size_changes(events),
    }
}

fn encode_book_snapshots(events: &[BookEvent]) -> Result<RecordBatch> {
    let mut base = BaseBuilders::default();
    let mut hashes = StringBuilder::new();
    let mut bid_prices = ListBuilder::new(Float64Builder::new());
    let mut bid_sizes = ListBuilder::new(Float64Builder::new());
    let mut ask_prices = ListBuilder::new(Float64Builder::new());
    let mut ask_sizes = ListBuilder::new(Float64Builder::new());

    for event in events {
        let BookEvent::Snapshot(snap) = event else {
            continue;
        };
        base.append(&snap.asset, snap.timestamp, snap.sequence);
        hashes.append_value(&snap.hash);

        for bid in &snap.bids {
            bid_prices.values().append_value(bid.price.to_f64());
            bid_sizes.values().append_value(bid.size.to_f64());
        }
        bid_prices.append(true);
        bid_sizes.append(true);

        for ask in &snap.asks {
            ask_prices.values().append_value(ask.price.to_f64());
            ask_sizes.values().append_value(ask.size.to_f64());
        }
        ask_prices.append(true);
        ask_sizes.append(true);
    }

    let mut columns = base.finish();
    columns.extend([
        Arc::new(hashes.finish()) as ArrayRef,
        Arc::new(bid_prices.finish()),
        Arc::new(bid_sizes.finish()),
        Arc::new(ask_prices.finish()),
        Arc::new(ask_sizes.finish()),
    ]);

    Ok(RecordBatch::try_new(
        Arc::new(schema::book_snapshot_schema()),
        columns,
    )?)
}

fn encode_book_deltas(events: &[BookEvent]) -> Result<RecordBatch> {
    let mut base = BaseBuilders::default();
    let mut asset_ids = ListBuilder::new(StringBuilder::new());
    let mut prices = ListBuilder::new(Float64Builder::new());
    let mut new_sizes = ListBuilder::new(Float64Builder::new());
    let mut sides = ListBuilder::new(UInt8Builder::new());
    let mut best_bids = ListBuilder::new(Float64Builder::new());
    let mut best_asks = ListBuilder::new(Float64Builder::new());

    for event in events {
        let BookEvent::Delta(delta) = event else {
            continue;
        };
        base.append(&delta.asset, delta.timestamp, delta.sequence);

        for change in &delta.changes {
            asset_ids.values().append_value(&change.asset_id);
            prices.values().append_value(change.price.to_f64());
            new_sizes.values().append_value(change.new_size.to_f64());
            sides.values().append_value(change.side.as_u8());
            best_bids.values().append_value(change.best_bid.to_f64());
            best_asks.values().append_value(change.best_ask.to_f64());
        }
        asset_ids.append(true);
        prices.append(true);
        new_sizes.append(true);
        sides.append(true);
        best_bids.append(true);
        best_asks.append(true);
    }

    let mut columns = base.finish();
    columns.extend([
        Arc::new(asset_ids.finish()) as ArrayRef,
        Arc::new(prices.finish()),
        Arc::new(new_sizes.finish()),
        Arc::new(sides.finish()),
        Arc::new(best_bids.finish()),
        Arc::new(best_asks.finish()),
    ]);

    Ok(RecordBatch::try_new(
        Arc::new(schema::book_delta_schema()),
        columns,
    )?)
}

fn encode_trade_events(events: &[BookEvent]) -> Result<RecordBatch> {
    let mut base = BaseBuilders::default();
    let mut prices = Float64Builder::new();
    let mut sizes = Float64Builder::new();
    let mut sides = UInt8Builder::new();
    let mut fees = StringBuilder::new();

    for event in events {
        let BookEvent::Trade(trade) = event else {
            continue;
        };
        base.append(&trade.asset, trade.timestamp, trade.sequence);
        prices.append_value(trade.price.to_f64());
        sizes.append_value(trade.size.to_f64());
        sides.append_value(trade.side.as_u8());
        fees.append_value(&trade.fee_rate_bps);
    }

    let mut columns = base.finish();
    columns.extend([
        Arc::new(prices.finish()) as ArrayRef,
        Arc::new(sizes.finish()),
        Arc::new(sides.finish()),
        Arc::new(fees.finish()),
    ]);

    Ok(RecordBatch::try_new(
        Arc::new(schema::trade_event_schema()),
        columns,
    )?)
}

fn encode_tick_size_changes(events: &[BookEvent]) -> Result<RecordBatch> {
    let mut base = BaseBuilders::default();
    let mut old_ticks = Float64Builder::new();
    let mut new_ticks = Float64Builder::new();

    for event in events {
        let BookEvent::TickSize(tick) = event else {
            continue;
        };
        base.append(&tick.asset, tick.timestamp, tick.sequence);
        old_ticks.append_value(tick.old_tick_size.to_f64());
        new_ticks.append_value(tick.new_tick_size.to_f64());
    }

    let mut columns = base.finish();
    columns.extend([
        Arc::new(old_ticks.finish()) as ArrayRef,
        Arc::new(new_ticks.finish()),
    ]);

    Ok(RecordBatch::try_new(
        Arc::new(schema::tick_size_change_schema()),
        columns,
    )?)
}

// --- Decoding ---

fn string_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a StringArray> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::Storage(format!("column {idx} is not utf8")))
}

fn int64_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a Int64Array> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| Error::Storage(format!("column {idx} is not int64")))
}

fn uint64_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a UInt64Array> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<UInt64Array>()
        .ok_or_else(|| Error::Storage(format!("column {idx} is not uint64")))
}

fn float64_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a Float64Array> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::Storage(format!("column {idx} is not float64")))
}

fn uint8_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a UInt8Array> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<UInt8Array>()
        .ok_or_else(|| Error::Storage(format!("column {idx} is not uint8")))
}

fn bool_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a BooleanArray> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| Error::Storage(format!("column {idx} is not boolean")))
}

fn list_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a ListArray> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<ListArray>()
        .ok_or_else(|| Error::Storage(format!("column {idx} is not a list")))
}

fn float_list_row(list: &ListArray, row: usize) -> Result<Vec<f64>> {
    let values = list.value(row);
    let floats = values
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::Storage("list items are not float64".into()))?;
    Ok(floats.values().to_vec())
}

fn string_list_row(list: &ListArray, row: usize) -> Result<Vec<String>> {
    let values = list.value(row);
    let strings = values
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::Storage("list items are not utf8".into()))?;
    Ok((0..strings.len()).map(|i| strings.value(i).to_string()).collect())
}

fn uint8_list_row(list: &ListArray, row: usize) -> Result<Vec<u8>> {
    let values = list.value(row);
    let bytes = values
        .as_any()
        .downcast_ref::<UInt8Array>()
        .ok_or_else(|| Error::Storage("list items are not uint8".into()))?;
    Ok(bytes.values().to_vec())
}

fn levels_from_lists(prices: &[f64], sizes: &[f64]) -> Result<Vec<PriceLevel>> {
    prices
        .iter()
        .zip(sizes.iter())
        .map(|(&price, &size)| {
            Ok(PriceLevel::new(
                Price::from_f64(price)?,
                Quantity::from_f64(size)?,
            ))
        })
        .collect()
}

/// Decode every row matching `asset` with sequence greater than
/// `min_sequence` back into events
pub fn decode_events(
    event_type: EventType,
    batch: &RecordBatch,
    asset: &MarketAsset,
    min_sequence: u64,
) -> Result<Vec<BookEvent>> {
    let condition_ids = string_col(batch, 0)?;
    let token_ids = string_col(batch, 1)?;
    let timestamps = int64_col(batch, 2)?;
    let sequences = uint64_col(batch, 3)?;

    let mut events = Vec::new();

    for row in 0..batch.num_rows() {
        let sequence = sequences.value(row);
        if sequence <= min_sequence {
            continue;
        }
        if token_ids.value(row) != asset.token_id()
            || condition_ids.value(row) != asset.condition_id()
        {
            continue;
        }

        let timestamp = Timestamp::from_millis(timestamps.value(row))?;
        let event = match event_type {
            EventType::BookSnapshot => {
                let bids = levels_from_lists(
                    &float_list_row(list_col(batch, 5)?, row)?,
                    &float_list_row(list_col(batch, 6)?, row)?,
                )?;
                let asks = levels_from_lists(
                    &float_list_row(list_col(batch, 7)?, row)?,
                    &float_list_row(list_col(batch, 8)?, row)?,
                )?;
                BookEvent::Snapshot(BookSnapshot {
                    asset: asset.clone(),
                    timestamp,
                    sequence,
                    bids,
                    asks,
                    hash: string_col(batch, 4)?.value(row).to_string(),
                })
            }
            EventType::BookDelta => {
                let asset_ids = string_list_row(list_col(batch, 4)?, row)?;
                let prices = float_list_row(list_col(batch, 5)?, row)?;
                let new_sizes = float_list_row(list_col(batch, 6)?, row)?;
                let sides = uint8_list_row(list_col(batch, 7)?, row)?;
                let best_bids = float_list_row(list_col(batch, 8)?, row)?;
                let best_asks = float_list_row(list_col(batch, 9)?, row)?;

                let mut changes = Vec::with_capacity(asset_ids.len());
                for i in 0..asset_ids.len() {
                    changes.push(PriceLevelDelta {
                        asset_id: asset_ids[i].clone(),
                        price: Price::from_f64(prices[i])?,
                        new_size: Quantity::from_f64(new_sizes[i])?,
                        side: Side::from_u8(sides[i])?,
                        best_bid: Price::from_f64(best_bids[i])?,
                        best_ask: Price::from_f64(best_asks[i])?,
                    });
                }
                BookEvent::Delta(BookDelta {
                    asset: asset.clone(),
                    timestamp,
                    sequence,
                    changes,
                })
            }
            EventType::TradeEvent => BookEvent::Trade(TradeEvent {
                asset: asset.clone(),
                timestamp,
                sequence,
                price: Price::from_f64(float64_col(batch, 4)?.value(row))?,
                size: Quantity::from_f64(float64_col(batch, 5)?.value(row))?,
                side: Side::from_u8(uint8_col(batch, 6)?.value(row))?,
                fee_rate_bps: string_col(batch, 7)?.value(row).to_string(),
            }),
            EventType::TickSizeChange => BookEvent::TickSize(TickSizeChange {
                asset: asset.clone(),
                timestamp,
                sequence,
                old_tick_size: Price::from_f64(float64_col(batch, 4)?.value(row))?,
                new_tick_size: Price::from_f64(float64_col(batch, 5)?.value(row))?,
            }),
        };
        events.push(event);
    }

    Ok(events)
}

/// Encode a live book as a single-row snapshot table
pub fn encode_order_book(book: &OrderBook) -> Result<RecordBatch> {
    let mut base = BaseBuilders::default();
    base.append(book.asset(), book.timestamp(), book.last_sequence());

    let mut tick_sizes = Float64Builder::new();
    tick_sizes.append_value(book.tick_size().to_f64());
    let mut hashes = StringBuilder::new();
    hashes.append_value(book.book_hash());

    let mut bid_prices = ListBuilder::new(Float64Builder::new());
    let mut bid_sizes = ListBuilder::new(Float64Builder::new());
    for bid in book.bids() {
        bid_prices.values().append_value(bid.price.to_f64());
        bid_sizes.values().append_value(bid.size.to_f64());
    }
    bid_prices.append(true);
    bid_sizes.append(true);

    let mut ask_prices = ListBuilder::new(Float64Builder::new());
    let mut ask_sizes = ListBuilder::new(Float64Builder::new());
    for ask in book.asks() {
        ask_prices.values().append_value(ask.price.to_f64());
        ask_sizes.values().append_value(ask.size.to_f64());
    }
    ask_prices.append(true);
    ask_sizes.append(true);

    let mut trade_prices = Float64Builder::new();
    let mut trade_sizes = Float64Builder::new();
    let mut trade_sides = UInt8Builder::new();
    let mut trade_fees = StringBuilder::new();
    let mut trade_timestamps = Int64Builder::new();
    let mut has_trades = BooleanBuilder::new();

    match book.latest_trade() {
        Some(trade) => {
            trade_prices.append_value(trade.price.to_f64());
            trade_sizes.append_value(trade.size.to_f64());
            trade_sides.append_value(trade.side.as_u8());
            trade_fees.append_value(&trade.fee_rate_bps);
            trade_timestamps.append_value(trade.timestamp.millis());
            has_trades.append_value(true);
        }
        None => {
            trade_prices.append_value(0.0);
            trade_sizes.append_value(0.0);
            trade_sides.append_value(0);
            trade_fees.append_value("");
            trade_timestamps.append_value(0);
            has_trades.append_value(false);
        }
    }

    let mut columns = base.finish();
    columns.extend([
        Arc::new(tick_sizes.finish()) as ArrayRef,
        Arc::new(hashes.finish()),
        Arc::new(bid_prices.finish()),
        Arc::new(bid_sizes.finish()),
        Arc::new(ask_prices.finish()),
        Arc::new(ask_sizes.finish()),
        Arc::new(trade_prices.finish()),
        Arc::new(trade_sizes.finish()),
        Arc::new(trade_sides.finish()),
        Arc::new(trade_fees.finish()),
        Arc::new(trade_timestamps.finish()),
        Arc::new(has_trades.finish()),
    ]);

    Ok(RecordBatch::try_new(
        Arc::new(schema::order_book_snapshot_schema()),
        columns,
    )?)
}

/// Rebuild a book from the single snapshot row.
///
/// The book is reconstructed by replaying synthetic events over an empty
/// book: the level snapshot, then a tick-size change when the stored tick
/// differs from the default, then the latest trade when present.
pub fn decode_order_book(batch: &RecordBatch) -> Result<Option<OrderBook>> {
    if batch.num_rows() == 0 {
        return Ok(None);
    }

    let condition_id = string_col(batch, 0)?.value(0).to_string();
    let token_id = string_col(batch, 1)?.value(0).to_string();
    let asset = MarketAsset::new(condition_id, token_id)?;
    let timestamp = Timestamp::from_millis(int64_col(batch, 2)?.value(0))?;
    let sequence = uint64_col(batch, 3)?.value(0);

    let bids = levels_from_lists(
        &float_list_row(list_col(batch, 6)?, 0)?,
        &float_list_row(list_col(batch, 7)?, 0)?,
    )?;
    let asks = levels_from_lists(
        &float_list_row(list_col(batch, 8)?, 0)?,
        &float_list_row(list_col(batch, 9)?, 0)?,
    )?;

    let snapshot = BookSnapshot {
        asset: asset.clone(),
        timestamp,
        sequence,
        bids,
        asks,
        hash: string_col(batch, 5)?.value(0).to_string(),
    };
    let mut book = OrderBook::empty(asset.clone()).apply_snapshot(&snapshot);

    let tick_size = Price::from_f64(float64_col(batch, 4)?.value(0))?;
    if tick_size != Price::default_tick() {
        book = book.apply_tick_size(&TickSizeChange {
            asset: asset.clone(),
            timestamp,
            sequence,
            old_tick_size: Price::default_tick(),
            new_tick_size: tick_size,
        });
    }

    if bool_col(batch, 15)?.value(0) {
        book = book.apply_trade(&TradeEvent {
            asset,
            timestamp: Timestamp::from_millis(int64_col(batch, 14)?.value(0))?,
            sequence,
            price: Price::from_f64(float64_col(batch, 10)?.value(0))?,
            size: Quantity::from_f64(float64_col(batch, 11)?.value(0))?,
            side: Side::from_u8(uint8_col(batch, 12)?.value(0))?,
            fee_rate_bps: string_col(batch, 13)?.value(0).to_string(),
        });
    }

    Ok(Some(book))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn asset() -> MarketAsset {
        MarketAsset::new("0xbd31dc", "6581861").unwrap()
    }

    fn snapshot_event(sequence: u64) -> BookEvent {
        BookEvent::Snapshot(BookSnapshot {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_000_000).unwrap(),
            sequence,
            bids: vec![PriceLevel::from_strings("0.49", "20").unwrap()],
            asks: vec![PriceLevel::from_strings("0.52", "25").unwrap()],
            hash: "h1".to_string(),
        })
    }

    fn delta_event(sequence: u64) -> BookEvent {
        BookEvent::Delta(BookDelta {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_001_000).unwrap(),
            sequence,
            changes: vec![PriceLevelDelta {
                asset_id: "6581861".to_string(),
                price: Price::parse("0.40").unwrap(),
                new_size: Quantity::zero(),
                side: Side::Buy,
                best_bid: Price::parse("0.49").unwrap(),
                best_ask: Price::parse("0.52").unwrap(),
            }],
        })
    }

    #[test]
    fn test_snapshot_event_round_trip() {
        let original = snapshot_event(3);
        let batch = encode_events(EventType::BookSnapshot, &[original.clone()]).unwrap();
        assert_eq!(batch.num_rows(), 1);

        let decoded = decode_events(EventType::BookSnapshot, &batch, &asset(), 0).unwrap();
        assert_eq!(decoded, vec![original]);
    }

    #[test]
    fn test_delta_event_round_trip() {
        let original = delta_event(4);
        let batch = encode_events(EventType::BookDelta, &[original.clone()]).unwrap();
        let decoded = decode_events(EventType::BookDelta, &batch, &asset(), 0).unwrap();
        assert_eq!(decoded, vec![original]);
    }

    #[test]
    fn test_trade_event_round_trip() {
        let original = BookEvent::Trade(TradeEvent {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_002_000).unwrap(),
            sequence: 5,
            price: Price::parse("0.50").unwrap(),
            size: Quantity::parse("10").unwrap(),
            side: Side::Sell,
            fee_rate_bps: "200".to_string(),
        });
        let batch = encode_events(EventType::TradeEvent, &[original.clone()]).unwrap();
        let decoded = decode_events(EventType::TradeEvent, &batch, &asset(), 0).unwrap();
        assert_eq!(decoded, vec![original]);
    }

    #[test]
    fn test_tick_size_event_round_trip() {
        let original = BookEvent::TickSize(TickSizeChange {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_003_000).unwrap(),
            sequence: 6,
            old_tick_size: Price::parse("0.01").unwrap(),
            new_tick_size: Price::parse("0.001").unwrap(),
        });
        let batch = encode_events(EventType::TickSizeChange, &[original.clone()]).unwrap();
        let decoded = decode_events(EventType::TickSizeChange, &batch, &asset(), 0).unwrap();
        assert_eq!(decoded, vec![original]);
    }

    #[test]
    fn test_decode_filters_by_sequence_and_asset() {
        let events = vec![snapshot_event(1), snapshot_event(2), snapshot_event(3)];
        let batch = encode_events(EventType::BookSnapshot, &events).unwrap();

        let decoded = decode_events(EventType::BookSnapshot, &batch, &asset(), 2).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].sequence(), 3);

        let other = MarketAsset::new("0xother", "999").unwrap();
        let none = decode_events(EventType::BookSnapshot, &batch, &other, 0).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_order_book_round_trip_with_trade() {
        let trade = TradeEvent {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_004_000).unwrap(),
            sequence: 2,
            price: Price::parse("0.50").unwrap(),
            size: Quantity::parse("10").unwrap(),
            side: Side::Buy,
            fee_rate_bps: "0".to_string(),
        };
        let BookEvent::Snapshot(snap) = snapshot_event(1) else {
            unreachable!()
        };
        let book = OrderBook::empty(asset()).apply_snapshot(&snap).apply_trade(&trade);

        let batch = encode_order_book(&book).unwrap();
        let restored = decode_order_book(&batch).unwrap().unwrap();

        assert_eq!(restored.bids(), book.bids());
        assert_eq!(restored.asks(), book.asks());
        assert_eq!(restored.tick_size(), book.tick_size());
        assert_eq!(restored.book_hash(), book.book_hash());
        assert_eq!(restored.last_sequence(), book.last_sequence());
        let restored_trade = restored.latest_trade().unwrap();
        assert_eq!(restored_trade.price.value(), dec!(0.50));
        assert_eq!(restored_trade.fee_rate_bps, "0");
    }

    #[test]
    fn test_order_book_round_trip_without_trade() {
        let BookEvent::Snapshot(snap) = snapshot_event(1) else {
            unreachable!()
        };
        let book = OrderBook::empty(asset()).apply_snapshot(&snap);

        let batch = encode_order_book(&book).unwrap();
        let restored = decode_order_book(&batch).unwrap().unwrap();
        assert!(restored.latest_trade().is_none());
        assert_eq!(restored.bids(), book.bids());
    }

    #[test]
    fn test_order_book_round_trip_custom_tick() {
        let BookEvent::Snapshot(snap) = snapshot_event(1) else {
            unreachable!()
        };
        let book = OrderBook::empty(asset()).apply_snapshot(&snap);
        let book = book.apply_tick_size(&TickSizeChange {
            asset: asset(),
            timestamp: Timestamp::from_millis(1_700_000_005_000).unwrap(),
            sequence: 2,
            old_tick_size: Price::parse("0.01").unwrap(),
            new_tick_size: Price::parse("0.001").unwrap(),
        });

        let batch = encode_order_book(&book).unwrap();
        let restored = decode_order_book(&batch).unwrap().unwrap();
        assert_eq!(restored.tick_size().value(), dec!(0.001));
    }
}
