//! Arrow schemas for the columnar event log and snapshot files

use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;

fn base_event_fields() -> Vec<Field> {
    vec![
        Field::new("condition_id", DataType::Utf8, false),
        Field::new("token_id", DataType::Utf8, false),
        Field::new("timestamp_ms", DataType::Int64, false),
        Field::new("sequence_number", DataType::UInt64, false),
    ]
}

fn float_list() -> DataType {
    DataType::List(Arc::new(Field::new_list_field(DataType::Float64, true)))
}

fn utf8_list() -> DataType {
    DataType::List(Arc::new(Field::new_list_field(DataType::Utf8, true)))
}

fn uint8_list() -> DataType {
    DataType::List(Arc::new(Field::new_list_field(DataType::UInt8, true)))
}

/// Schema for `book_snapshot` event files
pub fn book_snapshot_schema() -> Schema {
    let mut fields = base_event_fields();
    fields.extend([
        Field::new("hash", DataType::Utf8, false),
        Field::new("bid_prices", float_list(), false),
        Field::new("bid_sizes", float_list(), false),
        Field::new("ask_prices", float_list(), false),
        Field::new("ask_sizes", float_list(), false),
    ]);
    Schema::new(fields)
}

/// Schema for `book_delta` event files; changes are stored as parallel lists
pub fn book_delta_schema() -> Schema {
    let mut fields = base_event_fields();
    fields.extend([
        Field::new("change_asset_ids", utf8_list(), false),
        Field::new("change_prices", float_list(), false),
        Field::new("change_new_sizes", float_list(), false),
        Field::new("change_sides", uint8_list(), false),
        Field::new("change_best_bids", float_list(), false),
        Field::new("change_best_asks", float_list(), false),
    ]);
    Schema::new(fields)
}

/// Schema for `trade_event` files
pub fn trade_event_schema() -> Schema {
    let mut fields = base_event_fields();
    fields.extend([
        Field::new("price", DataType::Float64, false),
        Field::new("size", DataType::Float64, false),
        Field::new("side", DataType::UInt8, false),
        Field::new("fee_rate_bps", DataType::Utf8, false),
    ]);
    Schema::new(fields)
}

/// Schema for `tick_size_change` files
pub fn tick_size_change_schema() -> Schema {
    let mut fields = base_event_fields();
    fields.extend([
        Field::new("old_tick_size", DataType::Float64, false),
        Field::new("new_tick_size", DataType::Float64, false),
    ]);
    Schema::new(fields)
}

/// Schema for single-row order-book snapshot files.
///
/// Trade columns carry zeros/empties and are ignored on read when
/// `has_trade` is false.
pub fn order_book_snapshot_schema() -> Schema {
    let mut fields = base_event_fields();
    fields.extend([
        Field::new("tick_size", DataType::Float64, false),
        Field::new("book_hash", DataType::Utf8, false),
        Field::new("bid_prices", float_list(), false),
        Field::new("bid_sizes", float_list(), false),
        Field::new("ask_prices", float_list(), false),
        Field::new("ask_sizes", float_list(), false),
        Field::new("trade_price", DataType::Float64, false),
        Field::new("trade_size", DataType::Float64, false),
        Field::new("trade_side", DataType::UInt8, false),
        Field::new("trade_fee_rate_bps", DataType::Utf8, false),
        Field::new("trade_timestamp_ms", DataType::Int64, false),
        Field::new("has_trade", DataType::Boolean, false),
    ]);
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_prefix_shared_by_event_schemas() {
        for schema in [
            book_snapshot_schema(),
            book_delta_schema(),
            trade_event_schema(),
            tick_size_change_schema(),
        ] {
            assert_eq!(schema.field(0).name(), "condition_id");
            assert_eq!(schema.field(1).name(), "token_id");
            assert_eq!(schema.field(2).name(), "timestamp_ms");
            assert_eq!(schema.field(3).name(), "sequence_number");
        }
    }

    #[test]
    fn test_field_counts() {
        assert_eq!(book_snapshot_schema().fields().len(), 9);
        assert_eq!(book_delta_schema().fields().len(), 10);
        assert_eq!(trade_event_schema().fields().len(), 8);
        assert_eq!(tick_size_change_schema().fields().len(), 6);
        assert_eq!(order_book_snapshot_schema().fields().len(), 16);
    }

    #[test]
    fn test_delta_change_columns_are_lists() {
        let schema = book_delta_schema();
        for name in [
            "change_asset_ids",
            "change_prices",
            "change_new_sizes",
            "change_sides",
            "change_best_bids",
            "change_best_asks",
        ] {
            let field = schema.field_with_name(name).unwrap();
            assert!(matches!(field.data_type(), DataType::List(_)), "{name}");
        }
    }
}
