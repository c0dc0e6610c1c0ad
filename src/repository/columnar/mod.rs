//! Columnar event repository
//!
//! Events are buffered per type and flushed into parquet files partitioned
//! by event type, token prefix, and UTC date. The sequence span of each
//! file is encoded in its name so reads can skip files without opening
//! them. Snapshots live as one single-row file per asset.

mod codec;
mod schema;

use super::OrderBookRepository;
use crate::domain::{BookEvent, EventType, MarketAsset, OrderBook};
use crate::error::{Error, Result};
use crate::storage::FileStore;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Maximum time buffered events wait before being flushed
const FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// First 8 characters of the token id, used as the partition directory
fn token_prefix(token_id: &str) -> String {
    token_id.chars().take(8).collect()
}

/// First 16 characters of the token id, used as the snapshot file name
fn token_hash(token_id: &str) -> String {
    token_id.chars().take(16).collect()
}

fn events_dir(event_type: EventType, token_id: &str) -> String {
    format!("events/{}/{}", event_type.as_str(), token_prefix(token_id))
}

fn snapshot_path(token_id: &str) -> String {
    format!("snapshots/{}.parquet", token_hash(token_id))
}

/// Pull the trailing `<seqEnd>` out of a partition file name.
///
/// File names look like `book_delta_13_17_42.parquet`; anything that does
/// not match yields `None` and the file is read instead of pruned.
fn parse_seq_end(path: &str) -> Option<u64> {
    let stem = path.rsplit('/').next()?.strip_suffix(".parquet")?;
    stem.rsplit('_').next()?.parse().ok()
}

struct Buffers {
    snapshots: Vec<BookEvent>,
    deltas: Vec<BookEvent>,
    trades: Vec<BookEvent>,
    tick_sizes: Vec<BookEvent>,
    min_sequence: u64,
    max_sequence: u64,
    last_flush: Instant,
}

impl Buffers {
    fn new() -> Self {
        Self {
            snapshots: Vec::new(),
            deltas: Vec::new(),
            trades: Vec::new(),
            tick_sizes: Vec::new(),
            min_sequence: 0,
            max_sequence: 0,
            last_flush: Instant::now(),
        }
    }

    fn buffer(&mut self, event_type: EventType) -> &mut Vec<BookEvent> {
        match event_type {
            EventType::BookSnapshot => &mut self.snapshots,
            EventType::BookDelta => &mut self.deltas,
            EventType::TradeEvent => &mut self.trades,
            EventType::TickSizeChange => &mut self.tick_sizes,
        }
    }

    fn buffer_ref(&self, event_type: EventType) -> &Vec<BookEvent> {
        match event_type {
            EventType::BookSnapshot => &self.snapshots,
            EventType::BookDelta => &self.deltas,
            EventType::TradeEvent => &self.trades,
            EventType::TickSizeChange => &self.tick_sizes,
        }
    }

    fn total(&self) -> usize {
        self.snapshots.len() + self.deltas.len() + self.trades.len() + self.tick_sizes.len()
    }

    fn recompute_sequence_span(&mut self) {
        let mut min = u64::MAX;
        let mut max = 0u64;
        for event_type in EventType::ALL {
            for event in self.buffer_ref(event_type) {
                min = min.min(event.sequence());
                max = max.max(event.sequence());
            }
        }
        self.min_sequence = if max == 0 { 0 } else { min };
        self.max_sequence = max;
    }
}

/// Parquet-backed repository over an abstract file store
pub struct ColumnarRepository {
    fs: Arc<dyn FileStore>,
    write_buffer_size: usize,
    state: Mutex<Buffers>,
}

impl ColumnarRepository {
    pub fn new(fs: Arc<dyn FileStore>, write_buffer_size: usize) -> Self {
        Self {
            fs,
            write_buffer_size: write_buffer_size.max(1),
            state: Mutex::new(Buffers::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buffers> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flush all non-empty buffers now
    pub fn flush(&self) -> Result<()> {
        self.flush_locked(&mut self.lock())
    }

    fn maybe_flush(&self, buffers: &mut Buffers) {
        let due = buffers.total() >= self.write_buffer_size
            || buffers.last_flush.elapsed() >= FLUSH_INTERVAL;
        if !due {
            return;
        }
        if let Err(e) = self.flush_locked(buffers) {
            // Keep ingesting; retained buffers go out with the next flush
            tracing::error!(error = %e, buffered = buffers.total(), "Flush failed, retaining buffers");
        }
    }

    fn flush_locked(&self, buffers: &mut Buffers) -> Result<()> {
        let mut first_error = None;

        for event_type in EventType::ALL {
            let events = std::mem::take(buffers.buffer(event_type));
            if events.is_empty() {
                continue;
            }
            match self.flush_buffer(event_type, &events) {
                Ok(()) => {}
                Err(e) => {
                    // Put the events back so the next flush retries them
                    *buffers.buffer(event_type) = events;
                    first_error.get_or_insert(e);
                }
            }
        }

        buffers.recompute_sequence_span();
        buffers.last_flush = Instant::now();

        match first_error {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    /// Write one buffer as a single parquet file named after the
    /// timestamp and sequence span of its events
    fn flush_buffer(&self, event_type: EventType, events: &[BookEvent]) -> Result<()> {
        let first = &events[0];
        let last = &events[events.len() - 1];

        let dir = format!(
            "{}/{}",
            events_dir(event_type, first.asset().token_id()),
            first.timestamp().date_string()
        );
        self.fs.create_dir_all(&dir)?;

        let filename = format!(
            "{}_{}_{}_{}.parquet",
            event_type.as_str(),
            first.timestamp().hour_string(),
            first.sequence(),
            last.sequence()
        );
        let path = format!("{dir}/{filename}");

        let batch = codec::encode_events(event_type, events)?;
        self.fs.write(&path, to_parquet_bytes(&batch)?)?;

        tracing::debug!(
            path = %path,
            rows = events.len(),
            event_type = event_type.as_str(),
            "Flushed event buffer"
        );
        Ok(())
    }

    fn read_events_from_files(
        &self,
        event_type: EventType,
        asset: &MarketAsset,
        min_sequence: u64,
    ) -> Vec<BookEvent> {
        let dir = events_dir(event_type, asset.token_id());
        let files = match self.fs.list_recursive(&dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, dir = %dir, "Listing failed, treating as empty");
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        for path in files {
            if !path.ends_with(".parquet") {
                continue;
            }
            // Range pruning: the file name tells us the highest sequence inside
            if let Some(seq_end) = parse_seq_end(&path) {
                if seq_end <= min_sequence {
                    continue;
                }
            }
            match self.read_event_file(event_type, &path, asset, min_sequence) {
                Ok(mut file_events) => events.append(&mut file_events),
                Err(e) => {
                    tracing::warn!(error = %e, path = %path, "Unreadable event file, skipping");
                }
            }
        }
        events
    }

    fn read_event_file(
        &self,
        event_type: EventType,
        path: &str,
        asset: &MarketAsset,
        min_sequence: u64,
    ) -> Result<Vec<BookEvent>> {
        let data = self.fs.read(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(data)?.build()?;

        let mut events = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| Error::Storage(e.to_string()))?;
            events.extend(codec::decode_events(event_type, &batch, asset, min_sequence)?);
        }
        Ok(events)
    }
}

impl OrderBookRepository for ColumnarRepository {
    fn append_event(&self, event: &BookEvent) -> Result<()> {
        let mut buffers = self.lock();

        let sequence = event.sequence();
        if buffers.min_sequence == 0 {
            buffers.min_sequence = sequence;
        }
        buffers.max_sequence = sequence;
        buffers.buffer(event.event_type()).push(event.clone());

        self.maybe_flush(&mut buffers);
        Ok(())
    }

    fn get_events_since(
        &self,
        asset: &MarketAsset,
        sequence_number: u64,
    ) -> Result<Vec<BookEvent>> {
        let buffers = self.lock();

        let mut events = Vec::new();
        for event_type in EventType::ALL {
            events.extend(self.read_events_from_files(event_type, asset, sequence_number));
        }

        // Events not yet flushed are part of the log too
        for event_type in EventType::ALL {
            events.extend(
                buffers
                    .buffer_ref(event_type)
                    .iter()
                    .filter(|e| e.asset() == asset && e.sequence() > sequence_number)
                    .cloned(),
            );
        }

        events.sort_by_key(|e| e.sequence());
        Ok(events)
    }

    fn store_snapshot(&self, book: &OrderBook) -> Result<()> {
        let _buffers = self.lock();

        let batch = codec::encode_order_book(book)?;
        self.fs.create_dir_all("snapshots")?;
        let path = snapshot_path(book.asset().token_id());
        self.fs.write(&path, to_parquet_bytes(&batch)?)?;

        tracing::debug!(path = %path, asset = %book.asset(), sequence = book.last_sequence(), "Stored snapshot");
        Ok(())
    }

    fn get_latest_snapshot(&self, asset: &MarketAsset) -> Result<Option<OrderBook>> {
        let _buffers = self.lock();

        let path = snapshot_path(asset.token_id());
        if !self.fs.exists(&path)? {
            return Ok(None);
        }

        let data = match self.fs.read(&path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "Unreadable snapshot, treating as absent");
                return Ok(None);
            }
        };

        let reader = ParquetRecordBatchReaderBuilder::try_new(data)?.build()?;
        for batch in reader {
            let batch = batch.map_err(|e| Error::Storage(e.to_string()))?;
            if let Some(book) = codec::decode_order_book(&batch)? {
                // A colliding token hash could hand us someone else's file
                if book.asset() != asset {
                    return Ok(None);
                }
                return Ok(Some(book));
            }
        }
        Ok(None)
    }
}

impl Drop for ColumnarRepository {
    fn drop(&mut self) {
        let mut buffers = self.lock();
        if buffers.total() == 0 {
            return;
        }
        if let Err(e) = self.flush_locked(&mut buffers) {
            tracing::error!(error = %e, "Final flush on teardown failed");
        }
    }
}

fn to_parquet_bytes(batch: &arrow::record_batch::RecordBatch) -> Result<Bytes> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_prefix_and_hash() {
        assert_eq!(token_prefix("65818619657568813474341868652308942079"), "65818619");
        assert_eq!(token_hash("65818619657568813474341868652308942079"), "6581861965756881");
        assert_eq!(token_prefix("abc"), "abc");
        assert_eq!(token_hash("abc"), "abc");
    }

    #[test]
    fn test_events_dir_layout() {
        assert_eq!(
            events_dir(EventType::BookDelta, "65818619657568"),
            "events/book_delta/65818619"
        );
        assert_eq!(snapshot_path("65818619657568"), "snapshots/65818619657568.parquet");
    }

    #[test]
    fn test_parse_seq_end() {
        assert_eq!(
            parse_seq_end("events/book_delta/65818619/2025-07-15/book_delta_13_17_42.parquet"),
            Some(42)
        );
        assert_eq!(parse_seq_end("trade_event_00_1_1.parquet"), Some(1));
        assert_eq!(parse_seq_end("garbage.parquet"), None);
        assert_eq!(parse_seq_end("no_extension_7_9"), None);
    }
}
