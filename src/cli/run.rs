//! `run` subcommand: live ingestion

use crate::config::{Config, StorageBackend};
use crate::feed::{MarketDataFeed, PolymarketFeed, PolymarketFeedConfig};
use crate::repository::{ColumnarRepository, InMemoryRepository, OrderBookRepository};
use crate::service::OrderBookService;
use crate::storage::{FileStore, LocalFileStore, S3FileStore, S3Options};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Token ids to subscribe to
    #[arg(required = true)]
    pub token_ids: Vec<String>,

    /// Seconds between stats lines
    #[arg(long, default_value_t = 10)]
    pub stats_interval: u64,
}

impl RunArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let repository = build_repository(config)?;

        let feed_config = PolymarketFeedConfig {
            ws_url: config.websocket.url.clone(),
            max_reconnects: config.websocket.max_reconnect_attempts,
            ping_interval: Duration::from_secs(config.websocket.ping_interval_secs),
            ..Default::default()
        };
        let feed: Arc<dyn MarketDataFeed> = Arc::new(PolymarketFeed::new(feed_config)?);

        let service = OrderBookService::new(
            repository,
            feed,
            config.service.snapshot_interval,
        );

        for token_id in &self.token_ids {
            service.subscribe(token_id);
        }
        service.start();
        tracing::info!(tokens = self.token_ids.len(), "Engine started");

        // Stats loop until ctrl-c; queries only touch the service lock
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(async {
            let mut last_events = 0u64;
            let mut ticker =
                tokio::time::interval(Duration::from_secs(self.stats_interval.max(1)));
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown requested");
                        break;
                    }
                    _ = ticker.tick() => {
                        let total = service.event_count();
                        let rate = (total - last_events) / self.stats_interval.max(1);
                        tracing::info!(
                            markets = service.book_count(),
                            events_per_sec = rate,
                            total_events = total,
                            "stats"
                        );
                        last_events = total;
                    }
                }
            }
        });

        service.stop();
        tracing::info!(total_events = service.event_count(), "Engine stopped");
        // Repository buffers flush when the last Arc drops
        Ok(())
    }
}

/// Pick the repository binding for the configured backend
pub fn build_repository(config: &Config) -> anyhow::Result<Arc<dyn OrderBookRepository>> {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryRepository::new())),
        StorageBackend::Parquet => {
            let fs: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(&storage.data_directory)?);
            Ok(Arc::new(ColumnarRepository::new(
                fs,
                storage.write_buffer_size,
            )))
        }
        StorageBackend::S3 => {
            let options = S3Options {
                bucket: storage.s3_bucket.clone(),
                prefix: storage.s3_prefix.clone(),
                region: storage.s3_region.clone(),
                endpoint_override: storage.s3_endpoint_override.clone(),
                scheme: storage.s3_scheme.clone(),
            };
            let fs: Arc<dyn FileStore> = Arc::new(S3FileStore::new(&options)?);
            Ok(Arc::new(ColumnarRepository::new(
                fs,
                storage.write_buffer_size,
            )))
        }
    }
}
