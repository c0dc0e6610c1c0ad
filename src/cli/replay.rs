//! `replay` subcommand: dump the stored event log for one asset

use super::run::build_repository;
use crate::config::{Config, StorageBackend};
use crate::domain::{BookEvent, MarketAsset};
use clap::Args;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Market condition id
    pub condition_id: String,

    /// Outcome token id
    pub token_id: String,

    /// Only events with a sequence number greater than this
    #[arg(long, default_value_t = 0)]
    pub since: u64,
}

impl ReplayArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if config.storage.backend == StorageBackend::Memory {
            anyhow::bail!("replay needs a persistent backend; configure parquet or s3");
        }

        let repository = build_repository(config)?;
        let asset = MarketAsset::new(self.condition_id.clone(), self.token_id.clone())?;
        let events = repository.get_events_since(&asset, self.since)?;

        for event in &events {
            println!("{}", describe(event));
        }
        println!("{} events for {asset}", events.len());
        Ok(())
    }
}

fn describe(event: &BookEvent) -> String {
    let header = format!(
        "#{:<10} {:>13}ms {:<16}",
        event.sequence(),
        event.timestamp().millis(),
        event.event_type().as_str()
    );
    match event {
        BookEvent::Snapshot(snap) => {
            format!("{header} bids={} asks={}", snap.bids.len(), snap.asks.len())
        }
        BookEvent::Delta(delta) => format!("{header} changes={}", delta.changes.len()),
        BookEvent::Trade(trade) => format!(
            "{header} {} {} @ {}",
            trade.side.as_str(),
            trade.size,
            trade.price
        ),
        BookEvent::TickSize(tick) => format!(
            "{header} {} -> {}",
            tick.old_tick_size, tick.new_tick_size
        ),
    }
}
