//! CLI interface for poly-ingest
//!
//! Provides subcommands for:
//! - `run`: ingest live market data for one or more tokens
//! - `replay`: dump stored events for an asset since a sequence number
//! - `config`: show the effective configuration

mod replay;
mod run;

pub use replay::ReplayArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "poly-ingest")]
#[command(about = "Market-data ingestion engine for Polymarket CLOB order books")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest live market data
    Run(RunArgs),
    /// Replay stored events for an asset
    Replay(ReplayArgs),
    /// Show effective configuration
    Config,
}
