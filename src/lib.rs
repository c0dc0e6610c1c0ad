//! poly-ingest: market-data ingestion engine for Polymarket CLOB order books
//!
//! This library provides the core components for:
//! - Typed order-book events parsed from the CLOB WebSocket feed
//! - An immutable, event-sourced order-book projection per asset
//! - Global sequence numbering and live projection maintenance
//! - A columnar (parquet) event log partitioned for range-pruned replay
//! - Periodic book snapshots for fast cold starts
//! - Local-directory and S3-compatible storage backends

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod repository;
pub mod service;
pub mod storage;
pub mod telemetry;
pub mod ws;
