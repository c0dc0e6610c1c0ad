//! Configuration types for the ingestion engine

use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub websocket: WebSocketConfig,
    pub telemetry: TelemetryConfig,
}

/// Ingestion service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Events between periodic book snapshots; 0 disables them
    pub snapshot_interval: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 1000,
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory only; nothing survives the process
    Memory,
    /// Parquet files under a local data directory
    Parquet,
    /// Parquet files in an S3-compatible bucket
    S3,
}

/// Event-log and snapshot storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Local filesystem root for the parquet backend
    pub data_directory: PathBuf,
    /// Total buffered events that trigger a flush
    pub write_buffer_size: usize,
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_region: String,
    /// Non-empty for R2/B2/Wasabi/MinIO endpoints
    pub s3_endpoint_override: String,
    /// "http" for local MinIO
    pub s3_scheme: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_directory: PathBuf::from("data"),
            write_buffer_size: 1024,
            s3_bucket: String::new(),
            s3_prefix: "poly-ingest".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint_override: String::new(),
            s3_scheme: "https".to_string(),
        }
    }
}

/// Feed transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    pub url: String,
    /// 0 = reconnect forever
    pub max_reconnect_attempts: u32,
    pub ping_interval_secs: u64,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: crate::feed::POLYMARKET_WS_URL.to_string(),
            max_reconnect_attempts: 0,
            ping_interval_secs: 30,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [service]
            snapshot_interval = 500

            [storage]
            backend = "parquet"
            data_directory = "/var/lib/poly-ingest"
            write_buffer_size = 4096

            [websocket]
            ping_interval_secs = 15

            [telemetry]
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.service.snapshot_interval, 500);
        assert_eq!(config.storage.backend, StorageBackend::Parquet);
        assert_eq!(
            config.storage.data_directory,
            PathBuf::from("/var/lib/poly-ingest")
        );
        assert_eq!(config.storage.write_buffer_size, 4096);
        assert_eq!(config.websocket.ping_interval_secs, 15);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.service.snapshot_interval, 1000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.write_buffer_size, 1024);
        assert_eq!(config.storage.s3_region, "us-east-1");
        assert_eq!(config.storage.s3_scheme, "https");
        assert_eq!(config.websocket.url, crate::feed::POLYMARKET_WS_URL);
    }

    #[test]
    fn test_s3_section() {
        let toml = r#"
            [storage]
            backend = "s3"
            s3_bucket = "market-data"
            s3_prefix = "prod"
            s3_endpoint_override = "minio.internal:9000"
            s3_scheme = "http"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.s3_bucket, "market-data");
        assert_eq!(config.storage.s3_scheme, "http");
    }
}
