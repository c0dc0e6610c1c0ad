use clap::Parser;
use poly_ingest::cli::{Cli, Commands};
use poly_ingest::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    poly_ingest::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting live ingestion");
            args.execute(&config)?;
        }
        Commands::Replay(args) => {
            args.execute(&config)?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Storage: {:?}", config.storage.backend);
            println!("  Data directory: {}", config.storage.data_directory.display());
            println!("  Write buffer: {} events", config.storage.write_buffer_size);
            println!("  Snapshot interval: {} events", config.service.snapshot_interval);
            println!("  WebSocket: {}", config.websocket.url);
        }
    }

    Ok(())
}
