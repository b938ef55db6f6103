use anyhow::Context;
use clap::Parser;
use intellicharge_api::create_app;
use intellicharge_core::config::DemoConfig;
use intellicharge_core::store::{FileStorage, MemoryStorage, Storage};
use intellicharge_engine::{Action, Engine};
use std::path::PathBuf;

/// Command line arguments for the IntelliCharge server
#[derive(Parser, Debug)]
#[command(name = "intellicharge")]
#[command(about = "IntelliCharge EV charging dashboard")]
struct Args {
    /// Path to the demo configuration JSON file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Directory for persisted bookings; bookings are kept in memory when omitted
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Seed for reproducible station generation
    #[arg(short, long)]
    seed: Option<u64>,
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DemoConfig> {
    let Some(path) = path else {
        tracing::info!("Using built-in demo configuration");
        return Ok(DemoConfig::default());
    };

    let config_content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: DemoConfig = serde_json::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file '{}'", path.display()))?;

    tracing::info!(
        "Loaded demo config from {}: {}",
        path.display(),
        config.app.name
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt().pretty().init();

    let config = load_config(args.config.as_ref()).await?;

    let storage: Box<dyn Storage + Send> = match &args.data_dir {
        Some(dir) => {
            tracing::info!("Persisting bookings under {}", dir.display());
            Box::new(
                FileStorage::open(dir)
                    .with_context(|| format!("Failed to open data dir '{}'", dir.display()))?,
            )
        }
        None => Box::new(MemoryStorage::new()),
    };

    // No coordinate source on the server; stations start around the default location.
    let mut engine = Engine::new(config, storage, args.seed);
    engine.dispatch(Action::LoadStations { origin: None });

    let app = create_app(engine);

    let bind_addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
