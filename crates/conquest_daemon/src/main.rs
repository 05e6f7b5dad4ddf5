mod routes;
mod state;
mod tick_loop;

use anyhow::{Context, Result};
use clap::Parser;
use conquest_core::EventLevel;
use conquest_store::MemoryStore;
use conquest_ticker::Ticker;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "conquest_daemon", about = "Tile Conquest match daemon")]
struct Args {
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Seed for map generation and game ids; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 6)]
    map_radius: i32,
    /// Override the tick interval from constants.json (useful for demos).
    #[arg(long)]
    tick_interval_ms: Option<i64>,
    #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
    event_level: String,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut constants = conquest_world::load_constants(&args.content_dir)?;
    if let Some(interval) = args.tick_interval_ms {
        constants.tick_interval_ms = interval;
    }
    let event_level = if args.event_level == "debug" {
        EventLevel::Debug
    } else {
        EventLevel::Normal
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let id_rng = Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed)));

    let store = Arc::new(MemoryStore::new());
    let ticker = Arc::new(Ticker::new(store.clone(), constants, event_level));
    let (event_tx, _) = tokio::sync::broadcast::channel(256);

    let app_state = AppState {
        store,
        ticker: ticker.clone(),
        event_tx: event_tx.clone(),
        id_rng,
        map_radius: args.map_radius,
    };

    tokio::spawn(tick_loop::run_tick_loop(ticker, event_tx));

    let router = routes::make_router_with_cors(app_state, &args.cors_origin);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, seed, "conquest_daemon listening");
    axum::serve(listener, router)
        .await
        .context("serving http")?;
    Ok(())
}
