use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use backend_lib::{
    clock::{Clock, SystemClock},
    config::{Settings, StorageBackend},
    counter::MemoryCounterStore,
    router,
    storage::{AccountStore, FlatFileAccountStore, MemoryAccountStore},
    AppState,
};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Identity and session server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `server.bind_addr`
    #[arg(long)]
    bind: Option<SocketAddr>,
}

fn init_tracing(settings: &Settings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));

    if settings.log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(bind) = cli.bind {
        settings.server.bind_addr = bind;
    }
    init_tracing(&settings);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let accounts: Arc<dyn AccountStore> = match settings.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryAccountStore::new(clock.clone())),
        StorageBackend::FlatFile => Arc::new(
            FlatFileAccountStore::open_with_clock(&settings.storage.data_dir, clock.clone())
                .await
                .with_context(|| {
                    format!("opening account store at {}", settings.storage.data_dir.display())
                })?,
        ),
    };

    let counters = MemoryCounterStore::new(clock.clone());
    let _sweeper = counters.spawn_sweeper(settings.auth.counter_sweep_interval());

    let addr = settings.server.bind_addr;
    let state = Arc::new(AppState::new(accounts, Arc::new(counters), settings, clock));
    let app = router::create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "identity server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
