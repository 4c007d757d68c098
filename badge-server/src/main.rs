//! Badge Reader Network Bridge
//!
//! Polls a USB RFID badge reader on a dedicated thread and exposes the scans
//! over a WebSocket channel, an optional push to a registration API, and a
//! small administrative HTTP surface.

mod cue;
mod push;
mod routes;
mod settings;
mod update;
mod ws;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use badge_detect::SystemLocator;
use badge_link::{ScanBridge, ScanWorker, ScannerConfig, SerialOpener, WorkerConfig};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cue::SystemCue;
use push::RegistrationClient;
use routes::AppState;
use settings::Settings;

/// How long shutdown waits for the polling thread
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// WebSocket outbound drain interval
const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "badgelink", version, about = "USB RFID badge reader bridge")]
struct Args {
    /// Address to serve HTTP and WebSocket on
    #[arg(long, default_value = "127.0.0.1:8765")]
    bind: SocketAddr,

    /// Settings file (default: $XDG_CONFIG_HOME/badgelink/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Polling cycle length in milliseconds
    #[arg(long, default_value_t = 200)]
    cycle_ms: u64,

    /// Directory holding update files
    #[arg(long, default_value = "update")]
    update_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "badgelink=info,badge_link=info,badge_detect=info,badge_protocol=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Starting badgelink {}", env!("CARGO_PKG_VERSION"));

    let settings_path = args.settings.clone().or_else(Settings::default_path);
    let settings = match settings_path.as_deref() {
        Some(path) => {
            info!("Settings file {}", path.display());
            Settings::load(path)
        }
        None => {
            warn!("Could not determine settings path, changes will not be saved");
            Settings::default()
        }
    };
    let bridge = Arc::new(ScanBridge::new(ScannerConfig::from(settings)));

    let locator = SystemLocator::for_host();
    info!("Matching reader ports by {:?}", locator.strategy());

    let worker_config = WorkerConfig {
        cycle: Duration::from_millis(args.cycle_ms.max(1)),
        ..Default::default()
    };
    // The blocking HTTP client has to be built outside the async runtime
    let sink = RegistrationClient::new(Box::new(SystemCue))
        .context("Failed to build registration client")?;
    let worker = ScanWorker::new(locator, SerialOpener, Arc::clone(&bridge), worker_config)
        .with_sink(Box::new(sink));
    let poller = worker.spawn().context("Failed to start polling thread")?;

    let state = AppState {
        bridge,
        settings_path: settings_path.map(Arc::new),
        update_dir: Arc::new(args.update_dir),
        flush_every: FLUSH_INTERVAL,
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let served = runtime.block_on(serve(args.bind, state));

    info!("Stopping polling thread");
    poller.shutdown(SHUTDOWN_TIMEOUT);
    served
}

async fn serve(bind: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on http://{} (WebSocket at /ws)", bind);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")
}
