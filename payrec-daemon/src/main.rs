//! Payout reconciliation daemon.
//!
//! Polls the marketplace module's payout event log, notifies the alert
//! channel for each released payout, forwards the transfer to the
//! signer service, and monitors the treasury balance.

mod config;
mod shutdown;

use clap::Parser;
use payrec_core::chain::{AptosClient, AptosConfig, SignerClient};
use payrec_core::cursor::EventCursor;
use payrec_core::notify::TelegramNotifier;
use payrec_core::reconciler::{PayoutReconciler, ReconcilerConfig};
use payrec_core::treasury::{BalanceMonitor, MonitorConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Payout reconciliation daemon for the influencer marketplace escrow module.
#[derive(Parser, Debug)]
#[command(name = "payrec-daemon")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./payrec-config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting payrec-daemon v{}", env!("CARGO_PKG_VERSION"));

    let file_config = config::load(&args.config).map_err(|e| {
        tracing::error!("Failed to load configuration: {e:#}");
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // One fullnode client serves both the event log and balance reads.
    let chain = Arc::new(AptosClient::new(AptosConfig {
        node_url: file_config.chain.node_url.clone(),
        module_address: file_config.chain.module_address.clone(),
        module_name: file_config.chain.module_name.clone(),
    }));
    let payouts = SignerClient::new(file_config.chain.signer_url.clone());
    let notifier = Arc::new(TelegramNotifier::new(
        file_config.notifier.telegram_token.clone(),
        file_config.notifier.telegram_chat_id.clone(),
    ));
    if !notifier.is_enabled() {
        tracing::warn!("Telegram notifier is not configured, alerts will be dropped");
    }

    let monitor = BalanceMonitor::new(
        chain.clone(),
        notifier.clone(),
        MonitorConfig {
            treasury_address: file_config.chain.treasury_address.clone(),
            min_balance: file_config.treasury.min_balance,
        },
    );

    let cursor = match &file_config.reconciler.cursor_path {
        Some(path) => EventCursor::with_persistence(path.clone()),
        None => EventCursor::new(),
    };

    let reconciler = PayoutReconciler::new(
        chain,
        payouts,
        notifier,
        monitor,
        cursor,
        ReconcilerConfig {
            poll_interval: Duration::from_millis(file_config.reconciler.poll_interval_ms),
            page_size: file_config.reconciler.page_size,
        },
    );

    let shutdown_rx = shutdown::spawn_shutdown_listener();
    let reconciler_handle = tokio::spawn(reconciler.run(shutdown_rx));

    reconciler_handle.await?;

    tracing::info!("Daemon shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
