mod analyzer;
mod config;
mod fetcher;
mod model;
mod normalizer;
mod notifier;
mod utils;

use analyzer::SignalAnalyzer;
use config::{load_config, AppConfig};
use fetcher::{BarSource, BybitFetcher};
use notifier::DiscordNotifier;
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("💥 Panic occurred: {}", panic_info);
    }));

    let config_path = env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("❌ Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let source: Arc<dyn BarSource> = match BybitFetcher::new(&config.exchange) {
        Ok(f) => Arc::new(f),
        Err(e) => {
            error!("❌ [bybit] Failed to create exchange client: {}", e);
            return;
        }
    };
    let analyzer = Arc::new(SignalAnalyzer::new(source, config.analysis.clone()));

    let notifier = match DiscordNotifier::new(config.clone(), analyzer) {
        Ok(n) => Arc::new(n),
        Err(e) => {
            error!("❌ [discord] Failed to create Discord client: {}", e);
            return;
        }
    };

    info!(
        "🚀 Watching {} channel(s) with prefix '{}', {} bars over {} days",
        config.discord.channel_ids.len(),
        config.discord.command_prefix,
        config.analysis.interval,
        config.analysis.lookback_days
    );
    let listener = DiscordNotifier::spawn_listener(notifier);

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("🛑 Shutdown requested.");
            listener.abort();
        }
        Err(e) => {
            warn!("⚠️ Failed to listen for shutdown signal: {}", e);
            if let Err(e) = listener.await {
                error!("❌ Listener task failed: {}", e);
            }
        }
    }
}
