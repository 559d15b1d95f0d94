pub mod command_handler;
pub mod listener;
pub mod sender;

use crate::analyzer::SignalAnalyzer;
use crate::config::AppConfig;
use crate::model::{AnalysisResult, NotifyError};
use reqwest::{Client, Method, RequestBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Discord REST client that listens for prefix commands and posts results.
pub struct DiscordNotifier {
    pub client: Client,
    pub config: Arc<AppConfig>,
    pub analyzer: Arc<SignalAnalyzer>,
    pub start_time: Instant,
}

impl DiscordNotifier {
    pub fn new(config: Arc<AppConfig>, analyzer: Arc<SignalAnalyzer>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .user_agent(concat!("DiscordBot (gravity-sniper, ", env!("CARGO_PKG_VERSION"), ")"))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            config,
            analyzer,
            start_time: Instant::now(),
        })
    }

    /// Builds an authenticated request against the configured API base.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.discord.api_base.trim_end_matches('/'), path);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bot {}", self.config.discord.bot_token))
    }

    pub async fn notify_text(
        &self,
        channel_id: u64,
        reply_to: Option<&str>,
        text: &str,
    ) -> Result<(), NotifyError> {
        sender::send_text(self, channel_id, reply_to, text).await
    }

    pub async fn notify_analysis(
        &self,
        channel_id: u64,
        reply_to: Option<&str>,
        result: &AnalysisResult,
    ) -> Result<(), NotifyError> {
        sender::send_analysis(self, channel_id, reply_to, result).await
    }

    pub fn spawn_listener(notifier: Arc<DiscordNotifier>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("▶️ Starting Discord listener...");
            listener::listen_for_commands(notifier).await;
            tracing::info!("⏹️ Discord listener ended.");
        })
    }
}
