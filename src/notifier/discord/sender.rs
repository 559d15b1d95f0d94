// notifier/discord/sender.rs

use crate::model::{AnalysisResult, NotifyError};
use crate::notifier::discord::DiscordNotifier;
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const EMBED_COLOR: u32 = 0x00ff00;

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
struct MessageReference<'a> {
    message_id: &'a str,
    fail_if_not_exists: bool,
}

#[derive(Debug, Default, Serialize)]
struct CreateMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_reference: Option<MessageReference<'a>>,
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

/// Reads `retry_after` (seconds) from a 429 body; unreadable bodies give 0.
pub fn retry_after_from(body: &str) -> f64 {
    serde_json::from_str::<RateLimitBody>(body)
        .map(|b| b.retry_after)
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .unwrap_or_default()
}

/// Passes successful responses through and maps 429 and other failures to `NotifyError`.
pub(crate) async fn check_response(response: Response, context: &str) -> Result<Response, NotifyError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let body = response.text().await.unwrap_or_default();
        let retry_after = retry_after_from(&body);
        warn!("⏳ [{}] Discord rate limited, retry after {}s", context, retry_after);
        return Err(NotifyError::RateLimited { retry_after });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|_| "unknown".into());
        warn!("❌ [{}] Discord API responded [{}]: {}", context, status, body);
        return Err(NotifyError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Prices above 1 keep cents-level precision; sub-unit prices keep more digits.
pub fn format_price(price: f64) -> String {
    if price.abs() >= 1.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.8}", price)
    }
}

/// Renders an analysis result as a Discord embed.
pub fn render_embed(result: &AnalysisResult) -> Embed {
    let gravity_info: String = result
        .gravity_levels
        .iter()
        .map(|level| {
            format!(
                "**{} gravity level** ({}): {}\n",
                level.tier.label(),
                level.ratio,
                format_price(level.price)
            )
        })
        .collect();

    let field = |name: &str, value: String| EmbedField {
        name: name.to_string(),
        value,
        inline: false,
    };

    Embed {
        title: format!("Analysis: {}", result.symbol),
        color: EMBED_COLOR,
        fields: vec![
            field("Current price", format_price(result.current_price)),
            field("Trend", result.trend.to_string()),
            field("Signal", result.signal.to_string()),
            field("Gravity levels", gravity_info),
        ],
        footer: EmbedFooter {
            text: format!(
                "{} bars | volume {:.2} vs avg {:.2}",
                result.bars_analyzed, result.current_volume, result.avg_volume
            ),
        },
        timestamp: Some(result.last_bar_at.to_rfc3339()),
    }
}

async fn post_message(
    notifier: &DiscordNotifier,
    channel_id: u64,
    message: &CreateMessage<'_>,
) -> Result<(), NotifyError> {
    let path = format!("/channels/{}/messages", channel_id);
    let response = notifier.request(Method::POST, &path).json(message).send().await?;
    let response = check_response(response, "send").await?;
    info!("✅ Discord message sent to channel {} [{}]", channel_id, response.status());
    Ok(())
}

fn reference(reply_to: Option<&str>) -> Option<MessageReference<'_>> {
    reply_to.map(|message_id| MessageReference {
        message_id,
        fail_if_not_exists: false,
    })
}

/// Sends a plain text message, optionally as a reply.
pub async fn send_text(
    notifier: &DiscordNotifier,
    channel_id: u64,
    reply_to: Option<&str>,
    text: &str,
) -> Result<(), NotifyError> {
    let message = CreateMessage {
        content: Some(text),
        message_reference: reference(reply_to),
        ..Default::default()
    };
    post_message(notifier, channel_id, &message).await
}

/// Sends the embed for an analysis result.
pub async fn send_analysis(
    notifier: &DiscordNotifier,
    channel_id: u64,
    reply_to: Option<&str>,
    result: &AnalysisResult,
) -> Result<(), NotifyError> {
    info!("📤 [analyze] Sending analysis for {} to channel {}", result.symbol, channel_id);
    let message = CreateMessage {
        embeds: vec![render_embed(result)],
        message_reference: reference(reply_to),
        ..Default::default()
    };
    post_message(notifier, channel_id, &message).await
}
