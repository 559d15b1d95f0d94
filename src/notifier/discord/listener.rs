// notifier/discord/listener.rs

use crate::model::NotifyError;
use crate::notifier::discord::command_handler::{handle_command, parse_command, Command};
use crate::notifier::discord::sender::check_response;
use crate::notifier::discord::DiscordNotifier;
use reqwest::Method;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

const PAGE_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub author: DiscordUser,
}

#[derive(Debug, Deserialize)]
pub struct DiscordUser {
    #[serde(default)]
    pub bot: bool,
}

impl DiscordMessage {
    fn snowflake(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

/// Picks commands out of a page of messages, oldest first, skipping bots.
/// Also returns the newest message id seen, to advance the cursor.
pub fn collect_commands(
    mut messages: Vec<DiscordMessage>,
    prefix: &str,
) -> (Vec<(String, Command)>, Option<u64>) {
    messages.sort_by_key(|m| m.snowflake().unwrap_or_default());
    let newest = messages.iter().filter_map(DiscordMessage::snowflake).max();

    let commands = messages
        .into_iter()
        .filter(|m| !m.author.bot)
        .filter_map(|m| parse_command(&m.content, prefix).map(|c| (m.id, c)))
        .collect();
    (commands, newest)
}

/// Advances a channel cursor after a poll. Returns the new cursor and whether
/// the page's commands should be dispatched.
///
/// The first poll (`after == None`) only records the newest id; an empty
/// channel starts from 0 so its first message is handled. The cursor never
/// moves backwards.
pub fn next_cursor(after: Option<u64>, newest: Option<u64>) -> (u64, bool) {
    match after {
        None => (newest.unwrap_or(0), false),
        Some(after) => (newest.map_or(after, |n| n.max(after)), true),
    }
}

/// Pause before the next poll after a 429.
pub fn rate_limit_backoff(retry_after: f64) -> Duration {
    Duration::try_from_secs_f64(retry_after).unwrap_or_default()
}

async fn fetch_messages(
    notifier: &DiscordNotifier,
    channel_id: u64,
    after: Option<u64>,
) -> Result<Vec<DiscordMessage>, NotifyError> {
    let path = format!("/channels/{}/messages", channel_id);
    let mut query = vec![("limit", PAGE_SIZE.to_string())];
    match after {
        Some(after) => query.push(("after", after.to_string())),
        None => query[0].1 = "1".to_string(),
    }

    let response = notifier.request(Method::GET, &path).query(&query).send().await?;
    let response = check_response(response, "poll").await?;
    Ok(response.json::<Vec<DiscordMessage>>().await?)
}

/// Polls the configured channels and dispatches incoming commands.
///
/// Each command runs in its own detached task so a slow analysis never holds
/// up polling of the other channels.
pub async fn listen_for_commands(notifier: Arc<DiscordNotifier>) {
    let discord = &notifier.config.discord;
    let mut cursors: HashMap<u64, u64> = HashMap::new();

    loop {
        let mut backoff = Duration::ZERO;
        for &channel_id in &discord.channel_ids {
            let after = cursors.get(&channel_id).copied();
            let messages = match fetch_messages(&notifier, channel_id, after).await {
                Ok(m) => m,
                Err(NotifyError::RateLimited { retry_after }) => {
                    backoff = backoff.max(rate_limit_backoff(retry_after));
                    break;
                }
                Err(e) => {
                    warn!("❌ [poll] Channel {} failed: {}", channel_id, e);
                    continue;
                }
            };

            let (commands, newest) = collect_commands(messages, &discord.command_prefix);
            let (cursor, dispatch) = next_cursor(after, newest);
            cursors.insert(channel_id, cursor);
            if !dispatch {
                info!("📌 [poll] Channel {} primed at message {}", channel_id, cursor);
                continue;
            }
            if commands.is_empty() {
                continue;
            }

            debug!("📥 [poll] {} command(s) in channel {}", commands.len(), channel_id);
            for (message_id, command) in commands {
                let notifier = Arc::clone(&notifier);
                tokio::spawn(async move {
                    handle_command(&notifier, channel_id, &message_id, command).await;
                });
            }
        }
        if !backoff.is_zero() {
            sleep(backoff).await;
        }
        sleep(Duration::from_secs(discord.poll_interval_seconds)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, content: &str, bot: bool) -> DiscordMessage {
        DiscordMessage {
            id: id.into(),
            content: content.into(),
            author: DiscordUser { bot },
        }
    }

    #[test]
    fn test_collect_commands_orders_and_filters() {
        let page = vec![
            message("103", "!analyze eth-usdt", false),
            message("101", "!analyze btc-usdt", false),
            message("104", "!analyze sol-usdt", true),
            message("102", "hello there", false),
        ];
        let (commands, newest) = collect_commands(page, "!");
        assert_eq!(newest, Some(104));
        assert_eq!(
            commands,
            vec![
                ("101".to_string(), Command::Analyze("btc-usdt".into())),
                ("103".to_string(), Command::Analyze("eth-usdt".into())),
            ]
        );
    }

    #[test]
    fn test_empty_page_keeps_cursor() {
        let (commands, newest) = collect_commands(Vec::new(), "!");
        assert!(commands.is_empty());
        assert_eq!(newest, None);
    }

    #[test]
    fn test_first_poll_primes_without_dispatch() {
        let page = vec![message("900", "!analyze btc-usdt", false), message("901", "!ping", false)];
        let (commands, newest) = collect_commands(page, "!");
        assert_eq!(commands.len(), 2);
        assert_eq!(next_cursor(None, newest), (901, false));
    }

    #[test]
    fn test_first_poll_of_empty_channel_starts_at_zero() {
        assert_eq!(next_cursor(None, None), (0, false));
        // the first message posted afterwards is dispatched
        assert_eq!(next_cursor(Some(0), Some(5)), (5, true));
    }

    #[test]
    fn test_empty_later_page_keeps_cursor() {
        assert_eq!(next_cursor(Some(1200), None), (1200, true));
    }

    #[test]
    fn test_cursor_never_moves_backwards() {
        assert_eq!(next_cursor(Some(1200), Some(1100)), (1200, true));
        assert_eq!(next_cursor(Some(1200), Some(1300)), (1300, true));
    }

    #[test]
    fn test_rate_limit_backoff() {
        assert_eq!(rate_limit_backoff(1.5), Duration::from_millis(1500));
        assert_eq!(rate_limit_backoff(0.0), Duration::ZERO);
        assert_eq!(rate_limit_backoff(f64::NAN), Duration::ZERO);
    }

    #[test]
    fn test_message_deserializes_without_optional_fields() {
        let json = r#"[{ "id": "1200000000000000000", "author": { "id": "5" } }]"#;
        let messages: Vec<DiscordMessage> = serde_json::from_str(json).unwrap();
        assert_eq!(messages[0].content, "");
        assert!(!messages[0].author.bot);
        assert_eq!(messages[0].snowflake(), Some(1_200_000_000_000_000_000));
    }
}
