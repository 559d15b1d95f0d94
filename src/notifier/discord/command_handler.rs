// notifier/discord/command_handler.rs

use crate::model::{AnalysisError, AnalysisResult};
use crate::notifier::discord::DiscordNotifier;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Analyze(String),
    /// `analyze` without a symbol.
    AnalyzeUsage,
    Help,
    Ping,
    Unknown(String),
}

/// Parses a prefixed chat message. Returns `None` for ordinary chatter.
pub fn parse_command(content: &str, prefix: &str) -> Option<Command> {
    let body = content.trim().strip_prefix(prefix)?;
    let mut parts = body.split_whitespace();
    let name = parts.next()?.to_lowercase();

    let command = match name.as_str() {
        "analyze" => match parts.next() {
            Some(symbol) => Command::Analyze(symbol.to_string()),
            None => Command::AnalyzeUsage,
        },
        "help" => Command::Help,
        "ping" => Command::Ping,
        _ => Command::Unknown(name),
    };
    Some(command)
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "Available commands:\n\
         {p}analyze <SYMBOL> - analyze a Bybit trading pair, e.g. {p}analyze BTC/USDT\n\
         {p}help - command list\n\
         {p}ping - check connection",
        p = prefix
    )
}

/// User-facing text for a failed analysis. Details stay in the logs.
pub fn error_message(err: &AnalysisError) -> String {
    match err {
        AnalysisError::InsufficientData { symbol, .. } => {
            format!("Not enough data to analyze {}.", symbol)
        }
        AnalysisError::Provider(_) => {
            "Error talking to Bybit. Check that the trading pair is correct or try again later."
                .to_string()
        }
        AnalysisError::Unexpected(_) => {
            "An error occurred during analysis. Please try again later.".to_string()
        }
    }
}

/// Runs the analysis in its own task so a panic surfaces as an error instead
/// of taking the listener down.
async fn run_analysis(notifier: &DiscordNotifier, symbol: &str) -> Result<AnalysisResult, AnalysisError> {
    let analyzer = notifier.analyzer.clone();
    let symbol = symbol.to_string();
    match tokio::spawn(async move { analyzer.analyze(&symbol).await }).await {
        Ok(outcome) => outcome,
        Err(e) => Err(AnalysisError::Unexpected(e.to_string())),
    }
}

/// Handles an incoming command and replies in the channel it came from.
pub async fn handle_command(
    notifier: &DiscordNotifier,
    channel_id: u64,
    message_id: &str,
    command: Command,
) {
    info!("📩 [command] Handling {:?} from channel {}", command, channel_id);
    let prefix = notifier.config.discord.command_prefix.as_str();
    let reply = Some(message_id);

    match command {
        Command::Analyze(symbol) => match run_analysis(notifier, &symbol).await {
            Ok(result) => {
                if let Err(e) = notifier.notify_analysis(channel_id, reply, &result).await {
                    warn!("❌ [analyze] Send error: {:?}", e);
                }
            }
            Err(e) => {
                match &e {
                    AnalysisError::InsufficientData { .. } => info!("{}", e),
                    AnalysisError::Provider(inner) => warn!("❌ [analyze] Bybit error for {}: {}", symbol, inner),
                    AnalysisError::Unexpected(detail) => {
                        error!("💥 [analyze] Error during analysis of {}: {}", symbol, detail)
                    }
                }
                if let Err(send_err) = notifier.notify_text(channel_id, reply, &error_message(&e)).await {
                    warn!("❌ [analyze] Error reply failed: {:?}", send_err);
                }
            }
        },
        Command::AnalyzeUsage => {
            let msg = format!("Usage: {}analyze BTC/USDT", prefix);
            if let Err(e) = notifier.notify_text(channel_id, reply, &msg).await {
                warn!("❌ [analyze] Usage reply error: {:?}", e);
            }
        }
        Command::Help => {
            if let Err(e) = notifier.notify_text(channel_id, reply, &help_text(prefix)).await {
                warn!("❌ [help] Reply error: {:?}", e);
            }
        }
        Command::Ping => {
            let uptime = notifier.start_time.elapsed();
            let msg = format!(
                "Online. Uptime: {:02}:{:02}:{:02}",
                uptime.as_secs() / 3600,
                (uptime.as_secs() % 3600) / 60,
                uptime.as_secs() % 60
            );
            if let Err(e) = notifier.notify_text(channel_id, reply, &msg).await {
                warn!("❌ [ping] Reply error: {:?}", e);
            }
        }
        Command::Unknown(name) => {
            let msg = format!("Unknown command `{}`. Type {}help for a list of commands.", name, prefix);
            if let Err(e) = notifier.notify_text(channel_id, reply, &msg).await {
                warn!("❌ [unknown] Reply error: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FetchError;

    #[test]
    fn test_parse_analyze() {
        assert_eq!(
            parse_command("!analyze eth-usdt", "!"),
            Some(Command::Analyze("eth-usdt".into()))
        );
        assert_eq!(
            parse_command("  !ANALYZE   BTC/USDT  extra", "!"),
            Some(Command::Analyze("BTC/USDT".into()))
        );
        assert_eq!(parse_command("!analyze", "!"), Some(Command::AnalyzeUsage));
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse_command("!help", "!"), Some(Command::Help));
        assert_eq!(parse_command("!ping", "!"), Some(Command::Ping));
        assert_eq!(parse_command("!moon", "!"), Some(Command::Unknown("moon".into())));
    }

    #[test]
    fn test_non_commands_are_ignored() {
        assert_eq!(parse_command("analyze BTC/USDT", "!"), None);
        assert_eq!(parse_command("!", "!"), None);
        assert_eq!(parse_command("", "!"), None);
        assert_eq!(parse_command("?analyze BTC/USDT", "!"), None);
    }

    #[test]
    fn test_custom_prefix() {
        assert_eq!(
            parse_command("gs!analyze sol-usdt", "gs!"),
            Some(Command::Analyze("sol-usdt".into()))
        );
        assert!(help_text("gs!").contains("gs!analyze BTC/USDT"));
    }

    #[test]
    fn test_error_messages_hide_details() {
        let insufficient = AnalysisError::InsufficientData {
            symbol: "BTC/USDT".into(),
            bars: 10,
            required: 42,
        };
        assert_eq!(error_message(&insufficient), "Not enough data to analyze BTC/USDT.");

        let provider = AnalysisError::Provider(FetchError::Api {
            code: 10001,
            message: "secret detail".into(),
        });
        assert!(!error_message(&provider).contains("secret detail"));

        let unexpected = AnalysisError::Unexpected("stack".into());
        assert!(!error_message(&unexpected).contains("stack"));
    }
}
