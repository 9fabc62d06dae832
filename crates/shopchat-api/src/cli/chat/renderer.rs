//! Terminal rendering of chat messages and exchange outcomes.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use shopchat_core::chat::exchange::ExchangeOutcome;
use shopchat_types::message::{ChatMessage, MessageStatus, PLACEHOLDER_TEXT, SenderType};

/// JSON form of an exchange outcome, shared by `--json` output and the REST API.
pub fn outcome_json(outcome: &ExchangeOutcome) -> serde_json::Value {
    serde_json::json!({
        "outcome": outcome.label(),
        "message": outcome.message(),
        "failure": outcome.failure_kind(),
    })
}

/// Spinner shown while the bot is typing.
pub fn typing_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(PLACEHOLDER_TEXT);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn sender_label(sender: SenderType) -> String {
    match sender {
        SenderType::Guest => format!("{}", style("You").green().bold()),
        SenderType::Bot => format!("{}", style("Bot").cyan().bold()),
        SenderType::Admin => format!("{}", style("Shop").magenta().bold()),
    }
}

/// One message as a single styled line.
pub fn format_message(message: &ChatMessage) -> String {
    let text = match message.status {
        MessageStatus::Failed => format!("{}", style(&message.message).red()),
        MessageStatus::Sending => format!("{}", style(&message.message).dim()),
        MessageStatus::Local | MessageStatus::Sent => message.message.clone(),
    };
    format!(
        "  {} {} {}",
        sender_label(message.sender_type),
        text,
        style(format!("[{}]", message.status)).dim()
    )
}

/// Print the result of one exchange.
pub fn print_outcome(outcome: &ExchangeOutcome) {
    match outcome {
        ExchangeOutcome::Skipped => {
            println!(
                "  {} {}",
                style("!").yellow().bold(),
                style("The bot is still answering; message dropped.").dim()
            );
        }
        ExchangeOutcome::Answered(message) | ExchangeOutcome::Failed { message, .. } => {
            println!("{}", format_message(message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shopchat_types::error::FailureKind;

    fn bot_message(text: &str, status: MessageStatus) -> ChatMessage {
        ChatMessage {
            id: "ai-1".to_string(),
            sender_type: SenderType::Bot,
            message: text.to_string(),
            conversation_id: None,
            session_id: None,
            created_at: Utc::now(),
            temp_id: None,
            status,
        }
    }

    #[test]
    fn test_outcome_json_skipped() {
        let json = outcome_json(&ExchangeOutcome::Skipped);
        assert_eq!(json["outcome"], "skipped");
        assert!(json["message"].is_null());
        assert!(json["failure"].is_null());
    }

    #[test]
    fn test_outcome_json_failed() {
        let outcome = ExchangeOutcome::Failed {
            message: bot_message(
                "Kết nối mạng có vấn đề. Vui lòng thử lại.",
                MessageStatus::Failed,
            ),
            kind: FailureKind::Connectivity,
        };
        let json = outcome_json(&outcome);
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["failure"], "connectivity");
        assert_eq!(json["message"]["senderType"], "BOT");
        assert_eq!(json["message"]["status"], "failed");
    }

    #[test]
    fn test_format_message_contains_text_and_status() {
        let line = format_message(&bot_message("xin chào", MessageStatus::Sent));
        assert!(line.contains("xin chào"));
        assert!(line.contains("sent"));
    }
}
