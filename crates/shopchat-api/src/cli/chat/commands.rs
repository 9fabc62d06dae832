//! Slash commands for the chat loop.

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Exit,
    /// Load the provider's history into this chat.
    History,
    /// Print the chat's current message list.
    Messages,
    /// Fill the conversation slot, as the storefront does once a
    /// conversation has been created.
    Conversation(i64),
    Unknown(String),
}

/// Parse input as a slash command; `None` when it is a plain message.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, ' ');
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/history" => ChatCommand::History,
        "/messages" | "/ls" => ChatCommand::Messages,
        "/conversation" | "/conv" => match arg.map(str::parse::<i64>) {
            Some(Ok(id)) => ChatCommand::Conversation(id),
            _ => ChatCommand::Unknown("/conversation requires a numeric id".to_string()),
        },
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}           {}", style("/help").cyan(), "Show this help message");
    println!("  {}           {}", style("/exit").cyan(), "End the chat");
    println!("  {}        {}", style("/history").cyan(), "Load past exchanges");
    println!("  {}       {}", style("/messages").cyan(), "Show the current message list");
    println!("  {} {}", style("/conversation N").cyan(), "Attach replies to conversation N");
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
