//! The interactive chat loop.

use console::style;
use indicatif::ProgressBar;

use shopchat_core::chat::exchange::ExchangeOutcome;
use shopchat_types::error::ExchangeError;
use shopchat_types::event::ChatEvent;

use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer;
use crate::cli::ChatArgs;
use crate::state::{AppState, ChatInstance};

/// Run `shopchat chat` until the user exits.
pub async fn run_chat(
    state: &AppState,
    args: &ChatArgs,
    load_history: bool,
    json: bool,
) -> anyhow::Result<()> {
    let session_id = args.session_id();
    let instance = state.build_instance(&session_id, !args.member);
    if args.conversation.is_some() {
        instance.exchange.conversation().set(args.conversation);
    }

    print_banner(state, &instance);

    if load_history {
        show_history(&instance).await;
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Chat ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Chat ended.").dim());
                            break;
                        }
                        ChatCommand::History => show_history(&instance).await,
                        ChatCommand::Messages => {
                            println!();
                            for message in instance.exchange.store().snapshot() {
                                println!("{}", renderer::format_message(&message));
                            }
                            println!();
                        }
                        ChatCommand::Conversation(id) => {
                            instance.exchange.conversation().set(Some(id));
                            println!(
                                "\n  {} Replies now belong to conversation {}\n",
                                style("*").cyan().bold(),
                                style(id).cyan()
                            );
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                match exchange_with_spinner(&instance, &text, None).await {
                    Ok(outcome) if json => {
                        println!("{}", renderer::outcome_json(&outcome));
                    }
                    Ok(outcome) => {
                        println!();
                        renderer::print_outcome(&outcome);
                        println!();
                    }
                    Err(ExchangeError::MissingCredential) => {
                        eprintln!(
                            "\n  {} No completion API token configured.",
                            style("!").red().bold()
                        );
                        eprintln!(
                            "  {}",
                            style("Set SHOPCHAT_AI_TOKEN or [ai].token in config.toml.").dim()
                        );
                    }
                    Err(e) => {
                        eprintln!("\n  {} {e}", style("!").red().bold());
                    }
                }
            }
        }
    }

    chat_input.flush();
    instance.flush().await;
    Ok(())
}

/// Run one exchange, showing a spinner while the bot typing flag is set.
pub async fn exchange_with_spinner(
    instance: &ChatInstance,
    text: &str,
    conversation_id: Option<i64>,
) -> Result<ExchangeOutcome, ExchangeError> {
    let mut events = instance.exchange.subscribe();
    let send = instance.send(text, conversation_id);
    tokio::pin!(send);

    let mut spinner: Option<ProgressBar> = None;
    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            event = events.recv() => {
                if let Ok(ChatEvent::TypingChanged { bot }) = event {
                    match (bot, spinner.take()) {
                        (true, None) => spinner = Some(renderer::typing_spinner()),
                        (true, Some(existing)) => spinner = Some(existing),
                        (false, Some(existing)) => existing.finish_and_clear(),
                        (false, None) => {}
                    }
                }
            }
        }
    };

    if let Some(existing) = spinner {
        existing.finish_and_clear();
    }
    result
}

async fn show_history(instance: &ChatInstance) {
    let conversation_id = instance.exchange.conversation().get();
    let messages = instance
        .history
        .load_into(instance.exchange.store(), conversation_id)
        .await;

    println!();
    if messages.is_empty() {
        println!("  {}", style("No history.").dim());
    } else {
        for message in &messages {
            println!("{}", renderer::format_message(message));
        }
    }
    println!();
}

fn print_banner(state: &AppState, instance: &ChatInstance) {
    let identity = instance.exchange.identity();
    let who = if identity.is_guest { "guest" } else { "member" };

    println!();
    println!("  {}", style("Storefront assistant").cyan().bold());
    println!();
    println!("  {}  {}", style("Bot:").bold(), style(state.ai_client.bot_id()).dim());
    println!("  {}  {}", style("Session:").bold(), style(&instance.session_id).dim());
    println!("  {}  {}", style("Identity:").bold(), style(who).dim());
    if let Some(id) = instance.exchange.conversation().get() {
        println!("  {}  {}", style("Conversation:").bold(), style(id).dim());
    }
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
