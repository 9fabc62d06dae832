//! `shopchat history` -- list past exchanges from the completion provider.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use shopchat_core::service::history::HistoryLoader;

use crate::state::AppState;

/// Longest message preview shown in a table cell.
const PREVIEW_CHARS: usize = 60;

fn preview(text: Option<&str>) -> String {
    let text = text.unwrap_or("-");
    if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

pub async fn list_history(state: &AppState, limit: usize, json: bool) -> anyhow::Result<()> {
    let loader = HistoryLoader::new(state.ai_client.clone());
    let mut records = loader.fetch().await;
    records.sort_by_key(|r| r.created_at);
    let skip = records.len().saturating_sub(limit);
    let records = &records[skip..];

    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!("  No chat history for bot {}.", state.ai_client.bot_id());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Time").fg(Color::Cyan),
            Cell::new("Session"),
            Cell::new("User"),
            Cell::new("Bot"),
        ]);

    for record in records {
        table.add_row(vec![
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(record.session_id.as_deref().unwrap_or("-")),
            Cell::new(preview(record.user_message.as_deref())),
            Cell::new(preview(record.ai_response.as_deref())),
        ]);
    }

    println!();
    println!(
        "  Chat history for bot {} ({} exchanges)",
        style(state.ai_client.bot_id()).cyan(),
        records.len()
    );
    println!();
    println!("{table}");
    println!();

    Ok(())
}
