//! One-shot chat and history commands.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use super::truncate;
use crate::state::AppState;

/// Send one message through the chat service and print the reply.
pub async fn send_message(
    state: &AppState,
    user_id: &str,
    topic: &str,
    message: &str,
    json: bool,
) -> Result<()> {
    let reply = state
        .chat_service
        .handle_message(user_id, topic, message)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("you:").dim(), message.trim());
    println!("  {} {}", style("bot:").cyan().bold(), reply.response);
    println!();

    let source = if reply.cached {
        style("cached duplicate".to_string()).yellow()
    } else {
        style(format!("{} ms", reply.response_time_ms)).dim()
    };
    println!("  {}", source);
    println!();
    Ok(())
}

/// Print recent stored turns as a table.
pub async fn history(
    state: &AppState,
    user_id: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let turns = state.chat_service.history(user_id, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!("  {}", style("No chat history yet.").dim());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("When").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("Topic").fg(Color::White),
        Cell::new("Message").fg(Color::White),
        Cell::new("Response").fg(Color::White),
        Cell::new("ms").fg(Color::White),
    ]);

    for turn in &turns {
        table.add_row(vec![
            Cell::new(turn.created_at.format("%Y-%m-%d %H:%M:%S")).fg(Color::DarkGrey),
            Cell::new(&turn.user_id).fg(Color::Cyan),
            Cell::new(&turn.topic),
            Cell::new(truncate(&turn.message, 40)),
            Cell::new(truncate(&turn.response, 60)),
            Cell::new(turn.response_time_ms).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} turn{}",
        style(turns.len()).bold(),
        if turns.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}
