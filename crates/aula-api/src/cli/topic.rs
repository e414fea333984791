//! Topic registry commands.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use aula_core::chat::repository::TopicRepository;
use aula_types::topic::NewTopic;

use super::truncate;
use crate::state::AppState;

pub async fn add_topic(state: &AppState, new: NewTopic, json: bool) -> Result<()> {
    if new.name.trim().is_empty() || new.instructions.trim().is_empty() {
        bail!("topic name and instructions must not be empty");
    }

    let topic = state.topic_repo.create_topic(&new.into_topic()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&topic)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Topic '{}' registered ({})",
        style("✓").green().bold(),
        style(&topic.name).cyan(),
        topic.subject
    );
    println!();
    Ok(())
}

pub async fn list_topics(state: &AppState, json: bool) -> Result<()> {
    let topics = state.topic_repo.list_topics().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&topics)?);
        return Ok(());
    }

    if topics.is_empty() {
        println!();
        println!(
            "  {} Register one with: {}",
            style("No topics yet.").dim(),
            style("aula topic add <name> -s <subject> -i <instructions>").cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Subject").fg(Color::White),
        Cell::new("Instructions").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for topic in &topics {
        table.add_row(vec![
            Cell::new(&topic.name).fg(Color::Cyan),
            Cell::new(&topic.subject),
            Cell::new(truncate(&topic.instructions, 50)),
            Cell::new(topic.created_at.format("%Y-%m-%d")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn show_topic(state: &AppState, name: &str, json: bool) -> Result<()> {
    let Some(topic) = state.topic_repo.get_topic(name).await? else {
        bail!("topic '{name}' not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&topic)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("Topic").bold(), style(&topic.name).cyan());
    println!("  Subject: {}", topic.subject);
    println!(
        "  Created: {}",
        style(topic.created_at.format("%Y-%m-%d %H:%M")).dim()
    );
    println!();
    println!("  {}", style("── Prompt ──").dim());
    for line in topic.prompt().lines() {
        println!("  {line}");
    }
    println!();
    Ok(())
}
