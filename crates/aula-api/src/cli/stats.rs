//! Store totals and cache occupancy.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let chat = state.chat_stats().await?;
    // A one-shot process has no live conversations; this reports sizing.
    let memory = state.memory().get_memory_stats();

    if json {
        let stats = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "store": chat,
            "memory": memory,
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("  {} Aula v{}", style("▲").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Store ──").dim());
    println!("  Turns:    {}", style(chat.total_turns).bold());
    println!("  Students: {}", style(chat.total_users).bold());
    println!("  Topics:   {}", style(chat.total_topics).bold());
    println!();

    println!("  {}", style("── Memory ──").dim());
    println!(
        "  Capacity: {} conversations",
        style(memory.capacity).bold()
    );
    println!("  Timeout:  {}s idle", style(memory.timeout_seconds).bold());
    println!(
        "  Window:   {} messages",
        style(state.memory().config().window_size).bold()
    );
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).cyan());
    println!();
    Ok(())
}
