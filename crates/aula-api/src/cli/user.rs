//! Student registry commands.

use anyhow::{Result, bail};
use console::style;

use aula_core::chat::repository::UserRepository;
use aula_types::user::UserProfile;

use crate::state::AppState;

pub async fn register_user(
    state: &AppState,
    user_id: &str,
    classroom: Option<&str>,
    json: bool,
) -> Result<()> {
    if user_id.trim().is_empty() {
        bail!("user id must not be empty");
    }
    let profile = state.user_repo.register_user(user_id, classroom).await?;
    print_profile(&profile, json)
}

pub async fn show_user(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let Some(profile) = state.user_repo.get_user(user_id).await? else {
        bail!("user '{user_id}' not found");
    };
    print_profile(&profile, json)
}

fn print_profile(profile: &UserProfile, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("Student").bold(), style(&profile.user_id).cyan());
    println!(
        "  Classroom:  {}",
        profile.classroom.as_deref().unwrap_or("-")
    );
    println!("  Messages:   {}", style(profile.message_count).bold());
    println!(
        "  First seen: {}",
        style(profile.first_seen.format("%Y-%m-%d %H:%M")).dim()
    );
    println!(
        "  Last seen:  {}",
        style(profile.last_seen.format("%Y-%m-%d %H:%M")).dim()
    );
    println!();
    Ok(())
}
