/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`   - Interactive form and follow-up chat
- `review` - Non-interactive run of the same flow from a form file

Both handlers own their `Session` and drive it through `session::flow`.
The helpers below render turns and session state for either of them.
*/

use crate::config::ExportConfig;
use crate::error::Result;
use crate::export::export_session;
use crate::providers::{Role, Turn};
use crate::session::Session;
use colored::Colorize;
use prettytable::{format, Table};
use std::path::{Path, PathBuf};

pub mod chat;
pub mod review;
pub mod special_commands;

/// Prints one turn with a colored speaker label
pub fn print_turn(turn: &Turn) {
    let label = match turn.role {
        Role::User => turn.role.label().green().bold(),
        Role::Assistant if turn.is_error => turn.role.label().red().bold(),
        Role::Assistant => turn.role.label().cyan().bold(),
        Role::System => turn.role.label().dimmed(),
    };

    if turn.is_error {
        println!("{}: {}\n", label, turn.content.red());
    } else {
        println!("{}: {}\n", label, turn.content);
    }
}

/// Prints the conversation as a table
pub fn print_history(turns: &[Turn]) {
    if turns.is_empty() {
        println!("{}", "No messages yet.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "#".bold(),
        "Time".bold(),
        "Speaker".bold(),
        "Message".bold()
    ]);

    for (index, turn) in turns.iter().enumerate() {
        let speaker = if turn.is_error {
            format!("{} (error)", turn.role.label()).red()
        } else {
            turn.role.label().normal()
        };
        table.add_row(prettytable::row![
            index + 1,
            turn.created_at.format("%H:%M:%S").to_string(),
            speaker,
            preview(&turn.content, 70)
        ]);
    }

    println!("\nConversation:");
    table.printstd();
    println!();
}

/// Prints counters and export availability
pub fn print_status(session: &Session) {
    let feedback = if session.feedback_given() {
        "received".green()
    } else {
        "pending".yellow()
    };
    let export = if session.export_ready() {
        "available (/export)".green()
    } else {
        format!(
            "after {} more exchange(s)",
            session.export_threshold() - session.interactions()
        )
        .yellow()
    };

    println!("\nSession:    {}", session.id().to_string().cyan());
    println!("Messages:   {}", session.len());
    println!("Feedback:   {}", feedback);
    println!(
        "Exchanges:  {}/{}",
        session.interactions(),
        session.export_threshold()
    );
    println!("Export:     {}\n", export);
}

/// Renders the report and writes it to `target`, or to the configured file
/// name in the current directory
///
/// # Errors
///
/// Returns `ExportNotReady` before the threshold, or any render/write error
pub fn export_report(
    session: &Session,
    config: &ExportConfig,
    target: Option<&Path>,
) -> Result<PathBuf> {
    let artifact = export_session(session, config)?;
    let target = target.unwrap_or_else(|| Path::new(&config.file_name));
    artifact.write_to(target)
}

/// First line of `text`, shortened to `max` characters
fn preview(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let multi_line = text.lines().nth(1).is_some();
    if first_line.chars().count() > max {
        let cut: String = first_line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else if multi_line {
        format!("{}...", first_line)
    } else {
        first_line.to_string()
    }
}
