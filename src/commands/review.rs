//! Non-interactive review handler.
//!
//! Runs the same flow as chat mode from a form file and a list of follow-up
//! messages, printing every turn as it is produced.

use super::{export_report, print_turn};
use crate::config::Config;
use crate::error::{FeedloopError, Result};
use crate::gateway::CompletionGateway;
use crate::session::{send_message, submit_form, ProjectForm, Session};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Run a review from a form file
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `form_path` - YAML file describing the project
/// * `messages` - Follow-up messages, sent in order
/// * `export` - Where to write the PDF report, if requested
///
/// # Errors
///
/// Returns error if the form cannot be loaded or is incomplete, if the
/// initial feedback failed while follow-ups were requested, or if the
/// requested export is not available
pub async fn run_review(
    config: Config,
    form_path: &Path,
    messages: &[String],
    export: Option<PathBuf>,
) -> Result<()> {
    let form = ProjectForm::from_yaml_file(form_path)?;
    let gateway = CompletionGateway::from_config(&config)?;
    let mut session = Session::from_config(&config.session);

    tracing::info!(
        "Reviewing {} with {} follow-up message(s)",
        form.project_name,
        messages.len()
    );

    let initial = submit_form(&mut session, &gateway, &form).await?;
    print_turn(&initial.reply);

    if initial.is_error() {
        if messages.is_empty() && export.is_none() {
            return Ok(());
        }
        return Err(FeedloopError::Validation(
            "No feedback was received for the form; follow-up messages were not sent".to_string(),
        )
        .into());
    }

    for message in messages {
        println!("{}: {}\n", "You".green().bold(), message);
        let exchange = send_message(&mut session, &gateway, message).await?;
        print_turn(&exchange.reply);
    }

    if let Some(target) = export {
        let written = export_report(&session, &config.export, Some(target.as_path()))?;
        println!(
            "{}",
            format!("Report saved to {}", written.display()).green()
        );
    } else if session.export_ready() {
        println!(
            "{}",
            "Export is available; pass --export PATH to save the report.".dimmed()
        );
    }

    Ok(())
}
