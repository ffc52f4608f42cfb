//! Special commands parser for interactive chat mode
//!
//! Special commands are handled by the chat loop instead of being sent to
//! the model. Commands are prefixed with `/` and are case-insensitive,
//! except for the path argument of `/export`, which is kept verbatim.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Write the transcript PDF, optionally to a given path
    Export(Option<PathBuf>),

    /// Print the conversation as a table
    History,

    /// Show session counters and export readiness
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the model as a follow-up message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a known command, and `CommandError::UnsupportedArgument` if a command that
/// takes no argument receives one.
///
/// # Examples
///
/// ```
/// use feedloop::commands::special_commands::{parse_special_command, SpecialCommand};
/// use std::path::PathBuf;
///
/// assert_eq!(parse_special_command("/status").unwrap(), SpecialCommand::ShowStatus);
/// assert_eq!(
///     parse_special_command("/export out/Report.pdf").unwrap(),
///     SpecialCommand::Export(Some(PathBuf::from("out/Report.pdf")))
/// );
/// assert_eq!(parse_special_command("What about costs?").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    let no_arg = |cmd: SpecialCommand| {
        if arg.is_empty() {
            Ok(cmd)
        } else {
            Err(CommandError::UnsupportedArgument {
                command: command.clone(),
                arg: arg.to_string(),
            })
        }
    };

    match command.as_str() {
        "/export" => {
            if arg.is_empty() {
                Ok(SpecialCommand::Export(None))
            } else {
                Ok(SpecialCommand::Export(Some(PathBuf::from(arg))))
            }
        }
        "/history" => no_arg(SpecialCommand::History),
        "/status" => no_arg(SpecialCommand::ShowStatus),
        "/help" | "/?" => no_arg(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => no_arg(SpecialCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Feedback Chat
==================================

  /export [PATH]  - Save the transcript as PDF (available after enough exchanges)
  /history        - Show the conversation so far
  /status         - Show exchange count and export availability
  /help           - Show this help message
  /?              - Same as /help
  /exit           - Leave the chat (also: exit, quit)

Any other text is sent to the mentor as a follow-up question.
"#
    );
}
