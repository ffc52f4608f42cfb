//! Interactive chat mode handler.
//!
//! Collects the project form field by field with a readline editor, shows
//! the mentor's feedback, and then loops on follow-up questions until the
//! user exits.

use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::{export_report, print_history, print_status, print_turn};
use crate::config::Config;
use crate::error::{FeedloopError, Result};
use crate::gateway::CompletionGateway;
use crate::session::{send_message, submit_form, ProjectForm, ProjectType, Session, UserProfile};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Start interactive chat mode
///
/// # Errors
///
/// Returns error if the provider cannot be created or the terminal cannot
/// be read. Completion failures are shown as replies and never end the chat.
pub async fn run_chat(config: Config) -> Result<()> {
    let gateway = CompletionGateway::from_config(&config)?;
    let mut session = Session::from_config(&config.session);
    let mut rl = DefaultEditor::new()?;

    print_welcome_banner(&gateway);
    for turn in session.turns() {
        print_turn(turn);
    }

    if !run_form_phase(&mut rl, &mut session, &gateway).await? {
        println!("Goodbye!");
        return Ok(());
    }

    println!(
        "{}",
        "Ask follow-up questions, or type /help for commands.".dimmed()
    );

    loop {
        let line = match read_line(&mut rl, &format!("{} ", ">>".green().bold()))? {
            Some(line) => line,
            None => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        let command = match parse_special_command(trimmed) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                continue;
            }
        };

        match command {
            SpecialCommand::Export(path) => {
                match export_report(&session, &config.export, path.as_deref()) {
                    Ok(written) => println!(
                        "{}",
                        format!("Report saved to {}", written.display()).green()
                    ),
                    Err(e) => eprintln!("{}", e.to_string().yellow()),
                }
            }
            SpecialCommand::History => print_history(session.turns()),
            SpecialCommand::ShowStatus => print_status(&session),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => break,
            SpecialCommand::None => {
                let exchange = send_message(&mut session, &gateway, trimmed).await?;
                print_turn(&exchange.reply);
                if !exchange.is_error() && session.interactions() == session.export_threshold() {
                    println!(
                        "{}",
                        "You can now export this conversation with /export.".green()
                    );
                }
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Collects and submits the form until feedback arrives
///
/// Returns `false` when the user leaves before feedback was given.
async fn run_form_phase(
    rl: &mut DefaultEditor,
    session: &mut Session,
    gateway: &CompletionGateway,
) -> Result<bool> {
    let mut pending: Option<ProjectForm> = None;

    while !session.feedback_given() {
        let form = match pending.take() {
            Some(form) => form,
            None => match collect_form(rl)? {
                Some(form) => form,
                None => return Ok(false),
            },
        };

        println!("{}", "Requesting feedback...".dimmed());
        match submit_form(session, gateway, &form).await {
            Ok(exchange) => {
                print_turn(&exchange.reply);
                if exchange.is_error() {
                    match read_line(rl, "Resubmit the same form? [Y/n] ")? {
                        Some(answer) if answer.trim().eq_ignore_ascii_case("n") => {}
                        Some(_) => pending = Some(form),
                        None => return Ok(false),
                    }
                }
            }
            Err(e) => match e.downcast_ref::<FeedloopError>() {
                Some(FeedloopError::IncompleteForm { .. }) => {
                    eprintln!("{}", format!("{}. Please fill in the form again.", e).yellow());
                }
                _ => return Err(e),
            },
        }
    }

    Ok(true)
}

/// Prompts for every form field; `None` if the user aborts
fn collect_form(rl: &mut DefaultEditor) -> Result<Option<ProjectForm>> {
    println!("\n{}", "Describe your project".bold());

    macro_rules! field {
        ($label:expr) => {
            match read_line(rl, &format!("{}: ", $label))? {
                Some(value) => value.trim().to_string(),
                None => return Ok(None),
            }
        };
    }

    let project_name = field!("Project name");
    let context = field!("Context");
    let problem = field!("Problem");
    let impact = field!("Impact");
    let proposed_solution = field!("Proposed solution");

    let project_type = match choose(rl, "Project type", &ProjectType::ALL)? {
        Some(choice) => choice,
        None => return Ok(None),
    };
    let user_profile = match choose(rl, "User profile", &UserProfile::ALL)? {
        Some(choice) => choice,
        None => return Ok(None),
    };

    let partner = field!("Partner (optional)");
    let partner_name = if partner.is_empty() {
        None
    } else {
        Some(partner)
    };

    Ok(Some(ProjectForm {
        project_name,
        context,
        problem,
        impact,
        proposed_solution,
        project_type,
        user_profile,
        partner_name,
    }))
}

/// Numbered menu; accepts the number or the option name
fn choose<T>(rl: &mut DefaultEditor, label: &str, options: &[T]) -> Result<Option<T>>
where
    T: Copy + std::fmt::Display + std::str::FromStr,
{
    let menu: Vec<String> = options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}) {}", i + 1, option))
        .collect();

    loop {
        println!("{}: {}", label, menu.join("  "));
        let answer = match read_line(rl, "> ")? {
            Some(answer) => answer,
            None => return Ok(None),
        };
        let answer = answer.trim();

        if let Some(choice) = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
        {
            return Ok(Some(*choice));
        }
        if let Ok(choice) = answer.parse::<T>() {
            return Ok(Some(choice));
        }
        println!("{}", "Please pick one of the listed options.".yellow());
    }
}

/// Reads one line; `None` on Ctrl-C or Ctrl-D
fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match rl.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => {
            tracing::error!("Readline error: {:?}", err);
            Err(err.into())
        }
    }
}

fn print_welcome_banner(gateway: &CompletionGateway) {
    println!(
        "\n{}  {}",
        "feedloop".cyan().bold(),
        format!("model: {}", gateway.provider().model()).dimmed()
    );
    println!(
        "{}\n",
        "Fill in the form below to get feedback on your project. Ctrl-D exits.".dimmed()
    );
}
