//! Exchange flow binding a session to the completion gateway
//!
//! Each operation performs one full exchange: append the user turn, await
//! the gateway, append the reply, then update the counters.

use super::{ProjectForm, Session};
use crate::error::{FailureKind, FeedloopError, Result};
use crate::gateway::CompletionGateway;
use crate::providers::Turn;

/// Result of one exchange
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    /// Assistant turn appended to the session
    pub reply: Turn,
    /// Failure class when the reply is a recovered error
    pub failure: Option<FailureKind>,
}

impl Exchange {
    pub fn is_error(&self) -> bool {
        self.failure.is_some()
    }
}

/// Submits the project form and records the initial feedback
///
/// On a gateway failure the error reply is still appended, but feedback is
/// not marked as given, so the form can be submitted again.
///
/// # Errors
///
/// Returns `IncompleteForm` when required fields are blank; the session is
/// not modified in that case
pub async fn submit_form(
    session: &mut Session,
    gateway: &CompletionGateway,
    form: &ProjectForm,
) -> Result<Exchange> {
    if let Err(err) = form.validate() {
        tracing::warn!("Form rejected: {}", err);
        return Err(err);
    }

    session.append_user_turn(form.to_prompt())?;
    let exchange = run_exchange(session, gateway).await;

    if exchange.is_error() {
        tracing::warn!("Initial feedback failed for session {}", session.id());
    } else {
        session.mark_feedback_given();
        tracing::info!("Initial feedback delivered for session {}", session.id());
    }

    Ok(exchange)
}

/// Sends a follow-up message
///
/// Successful exchanges count toward the export threshold; failed ones do not.
///
/// # Errors
///
/// Returns a validation error, without modifying the session, when the text
/// is blank or the form has not received feedback yet
pub async fn send_message(
    session: &mut Session,
    gateway: &CompletionGateway,
    text: &str,
) -> Result<Exchange> {
    if text.trim().is_empty() {
        return Err(FeedloopError::Validation("Message cannot be empty".to_string()).into());
    }
    if !session.feedback_given() {
        return Err(FeedloopError::Validation(
            "Submit the project form before sending follow-up messages".to_string(),
        )
        .into());
    }

    session.append_user_turn(text)?;
    let exchange = run_exchange(session, gateway).await;

    if !exchange.is_error() {
        session.increment_interactions();
        tracing::debug!(
            "Session {} at {}/{} exchanges",
            session.id(),
            session.interactions(),
            session.export_threshold()
        );
    }

    Ok(exchange)
}

async fn run_exchange(session: &mut Session, gateway: &CompletionGateway) -> Exchange {
    let reply = gateway.complete(session.turns()).await;
    let failure = reply.failure;
    let turn = reply.into_turn();
    session.push_turn(turn.clone());
    Exchange {
        reply: turn,
        failure,
    }
}
