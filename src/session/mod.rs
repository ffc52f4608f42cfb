//! Session store for feedback conversations
//!
//! A [`Session`] owns one append-only conversation plus the counters that
//! gate follow-up messages and export. It is created when a chat starts,
//! mutated by the exchange flow in [`flow`], and dropped when the chat ends.

pub mod flow;
pub mod form;

pub use flow::{send_message, submit_form, Exchange};
pub use form::{ProjectForm, ProjectType, UserProfile};

use crate::config::SessionConfig;
use crate::error::{FeedloopError, Result};
use crate::providers::Turn;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One student's feedback conversation
///
/// # Examples
///
/// ```
/// use feedloop::session::Session;
///
/// let mut session = Session::new(3, Some("How can I help you?".to_string()));
/// assert_eq!(session.len(), 1);
///
/// session.append_user_turn("Is my problem statement clear?").unwrap();
/// session.append_assistant_turn("Mostly. Quantify who is affected.");
/// assert_eq!(session.len(), 3);
/// assert!(!session.export_ready());
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    turns: Vec<Turn>,
    feedback_given: bool,
    interactions: usize,
    export_threshold: usize,
}

impl Session {
    /// Creates a session, optionally seeded with an assistant greeting
    ///
    /// # Arguments
    ///
    /// * `export_threshold` - Follow-up exchanges required before export
    /// * `greeting` - Assistant turn placed first in the conversation
    pub fn new(export_threshold: usize, greeting: Option<String>) -> Self {
        let turns = greeting
            .filter(|g| !g.trim().is_empty())
            .map(|g| vec![Turn::assistant(g)])
            .unwrap_or_default();

        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            turns,
            feedback_given: false,
            interactions: 0,
            export_threshold,
        };
        tracing::debug!("Created session {}", session.id);
        session
    }

    /// Creates a session from the `session` configuration section
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.export_threshold, config.greeting.clone())
    }

    /// Appends a user turn
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the conversation untouched, when
    /// `text` is blank
    pub fn append_user_turn(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(FeedloopError::Validation("Message cannot be empty".to_string()).into());
        }
        self.turns.push(Turn::user(text));
        Ok(())
    }

    /// Appends an assistant reply
    pub fn append_assistant_turn(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::assistant(text));
    }

    /// Appends an assistant turn carrying a recovered failure message
    pub fn append_assistant_error(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::assistant_error(text));
    }

    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Records that the initial feedback was delivered
    pub fn mark_feedback_given(&mut self) {
        self.feedback_given = true;
    }

    /// Counts one successful follow-up exchange
    pub fn increment_interactions(&mut self) {
        self.interactions += 1;
    }

    /// Owned copy of the conversation in order
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// True once enough follow-up exchanges have completed
    pub fn export_ready(&self) -> bool {
        self.interactions >= self.export_threshold
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn interactions(&self) -> usize {
        self.interactions
    }

    pub fn feedback_given(&self) -> bool {
        self.feedback_given
    }

    pub fn export_threshold(&self) -> usize {
        self.export_threshold
    }
}
