//! Base provider trait and common types for Feedloop
//!
//! This module defines the Provider trait that completion providers implement,
//! the conversation turn model shared with the session store, and the wire
//! message type sent to chat-completion endpoints.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction injected ahead of the conversation
    System,
    /// The student
    User,
    /// The model
    Assistant,
}

impl Role {
    /// Wire tag used by chat-completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Label used when rendering a transcript
    pub fn label(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One message of a conversation
///
/// Turns are append-only: once stored in a session they are never edited,
/// reordered, or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Speaker of the turn
    pub role: Role,
    /// Text of the turn
    pub content: String,
    /// Content is a recovered completion failure rather than a model reply
    #[serde(default)]
    pub is_error: bool,
    /// When the turn was created
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Creates a user turn
    ///
    /// # Examples
    ///
    /// ```
    /// use feedloop::providers::{Role, Turn};
    ///
    /// let turn = Turn::user("Hello!");
    /// assert_eq!(turn.role, Role::User);
    /// assert!(!turn.is_error);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, false)
    }

    /// Creates an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, false)
    }

    /// Creates an assistant turn carrying a recovered failure message
    ///
    /// # Examples
    ///
    /// ```
    /// use feedloop::providers::{Role, Turn};
    ///
    /// let turn = Turn::assistant_error("Service unavailable");
    /// assert_eq!(turn.role, Role::Assistant);
    /// assert!(turn.is_error);
    /// ```
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, true)
    }

    /// Creates a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, false)
    }

    fn new(role: Role, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            role,
            content: content.into(),
            is_error,
            created_at: Utc::now(),
        }
    }
}

/// Message in the shape chat-completion endpoints expect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role tag (`system`, `user`, `assistant`)
    pub role: String,
    /// Message text
    pub content: String,
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

/// Token usage information from a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use feedloop::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with reply text and optional token usage
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Reply text of the first choice
    pub content: String,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(content: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            content: content.into(),
            usage: Some(usage),
        }
    }
}

/// Provider trait for chat-completion backends
///
/// A provider performs exactly one request per call and reports failures
/// as typed [`FeedloopError`](crate::error::FeedloopError) values wrapped in
/// `anyhow::Error`. It never retries.
///
/// # Examples
///
/// ```no_run
/// use feedloop::providers::{ChatMessage, CompletionResponse, Provider};
/// use feedloop::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn model(&self) -> String {
///         "echo-1".to_string()
///     }
///
///     async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionResponse> {
///         let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
///         Ok(CompletionResponse::new(last))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider identifier used in logs and messages
    fn name(&self) -> &str;

    /// Model the provider sends requests to
    fn model(&self) -> String;

    /// Completes a conversation
    ///
    /// # Arguments
    ///
    /// * `messages` - Full request sequence, system instruction included
    ///
    /// # Errors
    ///
    /// Returns error if the credential is missing, the request fails,
    /// the provider answers with a non-success status, or the body is unusable
    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionResponse>;
}
