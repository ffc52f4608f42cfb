//! Error types for Feedloop
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Classification of a failed completion call
///
/// The gateway recovers every failure into a message string; this kind is
/// kept alongside so the caller can tell what went wrong without parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing or empty credential, detected before any network call
    Configuration,
    /// Network or connection failure
    Transport,
    /// Provider rejected the credential (401/403)
    Authentication,
    /// Any other non-success HTTP status
    Provider,
    /// Success status with an unusable body
    Protocol,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Transport => write!(f, "transport"),
            Self::Authentication => write!(f, "authentication"),
            Self::Provider => write!(f, "provider"),
            Self::Protocol => write!(f, "protocol"),
        }
    }
}

/// Main error type for Feedloop operations
#[derive(Error, Debug)]
pub enum FeedloopError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No credential available for the provider
    #[error("Missing credentials for provider {provider}: set {env_var}")]
    MissingCredentials {
        /// Provider name
        provider: String,
        /// Environment variable expected to hold the credential
        env_var: String,
    },

    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider rejected the credential
    #[error("Authentication error: HTTP {status}: {body}")]
    Authentication {
        /// HTTP status code (401 or 403)
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {body}")]
    ProviderStatus {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Provider answered successfully but the body is unusable
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// One or more required form fields are empty
    #[error("Incomplete form: missing {}", missing.join(", "))]
    IncompleteForm {
        /// Labels of the missing fields
        missing: Vec<String>,
    },

    /// Input rejected before touching the session
    #[error("Validation error: {0}")]
    Validation(String),

    /// Export requested before enough exchanges
    #[error("Export not available yet: {interactions} of {threshold} exchanges completed")]
    ExportNotReady {
        /// Completed follow-up exchanges
        interactions: usize,
        /// Exchanges required before export
        threshold: usize,
    },

    /// Document rendering failed
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FeedloopError {
    /// Returns the completion failure class for provider-side errors
    ///
    /// Errors unrelated to a completion call return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use feedloop::error::{FailureKind, FeedloopError};
    ///
    /// let err = FeedloopError::Authentication { status: 401, body: String::new() };
    /// assert_eq!(err.failure_kind(), Some(FailureKind::Authentication));
    /// ```
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::MissingCredentials { .. } => Some(FailureKind::Configuration),
            Self::Transport(_) => Some(FailureKind::Transport),
            Self::Authentication { .. } => Some(FailureKind::Authentication),
            Self::ProviderStatus { .. } => Some(FailureKind::Provider),
            Self::MalformedResponse(_) | Self::Serialization(_) => Some(FailureKind::Protocol),
            _ => None,
        }
    }

    /// Human-readable text shown to the student in place of a reply
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredentials { provider, env_var } => format!(
                "No credential configured for the {} feedback service. Set the {} environment variable and try again.",
                provider, env_var
            ),
            Self::Transport(detail) => format!(
                "Could not reach the feedback service ({}). Check your connection and send your message again.",
                detail
            ),
            Self::Authentication { status, body } => {
                let mut msg = format!(
                    "Authentication failed (HTTP {}): the API credential is invalid or not authorized. Verify your API key.",
                    status
                );
                if !body.is_empty() {
                    msg.push_str(&format!(" Details: {}", body));
                }
                msg
            }
            Self::ProviderStatus { status, body } => {
                let mut msg = format!("The feedback service returned an error (HTTP {}).", status);
                if !body.is_empty() {
                    msg.push_str(&format!(" Details: {}", body));
                }
                msg
            }
            Self::MalformedResponse(detail) => format!(
                "The feedback service returned an unusable response: {}",
                detail
            ),
            other => format!("Error: {}", other),
        }
    }
}

/// Result type alias for Feedloop operations
///
/// Uses `anyhow::Error` so typed errors can carry context and be recovered
/// with `downcast_ref::<FeedloopError>()`.
pub type Result<T> = anyhow::Result<T>;
