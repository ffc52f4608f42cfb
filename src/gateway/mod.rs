//! Completion gateway
//!
//! Turns a conversation into a single assistant reply. The gateway prepends
//! the system instruction, delegates the request to a [`Provider`], and
//! recovers every failure into a human-readable message, so callers always
//! get text back.

pub mod filter;

pub use filter::{
    CitationFilter, DoiPatternFilter, SubstringCitationFilter, DEFAULT_CITATION_MARKERS,
};

use crate::config::Config;
use crate::error::{FailureKind, FeedloopError, Result};
use crate::prompts;
use crate::providers::{create_provider, ChatMessage, Provider, Turn};

/// Outcome of one completion call
///
/// `content` is either the (possibly disclaimed) model reply or the message
/// describing why no reply was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReply {
    /// Text to store as the assistant turn
    pub content: String,
    /// Failure class, `None` on success
    pub failure: Option<FailureKind>,
}

impl GatewayReply {
    /// True when the content describes a failure
    pub fn is_error(&self) -> bool {
        self.failure.is_some()
    }

    /// Converts the reply into the assistant turn to append
    pub fn into_turn(self) -> Turn {
        if self.is_error() {
            Turn::assistant_error(self.content)
        } else {
            Turn::assistant(self.content)
        }
    }
}

/// Stateless boundary between a session and the completion provider
///
/// # Examples
///
/// ```no_run
/// use feedloop::config::Config;
/// use feedloop::gateway::CompletionGateway;
/// use feedloop::providers::Turn;
///
/// # async fn example() -> feedloop::error::Result<()> {
/// let gateway = CompletionGateway::from_config(&Config::default())?;
/// let reply = gateway.complete(&[Turn::user("Project: Solar kiosks")]).await;
/// println!("{}", reply.content);
/// # Ok(())
/// # }
/// ```
pub struct CompletionGateway {
    provider: Box<dyn Provider>,
    system_prompt: String,
    filter: Box<dyn CitationFilter>,
    disclaimer: String,
}

impl CompletionGateway {
    /// Creates a gateway with the default citation filter and disclaimer
    pub fn new(provider: Box<dyn Provider>, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            filter: Box::new(SubstringCitationFilter::default()),
            disclaimer: prompts::DEFAULT_CITATION_DISCLAIMER.to_string(),
        }
    }

    /// Builds the provider and prompts from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_provider(&config.provider)?;
        Ok(Self::new(provider, prompts::build_system_prompt(&config.feedback))
            .with_disclaimer(prompts::citation_disclaimer(&config.feedback)))
    }

    /// Replaces the citation filter
    pub fn with_filter(mut self, filter: Box<dyn CitationFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Replaces the disclaimer sentence
    pub fn with_disclaimer(mut self, disclaimer: impl Into<String>) -> Self {
        self.disclaimer = disclaimer.into();
        self
    }

    /// The provider requests are sent to
    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// System instruction prepended to every request
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Request sequence for a conversation: system instruction first
    pub fn build_messages(&self, turns: &[Turn]) -> Vec<ChatMessage> {
        std::iter::once(ChatMessage::from(&Turn::system(self.system_prompt.as_str())))
            .chain(turns.iter().map(ChatMessage::from))
            .collect()
    }

    /// Produces the assistant reply for a conversation
    ///
    /// Never fails: provider errors come back as a reply whose `failure`
    /// is set and whose content explains the problem.
    pub async fn complete(&self, turns: &[Turn]) -> GatewayReply {
        let messages = self.build_messages(turns);

        tracing::debug!(
            "Requesting completion from {} ({} turns)",
            self.provider.name(),
            turns.len()
        );

        match self.provider.complete(&messages).await {
            Ok(response) => GatewayReply {
                content: self.apply_citation_filter(response.content),
                failure: None,
            },
            Err(err) => recover(err),
        }
    }

    fn apply_citation_filter(&self, reply: String) -> String {
        if self.filter.flags(&reply) {
            tracing::info!("Reply contains citation markers, prepending disclaimer");
            format!("{}\n\n{}", self.disclaimer, reply)
        } else {
            reply
        }
    }
}

/// Converts a provider error into the reply shown to the student
fn recover(err: anyhow::Error) -> GatewayReply {
    match err.downcast_ref::<FeedloopError>() {
        Some(typed) => {
            let kind = typed.failure_kind().unwrap_or(FailureKind::Provider);
            tracing::warn!("Completion failed ({}): {}", kind, typed);
            GatewayReply {
                content: typed.user_message(),
                failure: Some(kind),
            }
        }
        None => {
            tracing::warn!("Completion failed with unexpected error: {:#}", err);
            GatewayReply {
                content: format!("Unexpected error while requesting feedback: {}", err),
                failure: Some(FailureKind::Provider),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Role;
    use crate::test_utils::{ScriptedProvider, ScriptedReply};

    fn gateway_with(replies: Vec<ScriptedReply>) -> (CompletionGateway, ScriptedProvider) {
        let provider = ScriptedProvider::new(replies);
        let handle = provider.clone();
        (CompletionGateway::new(Box::new(provider), "SYSTEM"), handle)
    }

    #[tokio::test]
    async fn test_complete_prepends_system_turn() {
        let (gateway, handle) = gateway_with(vec![ScriptedReply::text("Nice idea")]);
        let turns = vec![Turn::assistant("How can I help you?"), Turn::user("Form")];

        let reply = gateway.complete(&turns).await;
        assert_eq!(reply.content, "Nice idea");
        assert!(!reply.is_error());

        let requests = handle.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].role, "system");
        assert_eq!(sent[0].content, "SYSTEM");
        assert_eq!(sent[1].role, "assistant");
        assert_eq!(sent[2].content, "Form");
    }

    #[tokio::test]
    async fn test_complete_adds_disclaimer_for_citations() {
        let (gateway, _) =
            gateway_with(vec![ScriptedReply::text("Lopez et al. showed this works")]);
        let reply = gateway.complete(&[Turn::user("Form")]).await;

        assert!(reply.content.starts_with(prompts::DEFAULT_CITATION_DISCLAIMER));
        assert!(reply.content.ends_with("Lopez et al. showed this works"));
        assert!(!reply.is_error());
    }

    #[tokio::test]
    async fn test_complete_leaves_clean_reply_unchanged() {
        let (gateway, _) = gateway_with(vec![ScriptedReply::text("Talk to users first.")]);
        let reply = gateway.complete(&[Turn::user("Form")]).await;
        assert_eq!(reply.content, "Talk to users first.");
    }

    #[tokio::test]
    async fn test_custom_filter_replaces_default() {
        let (gateway, _) = gateway_with(vec![ScriptedReply::text("Grow 10.5% monthly")]);
        let gateway = gateway.with_filter(Box::new(DoiPatternFilter::new().unwrap()));
        let reply = gateway.complete(&[Turn::user("Form")]).await;
        assert_eq!(reply.content, "Grow 10.5% monthly");
    }

    #[tokio::test]
    async fn test_custom_disclaimer() {
        let (gateway, _) = gateway_with(vec![ScriptedReply::text("DOI: 10.1/x")]);
        let gateway = gateway.with_disclaimer("CHECK SOURCES");
        let reply = gateway.complete(&[Turn::user("Form")]).await;
        assert!(reply.content.starts_with("CHECK SOURCES\n\n"));
    }

    #[tokio::test]
    async fn test_failures_are_recovered_into_text() {
        let (gateway, handle) = gateway_with(vec![
            ScriptedReply::fail(FeedloopError::Transport("connection reset".into())),
            ScriptedReply::fail(FeedloopError::Authentication {
                status: 401,
                body: "invalid key".into(),
            }),
            ScriptedReply::fail(FeedloopError::ProviderStatus {
                status: 502,
                body: "bad gateway".into(),
            }),
            ScriptedReply::fail(FeedloopError::MalformedResponse("no choices".into())),
        ]);

        let transport = gateway.complete(&[]).await;
        assert_eq!(transport.failure, Some(FailureKind::Transport));
        assert!(transport.content.contains("connection reset"));

        let auth = gateway.complete(&[]).await;
        assert_eq!(auth.failure, Some(FailureKind::Authentication));
        assert!(auth.content.contains("invalid"));

        let generic = gateway.complete(&[]).await;
        assert_eq!(generic.failure, Some(FailureKind::Provider));
        assert!(generic.content.contains("502"));
        assert!(generic.content.contains("bad gateway"));
        assert_ne!(auth.content, generic.content);

        let protocol = gateway.complete(&[]).await;
        assert_eq!(protocol.failure, Some(FailureKind::Protocol));
        assert!(protocol.content.contains("no choices"));

        assert_eq!(handle.calls(), 4);
    }

    #[tokio::test]
    async fn test_error_replies_skip_citation_filter() {
        let (gateway, _) = gateway_with(vec![ScriptedReply::fail(
            FeedloopError::ProviderStatus {
                status: 500,
                body: "see doi.org".into(),
            },
        )]);
        let reply = gateway.complete(&[]).await;
        assert!(!reply.content.starts_with(prompts::DEFAULT_CITATION_DISCLAIMER));
    }

    #[tokio::test]
    async fn test_untyped_error_is_recovered() {
        let (gateway, _) = gateway_with(vec![ScriptedReply::Untyped("boom".to_string())]);
        let reply = gateway.complete(&[]).await;
        assert_eq!(reply.failure, Some(FailureKind::Provider));
        assert!(reply.content.contains("boom"));
    }

    #[test]
    fn test_reply_into_turn() {
        let ok = GatewayReply {
            content: "fine".into(),
            failure: None,
        }
        .into_turn();
        assert_eq!(ok.role, Role::Assistant);
        assert!(!ok.is_error);

        let failed = GatewayReply {
            content: "down".into(),
            failure: Some(FailureKind::Transport),
        }
        .into_turn();
        assert!(failed.is_error);
    }

    #[test]
    fn test_from_config_uses_configured_prompt() {
        let mut config = Config::default();
        config.feedback.system_prompt = Some("Be kind.".to_string());
        let gateway = CompletionGateway::from_config(&config).unwrap();
        assert_eq!(gateway.system_prompt(), "Be kind.");
        assert_eq!(gateway.provider().name(), "openrouter");
    }
}
