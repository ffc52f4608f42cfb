//! OpenRouter provider implementation for Feedloop
//!
//! This module implements the Provider trait for OpenRouter and any other
//! OpenAI-compatible `/chat/completions` endpoint. One POST per call, no
//! streaming, no retries.

use crate::config::OpenRouterConfig;
use crate::error::{FeedloopError, Result};
use crate::providers::{ChatMessage, CompletionResponse, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider identifier
const PROVIDER_NAME: &str = "openrouter";

/// OpenRouter chat-completions provider
///
/// # Examples
///
/// ```no_run
/// use feedloop::config::OpenRouterConfig;
/// use feedloop::providers::{ChatMessage, OpenRouterProvider, Provider};
///
/// # async fn example() -> feedloop::error::Result<()> {
/// let config = OpenRouterConfig {
///     api_key: Some("sk-or-...".to_string()),
///     ..Default::default()
/// };
/// let provider = OpenRouterProvider::new(config)?;
/// let messages = vec![ChatMessage { role: "user".into(), content: "Hello!".into() }];
/// let completion = provider.complete(&messages).await?;
/// println!("{}", completion.content);
/// # Ok(())
/// # }
/// ```
pub struct OpenRouterProvider {
    client: Client,
    config: OpenRouterConfig,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// Response body from `/chat/completions`
///
/// Every field is optional so that incomplete bodies surface as
/// `MalformedResponse` instead of a deserialization failure.
#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    #[serde(default)]
    choices: Vec<OpenRouterChoice>,
    #[serde(default)]
    usage: Option<OpenRouterUsage>,
    #[serde(default)]
    error: Option<OpenRouterErrorBody>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    #[serde(default)]
    message: Option<OpenRouterMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// In-band error object some providers return with a 200 status
#[derive(Debug, Deserialize)]
struct OpenRouterErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Maps a non-success status to the matching error
///
/// 401 and 403 are credential problems; every other status is a generic
/// provider error.
fn classify_status(status: StatusCode, body: &str) -> FeedloopError {
    let body = body.trim().to_string();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        FeedloopError::Authentication {
            status: status.as_u16(),
            body,
        }
    } else {
        FeedloopError::ProviderStatus {
            status: status.as_u16(),
            body,
        }
    }
}

/// Extracts the first choice's message content from a success body
fn parse_completion(body: &str) -> Result<CompletionResponse> {
    if body.trim().is_empty() {
        return Err(FeedloopError::MalformedResponse("empty response body".to_string()).into());
    }

    let response: OpenRouterResponse = serde_json::from_str(body).map_err(|e| {
        FeedloopError::MalformedResponse(format!("response is not valid JSON: {}", e))
    })?;

    if let Some(error) = response.error {
        let code = error
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return Err(FeedloopError::MalformedResponse(format!(
            "provider reported an error (code {}): {}",
            code, error.message
        ))
        .into());
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| FeedloopError::MalformedResponse("no choices in response".to_string()))?;

    let message = choice.message.ok_or_else(|| {
        FeedloopError::MalformedResponse("first choice has no message".to_string())
    })?;

    if let Some(role) = &message.role {
        if role != "assistant" {
            tracing::debug!("Unexpected reply role from provider: {}", role);
        }
    }

    let content = message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            FeedloopError::MalformedResponse(format!(
                "first choice has no content (finish_reason: {})",
                choice.finish_reason.as_deref().unwrap_or("none")
            ))
        })?;

    Ok(match response.usage {
        Some(u) => CompletionResponse::with_usage(
            content,
            TokenUsage::new(u.prompt_tokens, u.completion_tokens),
        ),
        None => CompletionResponse::new(content),
    })
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider instance
    ///
    /// A missing API key is not an error here; it is reported by
    /// [`Provider::complete`] before any request is made.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use feedloop::config::OpenRouterConfig;
    /// use feedloop::providers::OpenRouterProvider;
    ///
    /// let provider = OpenRouterProvider::new(OpenRouterConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("feedloop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedloopError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized OpenRouter provider: api_base={}, model={}, credential={}",
            config.api_base,
            config.model,
            if config.api_key.is_some() { "set" } else { "missing" }
        );

        Ok(Self { client, config })
    }

    /// Full URL of the chat-completions endpoint
    ///
    /// # Examples
    ///
    /// ```
    /// use feedloop::config::OpenRouterConfig;
    /// use feedloop::providers::OpenRouterProvider;
    ///
    /// let config = OpenRouterConfig {
    ///     api_base: "http://localhost:8080/v1/".to_string(),
    ///     ..Default::default()
    /// };
    /// let provider = OpenRouterProvider::new(config).unwrap();
    /// assert_eq!(provider.completions_url(), "http://localhost:8080/v1/chat/completions");
    /// ```
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    fn api_key(&self) -> Result<&str> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(FeedloopError::MissingCredentials {
                provider: PROVIDER_NAME.to_string(),
                env_var: self.config.api_key_env.clone(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionResponse> {
        let api_key = self.api_key()?;

        let request = OpenRouterRequest {
            model: &self.config.model,
            messages,
        };

        tracing::debug!(
            "Sending OpenRouter request: model={}, {} messages",
            self.config.model,
            messages.len()
        );

        let mut builder = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request);
        if let Some(referer) = &self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("OpenRouter request failed: {}", e);
            let detail = if e.is_timeout() {
                format!("request timed out after {}s", self.config.timeout_seconds)
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                e.to_string()
            };
            FeedloopError::Transport(detail)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read OpenRouter response body: {}", e);
            FeedloopError::Transport(format!("failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            tracing::error!("OpenRouter returned error {}: {}", status, body);
            return Err(classify_status(status, &body).into());
        }

        let completion = parse_completion(&body).map_err(|e| {
            tracing::error!("Unusable OpenRouter response: {}", e);
            e
        })?;

        if let Some(usage) = completion.usage {
            tracing::debug!(
                "OpenRouter response: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downcast(err: anyhow::Error) -> FeedloopError {
        err.downcast::<FeedloopError>().expect("typed error")
    }

    #[test]
    fn test_provider_creation_without_key() {
        let provider = OpenRouterProvider::new(OpenRouterConfig::default()).unwrap();
        assert_eq!(provider.name(), "openrouter");
        assert_eq!(provider.model(), "deepseek/deepseek-r1:free");
    }

    #[test]
    fn test_completions_url_default() {
        let provider = OpenRouterProvider::new(OpenRouterConfig::default()).unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_api_key_missing_and_blank() {
        let provider = OpenRouterProvider::new(OpenRouterConfig::default()).unwrap();
        assert!(matches!(
            downcast(provider.api_key().unwrap_err()),
            FeedloopError::MissingCredentials { .. }
        ));

        let provider = OpenRouterProvider::new(OpenRouterConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(provider.api_key().is_err());
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "nope"),
            FeedloopError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, ""),
            FeedloopError::Authentication { status: 403, .. }
        ));
        match classify_status(StatusCode::TOO_MANY_REQUESTS, " slow down \n") {
            FeedloopError::ProviderStatus { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_completion_success() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Looks promising."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }"#;
        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.content, "Looks promising.");
        assert_eq!(completion.usage, Some(TokenUsage::new(12, 3)));
    }

    #[test]
    fn test_parse_completion_no_choices() {
        let err = downcast(parse_completion(r#"{"choices": []}"#).unwrap_err());
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn test_parse_completion_missing_message() {
        let body = r#"{"choices": [{"finish_reason": "stop"}]}"#;
        let err = downcast(parse_completion(body).unwrap_err());
        assert!(err.to_string().contains("no message"));
    }

    #[test]
    fn test_parse_completion_empty_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": ""}, "finish_reason": "length"}]}"#;
        let err = downcast(parse_completion(body).unwrap_err());
        assert!(err.to_string().contains("no content"));
        assert!(err.to_string().contains("length"));
    }

    #[test]
    fn test_parse_completion_invalid_json_and_empty_body() {
        assert!(matches!(
            downcast(parse_completion("<html>oops</html>").unwrap_err()),
            FeedloopError::MalformedResponse(_)
        ));
        assert!(matches!(
            downcast(parse_completion("   ").unwrap_err()),
            FeedloopError::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_parse_completion_in_band_error() {
        let body = r#"{"error": {"message": "Rate limit exceeded", "code": 429}}"#;
        let err = downcast(parse_completion(body).unwrap_err());
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("Rate limit exceeded"));
    }
}
