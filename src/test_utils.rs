//! Test utilities for Feedloop
//!
//! This module provides a scripted completion provider, temporary file
//! helpers, and assertion helpers shared by unit tests.

use crate::config::Config;
use crate::error::{FeedloopError, Result};
use crate::providers::{ChatMessage, CompletionResponse, Provider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Reply a [`ScriptedProvider`] hands out for one call
#[derive(Debug)]
pub enum ScriptedReply {
    /// Successful completion with the given text
    Text(String),
    /// Typed provider failure
    Fail(FeedloopError),
    /// Failure that is not a `FeedloopError`
    Untyped(String),
}

impl ScriptedReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn fail(err: FeedloopError) -> Self {
        Self::Fail(err)
    }
}

/// Provider double that replays queued replies and records every request
///
/// Clones share the queue and the recordings, so a test can keep a handle
/// after boxing the provider into a gateway. An empty queue answers with
/// `"ok"`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            ..Default::default()
        }
    }

    /// Number of `complete` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message sequences received, in call order
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> String {
        "scripted-model".to_string()
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages.to_vec());

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(ScriptedReply::Text(content)) => Ok(CompletionResponse::new(content)),
            Some(ScriptedReply::Fail(err)) => Err(err.into()),
            Some(ScriptedReply::Untyped(msg)) => Err(anyhow::anyhow!(msg)),
            None => Ok(CompletionResponse::new("ok")),
        }
    }
}

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Default configuration with a low export threshold
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.session.export_threshold = 2;
    config
}

/// Form YAML with every field filled in
pub fn test_form_yaml() -> String {
    r#"
project_name: Solar Kiosks
context: Rural schools without reliable power
problem: Students cannot charge tablets used for homework
impact: 300 students gain two extra study hours per day
proposed_solution: Shared solar charging kiosks run by student clubs
project_type: social
user_profile: student
partner_name: Green Futures NGO
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_provider_replays_in_order() {
        let provider = ScriptedProvider::new(vec![
            ScriptedReply::text("first"),
            ScriptedReply::fail(FeedloopError::Transport("down".into())),
        ]);
        let handle = provider.clone();

        let first = provider.complete(&[]).await.unwrap();
        assert_eq!(first.content, "first");
        assert!(provider.complete(&[]).await.is_err());
        assert_eq!(provider.complete(&[]).await.unwrap().content, "ok");
        assert_eq!(handle.calls(), 3);
        assert_eq!(handle.requests().len(), 3);
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "form.yaml", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(FeedloopError::Config("test error message".into()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_test_config_validates() {
        let config = test_config();
        assert_eq!(config.session.export_threshold, 2);
        assert!(config.validate().is_ok());
    }
}
