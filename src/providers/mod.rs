//! Provider module for Feedloop
//!
//! This module contains the completion provider abstraction and the
//! OpenRouter (OpenAI-compatible) implementation.

pub mod base;
pub mod openrouter;

pub use base::{ChatMessage, CompletionResponse, Provider, Role, TokenUsage, Turn};
pub use openrouter::OpenRouterProvider;

use crate::config::ProviderConfig;
use crate::error::{FeedloopError, Result};

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a boxed provider instance
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
///
/// # Examples
///
/// ```
/// use feedloop::config::{OpenRouterConfig, ProviderConfig};
/// use feedloop::providers::create_provider;
///
/// let config = ProviderConfig {
///     provider_type: "openrouter".to_string(),
///     openrouter: OpenRouterConfig::default(),
/// };
/// let provider = create_provider(&config).unwrap();
/// assert_eq!(provider.name(), "openrouter");
/// ```
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "openrouter" => Ok(Box::new(OpenRouterProvider::new(
            config.openrouter.clone(),
        )?)),
        other => Err(FeedloopError::Config(format!("Unknown provider type: {}", other)).into()),
    }
}
