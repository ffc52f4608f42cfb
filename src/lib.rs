//! Feedloop - project feedback chat library
//!
//! This library provides the core functionality behind the Feedloop CLI: a
//! session store for feedback conversations, a completion gateway that talks
//! to an OpenAI-compatible endpoint, and PDF export of transcripts.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Conversation store, project form, and the exchange flow
//! - `gateway`: System prompt injection, failure recovery, citation filtering
//! - `providers`: Completion provider abstraction and the OpenRouter client
//! - `export`: Transcript layout and PDF rendering
//! - `prompts`: Built-in system instruction and disclaimer
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use feedloop::{CompletionGateway, Config, Session};
//! use feedloop::session::{submit_form, ProjectForm};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let gateway = CompletionGateway::from_config(&config)?;
//!     let mut session = Session::from_config(&config.session);
//!     let form = ProjectForm::from_yaml_file("form.yaml")?;
//!
//!     let exchange = submit_form(&mut session, &gateway, &form).await?;
//!     println!("{}", exchange.reply.content);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod prompts;
pub mod providers;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{FailureKind, FeedloopError, Result};
pub use export::{export_session, ExportArtifact};
pub use gateway::{CompletionGateway, GatewayReply};
pub use session::{Exchange, ProjectForm, Session};

#[cfg(test)]
pub mod test_utils;
