//! Language model abstraction.
//!
//! Strategies only need "rendered prompt in, text out", so the trait is kept
//! that narrow and the OpenAI client stays behind it.

mod openai;

pub use openai::OpenAIModel;

use crate::error::Result;
use async_trait::async_trait;

/// A rendered prompt: an optional system instruction and the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

impl Prompt {
    /// A prompt made of a single user message.
    pub fn user(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }

    /// A prompt with a system instruction followed by a user message.
    pub fn with_system(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
        }
    }
}

/// Trait for text generation.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the prompt.
    async fn complete(&self, prompt: &Prompt) -> Result<String>;

    /// Model identifier, for logs.
    fn name(&self) -> &str;
}
