//! OpenAI chat-completions implementation.

use super::{LanguageModel, Prompt};
use crate::config::ModelSettings;
use crate::error::{DelveError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model served by the OpenAI API or an OpenAI-compatible endpoint.
pub struct OpenAIModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIModel {
    /// Create a model client from settings.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    fn build_messages(prompt: &Prompt) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);

        if let Some(system) = &prompt.system {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.clone())
                    .build()
                    .map_err(|e| DelveError::OpenAI(e.to_string()))?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user.clone())
                .build()
                .map_err(|e| DelveError::OpenAI(e.to_string()))?
                .into(),
        );

        Ok(messages)
    }
}

#[async_trait]
impl LanguageModel for OpenAIModel {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.user.len()))]
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::build_messages(prompt)?)
            .temperature(self.temperature)
            .build()
            .map_err(|e| DelveError::OpenAI(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| DelveError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| DelveError::OpenAI("Empty response from model".to_string()))?
            .clone();

        debug!("Model returned {} chars", content.len());
        Ok(content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
