//! LLM API interaction.
//!
//! This module provides the seam between the classifier and whatever
//! text-generation backend answers its prompts.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`ChatClient`]: OpenAI-compatible chat-completions client (Groq by default)
//!
//! The client is built once by the caller and handed to the classifier, so its
//! credentials and lifetime are owned by `main`, not by a global.

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use std::error::Error;
use std::fmt;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Boxed error returned across the LLM seam.
pub type AskError = Box<dyn Error + Send + Sync>;

/// Trait for async LLM interaction.
///
/// Implementors of this trait can send text to an LLM and receive a response.
/// This abstraction lets the classifier run against a real backend or a
/// scripted stand-in.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    ///
    /// # Arguments
    ///
    /// * `text` - The prompt to send
    ///
    /// # Returns
    ///
    /// The LLM's response, or an error if the request failed.
    async fn ask(&self, text: &str) -> Result<Self::Response, AskError>;
}

/// Chat-completions client for any OpenAI-compatible endpoint.
///
/// Each [`ask`](AskAsync::ask) sends the text as a single user message and
/// returns the first choice's content.
pub struct ChatClient {
    client: Client<OpenAIConfig>,
    model: String,
    api_base: String,
}

impl ChatClient {
    /// Build a client for `api_base` using `model`.
    ///
    /// A missing key is not rejected here; the endpoint will refuse the call
    /// and the classifier falls back.
    pub fn new(api_key: Option<&str>, api_base: &str, model: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.unwrap_or_default())
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            api_base: api_base.to_string(),
        }
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AskAsync for ChatClient {
    type Response = String;

    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, AskError> {
        let t0 = Instant::now();

        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(user)])
            .build()?;

        let response = match self.client.chat().create(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    error = %e,
                    "API call failed"
                );
                return Err(Box::new(e));
            }
        };

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or("LLM response had no message content")?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = content.len(),
            "API call succeeded"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_client_debug_hides_credentials() {
        let client = ChatClient::new(
            Some("gsk_secret"),
            "https://api.groq.com/openai/v1",
            "llama3-8b-8192",
        );
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("llama3-8b-8192"));
        assert!(rendered.contains("https://api.groq.com/openai/v1"));
        assert!(!rendered.contains("gsk_secret"));
    }

    #[test]
    fn test_chat_client_without_key() {
        let client = ChatClient::new(None, "http://localhost:8080/v1", "local-model");
        assert_eq!(client.model, "local-model");
    }
}
