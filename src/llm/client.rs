use super::types::*;
use crate::{Error, Result, config::LlmConfig};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Opens a streaming completion. Upstream failures after the call is
    /// opened arrive as `Err` items in the returned stream.
    async fn stream_chat_completion(&self, request: ChatCompletionRequest) -> Result<TextStream>;
}

pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url);
        }

        let client = Client::with_config(openai_config);

        Self { client }
    }
}

/// Concatenated delta text of every choice in one streamed chunk.
fn chunk_text(chunk: openai_types::CreateChatCompletionStreamResponse) -> String {
    chunk
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect()
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn stream_chat_completion(&self, request: ChatCompletionRequest) -> Result<TextStream> {
        debug!(
            "Opening streaming chat completion with {} messages on model {}",
            request.messages.len(),
            request.model
        );

        let mut messages = Vec::new();
        for msg in request.messages {
            messages.push(msg.to_openai_message()?);
        }

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder.model(&request.model).messages(messages);

        if let Some(temperature) = request.temperature {
            request_builder.temperature(temperature);
        }

        let openai_request = request_builder.build()?;

        let stream = self.client.chat().create_stream(openai_request).await?;

        let fragments = stream.map(|item| item.map(chunk_text).map_err(Error::from));

        Ok(Box::pin(fragments))
    }
}
