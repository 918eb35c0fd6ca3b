//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the chat assistant LLM.
//! It implements the `ChatGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use leximate_core::ports::{ChatGenerationService, PortError, PortResult};

const SYSTEM_INSTRUCTIONS: &str = "You are LexiMate, a legal assistant. Answer the user's \
legal question clearly and concisely. You are not a substitute for a licensed attorney; \
say so when the question calls for formal legal advice.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatGenerationService` using an OpenAI-compatible LLM.
///
/// Each call carries only the single user message; no conversation history is
/// assembled, so replies are stateless from the session's perspective.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ChatGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatGenerationService for OpenAiChatAdapter {
    async fn generate_reply(&self, message: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_INSTRUCTIONS)
                    .build()
                    .map_err(|e| PortError::Upstream(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(message)
                    .build()
                    .map_err(|e| PortError::Upstream(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(1000u32)
            .build()
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let reply = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Upstream("No reply generated".to_string()))?;

        Ok(reply.trim().to_string())
    }
}
