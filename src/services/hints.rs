//! Hint generation and the follow-up chat.

use super::backend::Backend;
use crate::error::{AppError, Result};
use crate::models::{parse_hints, ChatMessage, ChatRole, ParsedHints};
use std::sync::Arc;

const CHAT_ERROR_REPLY: &str = "Error communicating with AI";

#[derive(Clone)]
pub struct HintService {
    backend: Arc<dyn Backend>,
}

impl HintService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Generate hints for a problem page.
    pub async fn generate(&self, problem_url: &str) -> Result<ParsedHints> {
        let problem_url = problem_url.trim();
        let parsed = reqwest::Url::parse(problem_url)
            .map_err(|_| AppError::Validation("Paste a valid problem link".to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Validation(
                "Problem link must be http or https".to_string(),
            ));
        }

        let text = self.backend.generate_hints(problem_url).await?;
        let hints = parse_hints(&text);
        if let ParsedHints::Unparsed(_) = &hints {
            tracing::warn!(url = problem_url, "Hint text not in a known format");
        }
        Ok(hints)
    }

    /// Send `message` with the prior turns as context and record both turns.
    ///
    /// On failure an error reply is still appended so the transcript stays
    /// in user/assistant pairs.
    pub async fn chat(&self, conversation: &mut Vec<ChatMessage>, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Message is empty".to_string()));
        }

        let result = self.backend.chat(message, conversation.as_slice()).await;
        conversation.push(ChatMessage {
            role: ChatRole::User,
            content: message.to_string(),
        });

        let reply = match &result {
            Ok(reply) => reply.clone(),
            Err(e) => {
                tracing::error!(error = %e, "Error communicating with AI");
                CHAT_ERROR_REPLY.to_string()
            }
        };
        conversation.push(ChatMessage {
            role: ChatRole::Assistant,
            content: reply,
        });

        result
    }
}
