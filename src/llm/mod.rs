//! LLM collaborator
//!
//! The analysis core only needs one synchronous-looking call: send a system
//! prompt, prior turns and a user message, get text back. Backends report
//! failures as text, never as errors.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Returned by backends that have no credential
pub const NOT_CONFIGURED_MESSAGE: &str =
    "API key not configured. Please set GEMINI_API_KEY or add gemini_api_key to api_keys.json.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// One prior turn in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Whether a credential is available; agents fall back to local analysis otherwise
    fn is_configured(&self) -> bool;

    /// Complete a prompt. Any returned string is authoritative output,
    /// including error descriptions.
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> String;
}

/// Backend used when no API key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLlm;

#[async_trait]
impl LlmBackend for NoLlm {
    fn is_configured(&self) -> bool {
        false
    }

    async fn complete(&self, _system_prompt: &str, _history: &[ChatMessage], _user_message: &str) -> String {
        NOT_CONFIGURED_MESSAGE.to_string()
    }
}

/// Flatten a conversation into the single-prompt layout sent to the model
pub fn build_prompt(system_prompt: &str, history: &[ChatMessage], user_message: &str) -> String {
    let mut prompt = String::with_capacity(system_prompt.len() + user_message.len() + 64);
    prompt.push_str(system_prompt);
    prompt.push_str("\n\n");

    for msg in history {
        prompt.push_str(&format!("{}: {}\n", msg.role.label(), msg.content));
    }

    prompt.push_str(&format!("User: {}\n", user_message));
    prompt.push_str("Assistant: ");
    prompt
}
