//! Gemini API Client
//!
//! Handles communication with Google's Gemini `generateContent` endpoint:
//! - Single-prompt text completion
//! - Retry with backoff on rate limiting
//! - Hard timeout per completion

use super::{build_prompt, ChatMessage, LlmBackend, NOT_CONFIGURED_MESSAGE};
use crate::config::LlmConfig;
use crate::error::AnalysisError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_RETRIES: u32 = 3;

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    config: LlmConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: LlmConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send request with retry logic
    async fn send_request(&self, api_key: &str, request: &GenerateRequest) -> Result<String, AnalysisError> {
        let mut retry_delay = Duration::from_secs(2);

        for retry in 0..=MAX_RETRIES {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let resp = self
                .client
                .post(self.endpoint())
                .header("x-goog-api-key", api_key)
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await;

            match resp {
                Ok(r) if r.status() == 429 => {
                    tracing::warn!("[Gemini] Rate limited, retry {}/{}", retry + 1, MAX_RETRIES);
                    continue;
                }
                Ok(r) if r.status().is_success() => {
                    let body: GenerateResponse = r
                        .json()
                        .await
                        .map_err(|e| AnalysisError::Backend(format!("Failed to parse response: {}", e)))?;
                    return response_text(&body);
                }
                Ok(r) => {
                    let status = r.status();
                    let text = r.text().await.unwrap_or_default();
                    return Err(AnalysisError::Backend(format!("API error ({}): {}", status, text)));
                }
                Err(e) => {
                    if retry == MAX_RETRIES {
                        return Err(AnalysisError::Backend(format!(
                            "Request failed after retries: {}",
                            e
                        )));
                    }
                    continue;
                }
            }
        }

        Err(AnalysisError::Backend("Max retries exceeded".to_string()))
    }
}

#[async_trait]
impl LlmBackend for GeminiClient {
    fn is_configured(&self) -> bool {
        self.config.has_api_key()
    }

    async fn complete(&self, system_prompt: &str, history: &[ChatMessage], user_message: &str) -> String {
        let api_key = match self.config.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => k,
            _ => return NOT_CONFIGURED_MESSAGE.to_string(),
        };

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: build_prompt(system_prompt, history, user_message),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };

        tracing::debug!(
            "[Gemini] Prompt size: {} chars, ~{} tokens",
            request.contents[0].parts[0].text.len(),
            request.contents[0].parts[0].text.len() / 4
        );

        let outcome = tokio::time::timeout(self.config.timeout, self.send_request(api_key, &request))
            .await
            .unwrap_or_else(|_| Err(AnalysisError::Timeout(self.config.timeout.as_secs())));

        match outcome {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("[Gemini] Completion failed: {}", e);
                e.to_string()
            }
        }
    }
}

/// Concatenate the text parts of the first candidate
fn response_text(body: &GenerateResponse) -> Result<String, AnalysisError> {
    let candidate = body
        .candidates
        .first()
        .ok_or_else(|| AnalysisError::Backend("No response from Gemini".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.is_empty() {
        return Err(AnalysisError::Backend("Empty response from Gemini".to_string()));
    }
    Ok(text)
}

// API request/response types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
