//! Analysis configuration
//!
//! The API key is resolved once by the host and handed to the agents as a
//! plain value. Nothing below `Coordinator::new` reads the environment.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const API_KEY_FILE_ENV: &str = "MEDASSIST_API_KEYS";
const MODEL_ENV: &str = "MEDASSIST_LLM_MODEL";

/// Default character budget for text sent to the LLM
pub const DEFAULT_MAX_ANALYSIS_CHARS: usize = 5000;

/// Settings for the LLM collaborator
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; `None` selects the local heuristic analysis
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound for a single completion, retries included
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(120),
        }
    }
}

impl LlmConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub llm: LlmConfig,
    /// Text longer than this is truncated before analysis
    pub max_analysis_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            max_analysis_chars: DEFAULT_MAX_ANALYSIS_CHARS,
        }
    }
}

/// On-disk key file: `{"gemini_api_key": "..."}`
#[derive(Debug, Deserialize)]
struct ApiKeyFile {
    #[serde(default)]
    gemini_api_key: String,
}

impl AnalysisConfig {
    /// Resolve configuration from `.env`, the environment and the key file
    pub fn load() -> Self {
        if dotenvy::dotenv().is_err() {
            tracing::debug!("[Config] No .env file found");
        }

        let mut config = Self::default();

        config.llm.api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                let path = std::env::var(API_KEY_FILE_ENV)
                    .map(PathBuf::from)
                    .ok()
                    .or_else(default_key_file)?;
                read_key_file(&path)
            });

        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                config.llm.model = model;
            }
        }

        if config.llm.has_api_key() {
            tracing::info!("[Config] LLM key found - using {}", config.llm.model);
        } else {
            tracing::info!("[Config] No LLM key - text analysis will run locally");
        }

        config
    }
}

fn default_key_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("medassist").join("api_keys.json"))
}

/// Read the Gemini key from a JSON key file; unreadable or empty means absent
pub fn read_key_file(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<ApiKeyFile>(&raw) {
        Ok(file) if !file.gemini_api_key.trim().is_empty() => Some(file.gemini_api_key),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("[Config] Ignoring malformed key file {}: {}", path.display(), e);
            None
        }
    }
}
