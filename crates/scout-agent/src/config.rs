use serde::{Deserialize, Serialize};

/// Connection and generation settings for the downstream model provider.
///
/// The provider must speak the OpenAI chat-completions protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model used for chat answers.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Model used by the summarization endpoint.
    #[serde(default = "default_summary_model_id")]
    pub summary_model_id: String,
    /// Provider API key. Requests fail fast when it is missing.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override for the provider API root.
    pub api_base_url: Option<String>,
    /// Sampling temperature for chat answers.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens per answer.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model_id() -> String {
    "accounts/sentientfoundation/models/dobby-unhinged-llama-3-3-70b-new".to_string()
}

fn default_summary_model_id() -> String {
    "accounts/fireworks/models/llama-v3p3-70b-instruct".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    8000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            summary_model_id: default_summary_model_id(),
            api_key: None,
            api_base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ModelConfig {
    /// Effective API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or("https://api.fireworks.ai/inference")
    }

    /// The configured API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Shape problems with the configured key. Empty when the key looks valid
    /// or is absent.
    pub fn key_warnings(&self) -> Vec<&'static str> {
        let Some(key) = self.api_key() else {
            return Vec::new();
        };
        let mut warnings = Vec::new();
        if !key.starts_with("fw_") {
            warnings.push("API key does not start with \"fw_\"");
        }
        if key.len() < 20 {
            warnings.push("API key appears to be too short");
        }
        warnings
    }
}
