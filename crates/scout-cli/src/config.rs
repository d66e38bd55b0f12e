use anyhow::Context;
use scout_agent::ModelConfig;
use scout_search::SearchConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the model provider key.
pub const MODEL_KEY_VAR: &str = "FIREWORKS_API_KEY";
/// Environment variable holding the web search key.
pub const WEB_SEARCH_KEY_VAR: &str = "TAVILY_API_KEY";

/// Contents of `scout.toml`.
#[derive(Debug, Deserialize)]
pub struct ScoutConfig {
    /// Root for persisted data.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Capacity of each chat request's event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Longest accepted chat message, in bytes.
    #[serde(default = "default_max_msg_len")]
    pub max_message_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            event_buffer: default_event_buffer(),
            max_message_length: default_max_msg_len(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_event_buffer() -> usize {
    scout_gateway::DEFAULT_EVENT_BUFFER
}
fn default_max_msg_len() -> usize {
    100_000
}

impl ScoutConfig {
    /// Reads `path` if it exists, otherwise starts from defaults, then
    /// applies environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
            Self::parse(&raw)
                .with_context(|| format!("Invalid config file '{}'", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parses TOML text without touching the environment.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Credentials from the environment win over the file. Blank values are
    /// ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = var(MODEL_KEY_VAR) {
            self.model.api_key = Some(key);
        }
        if let Some(key) = var(WEB_SEARCH_KEY_VAR) {
            self.search.web_api_key = Some(key);
        }
    }

    /// Directory holding session files.
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ScoutConfig::parse("").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.event_buffer, 64);
        assert_eq!(config.server.max_message_length, 100_000);
        assert_eq!(config.model.max_tokens, 8000);
        assert_eq!(config.search.timeout_ms, 8000);
    }

    #[test]
    fn test_sections_parse() {
        let config = ScoutConfig::parse(
            r#"
data_dir = "/var/lib/scout"

[server]
host = "127.0.0.1"
port = 8080
event_buffer = 16

[model]
api_base_url = "http://localhost:9000"
temperature = 0.2

[search]
timeout_ms = 2500
"#,
        )
        .unwrap();
        assert_eq!(config.sessions_dir(), PathBuf::from("/var/lib/scout/sessions"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.event_buffer, 16);
        assert_eq!(config.model.base_url(), "http://localhost:9000");
        assert_eq!(config.search.timeout_ms, 2500);
    }

    #[test]
    fn test_env_overrides_file_keys() {
        let mut config = ScoutConfig::parse(
            r#"
[model]
api_key = "fw_from_file_0000000000"
"#,
        )
        .unwrap();
        config.apply_env(|name| match name {
            MODEL_KEY_VAR => Some("fw_from_env_1111111111".to_string()),
            WEB_SEARCH_KEY_VAR => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.model.api_key(), Some("fw_from_env_1111111111"));
        assert!(config.search.web_api_key.is_none());
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ScoutConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_reports_bad_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scout.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = ScoutConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }
}
