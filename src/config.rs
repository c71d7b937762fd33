use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::env;
use tracing::{info, warn};

use crate::errors::GenerationFailure;
use crate::llm_providers::LLMProviderType;

// Import logging macros
use crate::{log_system_event, log_validation};

/// Keys shorter than this are treated as missing.
pub const MIN_API_KEY_LEN: usize = 10;
const PLACEHOLDER_API_KEY: &str = "your-api-key";

/// Complete application configuration loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LLMConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub generation: GenerationConfig,
}

/// Large Language Model service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub provider: LLMProviderType,
    pub model: Option<String>,
    pub timeout_secs: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Logging system configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

/// Question generation behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub default_topic: String,
    pub history_cap: usize,
    pub history_max_topics: usize,
    pub max_batch_size: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_topic: "General Knowledge".to_string(),
            history_cap: 10,
            history_max_topics: 256,
            max_batch_size: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        log_system_event!(config, "Loading application configuration");

        let config = Config {
            llm: LLMConfig::from_lookup(&lookup)?,
            server: ServerConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup),
            generation: GenerationConfig::from_lookup(&lookup)?,
        };

        log_system_event!(config, "Configuration loaded successfully");
        config.log_configuration_summary();

        Ok(config)
    }

    /// Log a summary of loaded configuration (without sensitive data)
    fn log_configuration_summary(&self) {
        info!(
            api_key_masked = %self.llm.api_key.as_deref().map(mask_sensitive_data).unwrap_or_else(|| "<unset>".to_string()),
            llm_provider = ?self.llm.provider,
            llm_model = ?self.llm.model,
            llm_timeout_secs = self.llm.timeout_secs,
            server_address = %format!("{}:{}", self.server.host, self.server.port),
            log_level = %self.logging.level,
            default_topic = %self.generation.default_topic,
            history_cap = self.generation.history_cap,
            "Configuration summary"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than 0"));
        }

        if self.llm.timeout_secs == 0 {
            return Err(anyhow!("LLM_TIMEOUT_SECS must be greater than 0"));
        }

        if self.generation.history_cap == 0 {
            return Err(anyhow!("QUESTION_HISTORY_CAP must be greater than 0"));
        }

        if self.generation.max_batch_size == 0 {
            return Err(anyhow!("QUESTION_MAX_BATCH must be greater than 0"));
        }

        if let Err(e) = self.llm.usable_api_key() {
            warn!(error = %e, "LLM API key missing or placeholder - every request will use fallback questions");
        }

        if !["trace", "debug", "info", "warn", "error"]
            .iter()
            .any(|level| self.logging.level.to_lowercase().starts_with(level))
        {
            warn!("Unusual log level '{}', falling back to RUST_LOG defaults", self.logging.level);
        }

        log_validation!(success, "configuration", "Configuration validation completed successfully");
        Ok(())
    }
}

impl LLMConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("LLM_API_KEY")
            .or_else(|| lookup("GOOGLE_AI_KEY"))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let base_url = lookup("LLM_BASE_URL").filter(|url| !url.trim().is_empty());

        let provider = LLMProviderType::parse(&lookup("LLM_PROVIDER").unwrap_or_else(|| "gemini".to_string()));

        let model = lookup("LLM_MODEL").filter(|model| !model.trim().is_empty());

        let timeout_str = lookup("LLM_TIMEOUT_SECS").unwrap_or_else(|| "8".to_string());
        let timeout_secs = timeout_str
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow!("Invalid LLM_TIMEOUT_SECS value: '{}'. Must be a whole number of seconds", timeout_str))?;

        Ok(LLMConfig {
            api_key,
            base_url,
            provider,
            model,
            timeout_secs,
        })
    }

    /// The API key, if it looks usable.
    pub fn usable_api_key(&self) -> Result<&str, GenerationFailure> {
        let key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| GenerationFailure::ConfigurationMissing("no API key configured".to_string()))?;

        if key == PLACEHOLDER_API_KEY {
            return Err(GenerationFailure::ConfigurationMissing("API key is a placeholder".to_string()));
        }
        if key.len() < MIN_API_KEY_LEN {
            return Err(GenerationFailure::ConfigurationMissing(format!(
                "API key is too short ({} characters)",
                key.len()
            )));
        }

        Ok(key)
    }
}

impl ServerConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port_str = lookup("PORT").unwrap_or_else(|| "3000".to_string());

        let port = port_str
            .trim()
            .parse::<u16>()
            .map_err(|_| anyhow!("Invalid PORT value: '{}'. Must be a number between 1-65535", port_str))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(ServerConfig { port, host })
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup("RUST_LOG").unwrap_or_else(|| "info,mindspark_questions=debug".to_string());

        let file_enabled = lookup("LOG_FILE_ENABLED")
            .and_then(|value| value.trim().parse::<bool>().ok())
            .unwrap_or(true);

        let console_enabled = lookup("LOG_CONSOLE_ENABLED")
            .and_then(|value| value.trim().parse::<bool>().ok())
            .unwrap_or(true);

        let log_directory = lookup("LOG_DIRECTORY").unwrap_or_else(|| "logs".to_string());

        LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        }
    }
}

impl GenerationConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GenerationConfig::default();

        let default_topic = lookup("QUESTION_DEFAULT_TOPIC")
            .map(|topic| topic.trim().to_string())
            .filter(|topic| !topic.is_empty())
            .unwrap_or(defaults.default_topic);

        Ok(GenerationConfig {
            default_topic,
            history_cap: parse_usize(lookup, "QUESTION_HISTORY_CAP", defaults.history_cap)?,
            history_max_topics: parse_usize(lookup, "QUESTION_HISTORY_MAX_TOPICS", defaults.history_max_topics)?,
            max_batch_size: parse_usize(lookup, "QUESTION_MAX_BATCH", defaults.max_batch_size)?,
        })
    }
}

fn parse_usize<F>(lookup: &F, key: &str, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow!("Invalid {} value: '{}'. Must be a non-negative integer", key, value)),
        None => Ok(default),
    }
}

/// Mask sensitive data in configuration for safe logging
pub fn mask_sensitive_data(data: &str) -> String {
    let chars: Vec<char> = data.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_mask_sensitive_data() {
        assert_eq!(mask_sensitive_data("short"), "*****");
        assert_eq!(mask_sensitive_data("AIzaSyExampleKey1234"), "AIza***1234");
        assert_eq!(mask_sensitive_data("sk-1234567890abcdef"), "sk-1***cdef");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.provider, LLMProviderType::Gemini);
        assert_eq!(config.llm.api_key, None);
        assert_eq!(config.llm.timeout_secs, 8);
        assert_eq!(config.generation.default_topic, "General Knowledge");
        assert_eq!(config.generation.history_cap, 10);
        assert!(config.logging.file_enabled);
    }

    #[test]
    fn test_google_ai_key_is_accepted() {
        let config = Config::from_lookup(lookup_from(&[("GOOGLE_AI_KEY", "AIzaSyExampleKey1234")])).unwrap();
        assert_eq!(config.llm.usable_api_key().unwrap(), "AIzaSyExampleKey1234");

        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_AI_KEY", "AIzaSyExampleKey1234"),
            ("LLM_API_KEY", "sk-preferred-key-0000"),
        ]))
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-preferred-key-0000"));
    }

    #[test]
    fn test_unusable_keys() {
        for key in ["your-api-key", "abc", "   "] {
            let config = Config::from_lookup(lookup_from(&[("LLM_API_KEY", key)])).unwrap();
            assert!(
                matches!(config.llm.usable_api_key(), Err(GenerationFailure::ConfigurationMissing(_))),
                "key {:?} should be unusable",
                key
            );
        }
    }

    #[test]
    fn test_generation_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("QUESTION_DEFAULT_TOPIC", "Computer Science"),
            ("QUESTION_HISTORY_CAP", "15"),
            ("QUESTION_MAX_BATCH", "3"),
        ]))
        .unwrap();
        assert_eq!(config.generation.default_topic, "Computer Science");
        assert_eq!(config.generation.history_cap, 15);
        assert_eq!(config.generation.max_batch_size, 3);
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(Config::from_lookup(lookup_from(&[("PORT", "not-a-number")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("LLM_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("QUESTION_HISTORY_CAP", "-1")])).is_err());
    }

    #[test]
    fn test_config_validation() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.validate().is_ok());

        let mut invalid = config.clone();
        invalid.server.port = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = config.clone();
        invalid.generation.history_cap = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = config;
        invalid.llm.timeout_secs = 0;
        assert!(invalid.validate().is_err());
    }
}
