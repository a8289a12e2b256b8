//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{dialogue, endpoints, extraction, generation, registry, timeouts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - remote providers optional
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - at least one remote provider expected
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Remote dialogue providers, tried Groq first then Minimax
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Live fact extraction
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Single-shot remote classification
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Local dialogue policy thresholds
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Session registry limits
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.providers.groq.validate("providers.groq")?;
        self.providers.minimax.validate("providers.minimax")?;
        self.validate_extraction()?;
        self.validate_classification()?;
        self.validate_dialogue()?;
        self.validate_registry()?;

        if self.environment.is_production() && !self.providers.any_enabled() {
            tracing::warn!(
                "No remote provider configured in production; dialogues run on the local policy only"
            );
        }

        Ok(())
    }

    fn validate_extraction(&self) -> Result<(), ConfigError> {
        validate_timeout("extraction.timeout_ms", self.extraction.timeout_ms)?;
        if self.extraction.window_lines == 0 {
            return Err(ConfigError::InvalidValue {
                field: "extraction.window_lines".to_string(),
                message: "Window must include at least one line".to_string(),
            });
        }
        validate_temperature("extraction.temperature", self.extraction.temperature)
    }

    fn validate_classification(&self) -> Result<(), ConfigError> {
        validate_timeout("classification.timeout_ms", self.classification.timeout_ms)?;
        validate_temperature("classification.temperature", self.classification.temperature)
    }

    fn validate_dialogue(&self) -> Result<(), ConfigError> {
        let d = &self.dialogue;
        if d.min_turns_for_completion == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.min_turns_for_completion".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        if d.max_turns < d.min_turns_for_completion {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.max_turns".to_string(),
                message: format!(
                    "Ceiling {} is below min_turns_for_completion {}",
                    d.max_turns, d.min_turns_for_completion
                ),
            });
        }
        Ok(())
    }

    fn validate_registry(&self) -> Result<(), ConfigError> {
        if self.registry.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "registry.max_sessions".to_string(),
                message: "Must allow at least one session".to_string(),
            });
        }
        if self.registry.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "registry.cleanup_interval_secs".to_string(),
                message: "Cleanup interval must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_timeout(field: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if timeout_ms == 0 || timeout_ms > timeouts::MAX_MS {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("Timeout must be between 1 and {} ms", timeouts::MAX_MS),
        });
    }
    Ok(())
}

fn validate_temperature(field: &str, temperature: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "Temperature must be within 0.0..=2.0".to_string(),
        });
    }
    Ok(())
}

/// Remote provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_groq")]
    pub groq: ProviderConfig,

    #[serde(default = "default_minimax")]
    pub minimax: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            groq: default_groq(),
            minimax: default_minimax(),
        }
    }
}

impl ProvidersConfig {
    /// True when at least one provider is enabled and has a key
    pub fn any_enabled(&self) -> bool {
        self.groq.is_usable() || self.minimax.is_usable()
    }
}

/// One OpenAI-compatible chat backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the API
    pub endpoint: String,

    /// Chat completion path relative to `endpoint`
    #[serde(default = "default_chat_path")]
    pub chat_path: String,

    /// API key; empty disables the provider
    #[serde(default)]
    pub api_key: String,

    pub model: String,

    #[serde(default = "default_conversation_temperature")]
    pub temperature: f32,

    pub max_tokens: usize,

    #[serde(default = "default_conversation_timeout_ms")]
    pub timeout_ms: u64,
}

impl ProviderConfig {
    /// Enabled and carrying a key
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        validate_timeout(&format!("{}.timeout_ms", section), self.timeout_ms)?;
        validate_temperature(&format!("{}.temperature", section), self.temperature)?;
        if self.enabled && self.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.endpoint", section),
                message: "Endpoint required when provider is enabled".to_string(),
            });
        }
        Ok(())
    }
}

fn default_groq() -> ProviderConfig {
    ProviderConfig {
        enabled: true,
        endpoint: endpoints::GROQ_BASE_URL.to_string(),
        chat_path: default_chat_path(),
        api_key: std::env::var(endpoints::GROQ_API_KEY_ENV).unwrap_or_default(),
        model: endpoints::GROQ_DEFAULT_MODEL.to_string(),
        temperature: generation::CONVERSATION_TEMPERATURE,
        max_tokens: generation::GROQ_CONVERSATION_MAX_TOKENS,
        timeout_ms: timeouts::CONVERSATION_MS,
    }
}

fn default_minimax() -> ProviderConfig {
    ProviderConfig {
        enabled: true,
        endpoint: endpoints::MINIMAX_BASE_URL.to_string(),
        chat_path: endpoints::MINIMAX_CHAT_PATH.to_string(),
        api_key: std::env::var(endpoints::MINIMAX_API_KEY_ENV).unwrap_or_default(),
        model: endpoints::MINIMAX_DEFAULT_MODEL.to_string(),
        temperature: generation::CONVERSATION_TEMPERATURE,
        max_tokens: generation::MINIMAX_CONVERSATION_MAX_TOKENS,
        timeout_ms: timeouts::CONVERSATION_MS,
    }
}

fn default_chat_path() -> String {
    "chat/completions".to_string()
}

fn default_conversation_temperature() -> f32 {
    generation::CONVERSATION_TEMPERATURE
}

fn default_conversation_timeout_ms() -> u64 {
    timeouts::CONVERSATION_MS
}

/// Live extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Use the remote extractor (Groq) when a key is available
    #[serde(default = "default_true")]
    pub remote_enabled: bool,

    /// Recent transcript lines sent to the remote extractor
    #[serde(default = "default_window_lines")]
    pub window_lines: usize,

    #[serde(default = "default_extraction_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_extraction_temperature")]
    pub temperature: f32,

    #[serde(default = "default_extraction_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            remote_enabled: true,
            window_lines: extraction::WINDOW_LINES,
            timeout_ms: timeouts::EXTRACTION_MS,
            temperature: generation::EXTRACTION_TEMPERATURE,
            max_tokens: generation::EXTRACTION_MAX_TOKENS,
        }
    }
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_window_lines() -> usize {
    extraction::WINDOW_LINES
}
fn default_extraction_timeout_ms() -> u64 {
    timeouts::EXTRACTION_MS
}
fn default_extraction_temperature() -> f32 {
    generation::EXTRACTION_TEMPERATURE
}
fn default_extraction_max_tokens() -> usize {
    generation::EXTRACTION_MAX_TOKENS
}

/// Single-shot remote classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Ask a remote model before falling back to the keyword classifier
    #[serde(default = "default_true")]
    pub remote_enabled: bool,

    #[serde(default = "default_classification_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_classification_temperature")]
    pub temperature: f32,

    #[serde(default = "default_classification_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            remote_enabled: true,
            timeout_ms: timeouts::CLASSIFICATION_MS,
            temperature: generation::CLASSIFICATION_TEMPERATURE,
            max_tokens: generation::CLASSIFICATION_MAX_TOKENS,
        }
    }
}

impl ClassificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_classification_timeout_ms() -> u64 {
    timeouts::CLASSIFICATION_MS
}
fn default_classification_temperature() -> f32 {
    generation::CLASSIFICATION_TEMPERATURE
}
fn default_classification_max_tokens() -> usize {
    generation::CLASSIFICATION_MAX_TOKENS
}

/// Local dialogue policy thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueConfig {
    #[serde(default = "default_min_turns")]
    pub min_turns_for_completion: usize,

    #[serde(default = "default_min_extra_topics")]
    pub min_extra_topics: usize,

    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            min_turns_for_completion: dialogue::MIN_TURNS_FOR_COMPLETION,
            min_extra_topics: dialogue::MIN_EXTRA_TOPICS,
            max_turns: dialogue::MAX_TURNS,
        }
    }
}

fn default_min_turns() -> usize {
    dialogue::MIN_TURNS_FOR_COMPLETION
}
fn default_min_extra_topics() -> usize {
    dialogue::MIN_EXTRA_TOPICS
}
fn default_max_turns() -> usize {
    dialogue::MAX_TURNS
}

/// Session registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: registry::MAX_SESSIONS,
            idle_timeout_secs: registry::IDLE_TIMEOUT_SECS,
            cleanup_interval_secs: registry::CLEANUP_INTERVAL_SECS,
        }
    }
}

fn default_max_sessions() -> usize {
    registry::MAX_SESSIONS
}
fn default_idle_timeout_secs() -> u64 {
    registry::IDLE_TIMEOUT_SECS
}
fn default_cleanup_interval_secs() -> u64 {
    registry::CLEANUP_INTERVAL_SECS
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Load settings from files and environment
///
/// Priority: env vars (`TRIAGE__SECTION__KEY`) > `config/{env}` > `config/default` > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Same as [`load_settings`] with an explicit configuration directory
pub fn load_settings_from(dir: &str, env: Option<&str>) -> Result<Settings, ConfigError> {
    // Built-in defaults form the base layer so partial sections and single
    // env overrides (e.g. TRIAGE__PROVIDERS__GROQ__API_KEY) deserialize.
    let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

    builder = builder.add_source(File::with_name(&format!("{}/default", dir)).required(false));

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&format!("{}/{}", dir, env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("TRIAGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.dialogue.min_turns_for_completion, 5);
        assert_eq!(settings.dialogue.min_extra_topics, 2);
        assert_eq!(settings.dialogue.max_turns, 8);
        assert_eq!(settings.extraction.window_lines, 12);
        assert_eq!(settings.providers.groq.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.providers.minimax.chat_path, "text/chatcompletion_v2");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_dialogue_ceiling_validation() {
        let mut settings = Settings::default();
        settings.dialogue.max_turns = 3;
        assert!(settings.validate().is_err());

        settings.dialogue.max_turns = 8;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_timeout_validation() {
        let mut settings = Settings::default();
        settings.providers.groq.timeout_ms = 0;
        assert!(settings.validate().is_err());

        settings.providers.groq.timeout_ms = 120_000;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_provider_without_key_is_not_usable() {
        let mut provider = default_groq();
        provider.api_key = String::new();
        assert!(!provider.is_usable());

        provider.api_key = "gsk-test".to_string();
        assert!(provider.is_usable());

        provider.enabled = false;
        assert!(!provider.is_usable());
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("default.toml")).unwrap();
        writeln!(
            file,
            r#"
environment = "staging"

[dialogue]
min_turns_for_completion = 4
max_turns = 6

[registry]
max_sessions = 25
"#
        )
        .unwrap();

        let settings = load_settings_from(dir.path().to_str().unwrap(), None).unwrap();
        assert_eq!(settings.environment, RuntimeEnvironment::Staging);
        assert_eq!(settings.dialogue.min_turns_for_completion, 4);
        assert_eq!(settings.dialogue.max_turns, 6);
        assert_eq!(settings.dialogue.min_extra_topics, 2);
        assert_eq!(settings.registry.max_sessions, 25);
    }

    #[test]
    fn test_load_settings_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[dialogue]\nmin_turns_for_completion = 9\nmax_turns = 8\n",
        )
        .unwrap();

        let result = load_settings_from(dir.path().to_str().unwrap(), None);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
