//! LLM Factory - builds backends from settings
//!
//! Providers without an API key (or disabled) are skipped with a log line,
//! so an empty result simply means "local policy only".
//!
//! ## Example
//! ```ignore
//! let settings = load_settings(None)?;
//! let dialogue = LlmFactory::dialogue_backends(&settings.providers);
//! let extractor = LlmFactory::extraction_backend(&settings);
//! ```

use std::sync::Arc;

use triage_config::{ProviderConfig, Settings};

use crate::backend::{LlmBackend, OpenAIBackend, OpenAIConfig};

pub struct LlmFactory;

impl LlmFactory {
    /// Backend for one configured provider, if usable
    pub fn create(name: &str, provider: &ProviderConfig) -> Option<Arc<dyn LlmBackend>> {
        if !provider.is_usable() {
            tracing::info!(provider = %name, "Provider disabled or missing API key, skipping");
            return None;
        }

        match OpenAIBackend::new(Self::config_for(name, provider)) {
            Ok(backend) => Some(Arc::new(backend)),
            Err(e) => {
                tracing::warn!(provider = %name, error = %e, "Failed to create provider backend");
                None
            }
        }
    }

    /// Dialogue backends in chain order: Groq (fast, free tier) then Minimax
    pub fn dialogue_backends(
        providers: &triage_config::ProvidersConfig,
    ) -> Vec<Arc<dyn LlmBackend>> {
        [("groq", &providers.groq), ("minimax", &providers.minimax)]
            .into_iter()
            .filter_map(|(name, provider)| Self::create(name, provider))
            .collect()
    }

    /// Fast backend for live extraction (Groq), tuned for short JSON output
    pub fn extraction_backend(settings: &Settings) -> Option<Arc<dyn LlmBackend>> {
        if !settings.extraction.remote_enabled {
            return None;
        }
        let mut provider = settings.providers.groq.clone();
        provider.temperature = settings.extraction.temperature;
        provider.max_tokens = settings.extraction.max_tokens;
        provider.timeout_ms = settings.extraction.timeout_ms;
        Self::create("groq", &provider)
    }

    /// Backends for single-shot classification: Minimax first, then Groq
    pub fn classification_backends(settings: &Settings) -> Vec<Arc<dyn LlmBackend>> {
        if !settings.classification.remote_enabled {
            return Vec::new();
        }
        [("minimax", &settings.providers.minimax), ("groq", &settings.providers.groq)]
            .into_iter()
            .filter_map(|(name, provider)| {
                let mut provider = provider.clone();
                provider.temperature = settings.classification.temperature;
                provider.max_tokens = settings.classification.max_tokens;
                provider.timeout_ms = settings.classification.timeout_ms;
                Self::create(name, &provider)
            })
            .collect()
    }

    fn config_for(name: &str, provider: &ProviderConfig) -> OpenAIConfig {
        let preset = match name {
            "minimax" => OpenAIConfig::minimax(provider.api_key.clone(), provider.model.clone()),
            _ => OpenAIConfig::groq(provider.api_key.clone(), provider.model.clone()),
        };
        preset
            .with_endpoint(provider.endpoint.clone(), provider.chat_path.clone())
            .with_temperature(provider.temperature)
            .with_max_tokens(provider.max_tokens)
            .with_timeout(provider.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_keys(groq: &str, minimax: &str) -> Settings {
        let mut settings = Settings::default();
        settings.providers.groq.api_key = groq.to_string();
        settings.providers.minimax.api_key = minimax.to_string();
        settings
    }

    #[test]
    fn test_no_keys_means_no_backends() {
        let settings = settings_with_keys("", "");
        assert!(LlmFactory::dialogue_backends(&settings.providers).is_empty());
        assert!(LlmFactory::extraction_backend(&settings).is_none());
        assert!(LlmFactory::classification_backends(&settings).is_empty());
    }

    #[test]
    fn test_dialogue_order_groq_first() {
        let settings = settings_with_keys("gsk", "mm");
        let backends = LlmFactory::dialogue_backends(&settings.providers);
        let names: Vec<_> = backends.iter().map(|b| b.provider_name().to_string()).collect();
        assert_eq!(names, vec!["groq", "minimax"]);
    }

    #[test]
    fn test_classification_order_minimax_first() {
        let settings = settings_with_keys("gsk", "mm");
        let backends = LlmFactory::classification_backends(&settings);
        assert_eq!(backends[0].provider_name(), "minimax");
    }

    #[test]
    fn test_disabled_provider_skipped() {
        let mut settings = settings_with_keys("gsk", "mm");
        settings.providers.groq.enabled = false;
        let backends = LlmFactory::dialogue_backends(&settings.providers);
        assert_eq!(backends.len(), 1);
        assert_eq!(backends[0].provider_name(), "minimax");
    }
}
