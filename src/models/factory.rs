use anyhow::Result;
use std::time::Duration;

use super::gemini::GeminiGenerator;
use super::mock::MockGenerator;
use super::ollama::OllamaGenerator;
use super::traits::TextGenerator;
use crate::app::LlmConfig;
use crate::utils::EolError;

/// Providers `ModelFactory::create` understands
pub const SUPPORTED_PROVIDERS: &[&str] = &["ollama", "gemini", "mock"];

/// Factory for creating text generators
pub struct ModelFactory;

impl ModelFactory {
    /// Create a generator from a model identifier
    /// Format: provider/model (e.g., "ollama/gemma3:1b", "gemini/gemini-2.5-flash", "mock/offline")
    pub fn create(model_id: &str, config: &LlmConfig) -> Result<Box<dyn TextGenerator>> {
        let (provider, model) = parse_model_id(model_id)?;
        let timeout = Duration::from_secs(config.timeout_secs);

        match provider {
            "ollama" => Ok(Box::new(OllamaGenerator::new(
                model,
                &config.ollama_url,
                timeout,
                config.temperature,
            )?)),
            "gemini" => {
                let api_key = std::env::var(&config.gemini_api_key_env)
                    .ok()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| {
                        EolError::ConfigError(format!(
                            "{} is required for the gemini provider",
                            config.gemini_api_key_env
                        ))
                    })?;
                Ok(Box::new(GeminiGenerator::new(
                    model,
                    api_key,
                    timeout,
                    config.temperature,
                )?))
            }
            "mock" => Ok(Box::new(MockGenerator::new(model))),
            other => Err(EolError::ConfigError(format!(
                "Unknown LLM provider '{}'. Expected one of: {}",
                other,
                SUPPORTED_PROVIDERS.join(", ")
            ))
            .into()),
        }
    }
}

/// Split `provider/model`; the model part may itself contain slashes or colons
pub fn parse_model_id(model_id: &str) -> Result<(&str, &str), EolError> {
    match model_id.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
            Ok((provider, model))
        }
        _ => Err(EolError::ConfigError(format!(
            "Invalid model format '{}'. Expected 'provider/model' (e.g., 'ollama/gemma3:1b')",
            model_id
        ))),
    }
}
