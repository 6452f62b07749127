use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::traits::TextGenerator;

/// Ollama chat backend (`/api/chat`, non-streaming)
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model_name: String,
    temperature: Option<f32>,
}

impl OllamaGenerator {
    pub fn new(
        model_name: &str,
        base_url: &str,
        timeout: Duration,
        temperature: Option<f32>,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            temperature,
        })
    }
}

/// Build the chat request body, system message first when present
fn chat_body(
    model: &str,
    prompt: &str,
    system_instruction: Option<&str>,
    temperature: Option<f32>,
) -> serde_json::Value {
    let mut messages = Vec::new();
    if let Some(system) = system_instruction {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": prompt }));

    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": false,
    });
    if let Some(temp) = temperature {
        body["options"] = json!({ "temperature": temp });
    }
    body
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let body = chat_body(&self.model_name, prompt, system_instruction, self.temperature);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to connect to Ollama at {}. Is `ollama serve` running?", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama error ({}): {}", status, error_text);
        }

        let chat: ChatResponse = response.json().await.context("Malformed Ollama response")?;
        Ok(chat.message.content.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn is_local(&self) -> bool {
        true
    }
}

// Response structures for the Ollama chat API

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}
