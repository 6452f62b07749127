use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::traits::TextGenerator;
use crate::constants::GEMINI_API_BASE;

/// Gemini backend using the `generateContent` REST endpoint
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model_name: String,
    temperature: Option<f32>,
}

impl GeminiGenerator {
    pub fn new(
        model_name: &str,
        api_key: String,
        timeout: Duration,
        temperature: Option<f32>,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model_name: model_name.to_string(),
            temperature,
        })
    }
}

fn content_body(
    prompt: &str,
    system_instruction: Option<&str>,
    temperature: Option<f32>,
) -> serde_json::Value {
    let mut body = json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
    });
    if let Some(system) = system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    if let Some(temp) = temperature {
        body["generationConfig"] = json!({ "temperature": temp });
    }
    body
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", GEMINI_API_BASE, self.model_name);
        let body = content_body(prompt, system_instruction, self.temperature);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to connect to the Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini error ({}): {}", status, error_text);
        }

        let generated: GenerateResponse = response.json().await.context("Malformed Gemini response")?;
        generated.text()
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn is_local(&self) -> bool {
        false
    }
}

// Response structures for the Gemini API

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn text(self) -> Result<String> {
        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .context("Gemini returned no candidates")?;

        Ok(content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<String>()
            .trim()
            .to_string())
    }
}
