use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{
    cli::OutputFormat,
    engine::{Intent, QaEngine},
};

/// Result of a non-interactive run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The question that was asked
    pub question: String,
    /// Intent the router settled on, absent when classification failed
    pub intent: Option<Intent>,
    /// Context block handed to the model
    pub context: String,
    /// The model's answer
    pub answer: String,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    /// Model used
    pub model: String,
    /// Execution time in milliseconds
    pub duration_ms: u128,
    pub answered_at: DateTime<Local>,
}

/// Non-interactive runner for answering a single question
pub struct NonInteractiveRunner {
    engine: QaEngine,
}

impl NonInteractiveRunner {
    pub fn new(engine: QaEngine) -> Self {
        Self { engine }
    }

    /// Answer one question; failures are recorded in the result instead of aborting
    pub async fn execute(&self, question: String) -> NonInteractiveResult {
        let start_time = std::time::Instant::now();

        let (intent, context, answer, errors) = match self.engine.answer_with_trace(&question).await {
            Ok(answer) => (Some(answer.intent), answer.context, answer.text, Vec::new()),
            Err(e) => (None, String::new(), String::new(), vec![e.to_string()]),
        };

        NonInteractiveResult {
            question,
            intent,
            context,
            answer,
            errors,
            metadata: ExecutionMetadata {
                model: self.engine.model_name().to_string(),
                duration_ms: start_time.elapsed().as_millis(),
                answered_at: Local::now(),
            },
        }
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        format_result(result, format)
    }
}

pub fn format_result(result: &NonInteractiveResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
            format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
        }),
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&result.answer);

            if !result.errors.is_empty() {
                output.push_str("\n--- Errors ---\n");
                for error in &result.errors {
                    output.push_str(&format!("• {}\n", error));
                }
            }

            output
        }
        OutputFormat::Markdown => {
            let mut output = String::new();

            output.push_str("## Answer\n\n");
            output.push_str(&result.answer);
            output.push_str("\n\n");

            if !result.context.is_empty() {
                output.push_str("## Context\n\n```\n");
                output.push_str(&result.context);
                output.push_str("\n```\n\n");
            }

            if !result.errors.is_empty() {
                output.push_str("## Errors\n\n");
                for error in &result.errors {
                    output.push_str(&format!("- {}\n", error));
                }
                output.push('\n');
            }

            output.push_str("---\n");
            output.push_str(&format!(
                "*Intent: {} | Model: {} | Duration: {}ms*\n",
                result
                    .intent
                    .map(|i| i.label())
                    .unwrap_or("unknown"),
                result.metadata.model,
                result.metadata.duration_ms
            ));

            output
        }
    }
}
