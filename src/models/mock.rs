use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use super::traits::TextGenerator;

const CONTEXT_MARKER: &str = "CONTEXT DATA:\n";

/// A prompt the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCall {
    pub prompt: String,
    pub system_instruction: Option<String>,
}

/// Deterministic generator for offline runs and tests
///
/// Scripted replies are consumed first. Without a script, classification
/// prompts get the configured label and answer prompts get their context
/// block echoed back.
pub struct MockGenerator {
    model_name: String,
    classification_label: String,
    script: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<GeneratorCall>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("mock")
    }
}

impl MockGenerator {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            classification_label: "GENERAL".to_string(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Label returned for unscripted classification prompts
    pub fn with_classification(mut self, label: &str) -> Self {
        self.classification_label = label.to_string();
        self
    }

    /// Queue a reply for the next call
    pub fn push_reply(&self, reply: &str) -> &Self {
        self.script.lock().push_back(Ok(reply.to_string()));
        self
    }

    /// Queue a failure for the next call
    pub fn push_failure(&self, error: &str) -> &Self {
        self.script.lock().push_back(Err(error.to_string()));
        self
    }

    /// Every call received so far, oldest first
    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.calls.lock().clone()
    }

    fn unscripted(&self, prompt: &str) -> String {
        if prompt.starts_with("Classify") {
            return self.classification_label.clone();
        }

        match prompt.split_once(CONTEXT_MARKER) {
            Some((_, context)) if !context.trim().is_empty() => context.trim().to_string(),
            _ => "I don't have any project data for that question.".to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        self.calls.lock().push(GeneratorCall {
            prompt: prompt.to_string(),
            system_instruction: system_instruction.map(str::to_string),
        });

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(error)) => Err(anyhow::anyhow!(error)),
            None => Ok(self.unscripted(prompt)),
        }
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn is_local(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_is_consumed_in_order() {
        let mock = MockGenerator::default();
        mock.push_reply("JIRA_LIST").push_failure("boom");

        assert_eq!(mock.generate("Classify this", None).await.unwrap(), "JIRA_LIST");
        assert!(mock.generate("Classify this", None).await.is_err());
        assert_eq!(mock.generate("Classify this", None).await.unwrap(), "GENERAL");
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_unscripted_answer_echoes_context() {
        let mock = MockGenerator::default().with_classification("JIRA_COUNT");
        let answer = mock
            .generate("User Query: q\n\nCONTEXT DATA:\nFound 2 tickets.", Some("rules"))
            .await
            .unwrap();
        assert_eq!(answer, "Found 2 tickets.");
        assert_eq!(mock.calls()[0].system_instruction.as_deref(), Some("rules"));

        let label = mock.generate("Classify this query: 'x'", None).await.unwrap();
        assert_eq!(label, "JIRA_COUNT");
    }

    #[tokio::test]
    async fn test_unscripted_answer_never_empty() {
        let mock = MockGenerator::default();
        let answer = mock
            .generate("User Query: hi\n\nCONTEXT DATA:\n", None)
            .await
            .unwrap();
        assert!(!answer.is_empty());
    }
}
