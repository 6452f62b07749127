use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::assembler::ContextAssembler;
use super::intent::{Intent, IntentRouter};
use crate::connectors::{BacklogProvider, CatalogProvider, DeprecationRecord, TicketProvider};
use crate::models::TextGenerator;
use crate::utils::EolError;

pub const ANSWER_INSTRUCTION: &str = "You are the Python EOL Assistant. Answer the user's query using only the provided CONTEXT DATA.\n\
Rules:\n\
1. Answer only from the CONTEXT DATA.\n\
2. If the query asks for deprecation info and the feature is not in the CONTEXT DATA, say you don't have information about it. DO NOT invent versions.\n\
3. For counting requests, use the count provided in the CONTEXT DATA verbatim.\n\
4. Keep the answer concise and professional.";

/// Final prompt handed to the generator
pub fn compose_final_prompt(question: &str, context: &str) -> String {
    format!("User Query: {}\n\nCONTEXT DATA:\n{}", question, context)
}

/// Everything that went into one answer
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub intent: Intent,
    pub context: String,
    pub text: String,
}

/// Classify, retrieve, then phrase: the whole question-answering pipeline
pub struct QaEngine {
    catalog: Vec<DeprecationRecord>,
    router: IntentRouter,
    tickets: Arc<dyn TicketProvider>,
    backlog: Arc<dyn BacklogProvider>,
    generator: Arc<dyn TextGenerator>,
}

impl QaEngine {
    /// Load the catalog once; a load failure means no engine
    pub async fn new(
        catalog: &dyn CatalogProvider,
        tickets: Arc<dyn TicketProvider>,
        backlog: Arc<dyn BacklogProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, EolError> {
        let records = catalog
            .load()
            .await
            .map_err(|cause| EolError::CatalogError { cause })?;
        info!("Catalog ready: {} records ({})", records.len(), catalog.mode());

        Ok(Self {
            catalog: records,
            router: IntentRouter::new(generator.clone()),
            tickets,
            backlog,
            generator,
        })
    }

    pub fn catalog(&self) -> &[DeprecationRecord] {
        &self.catalog
    }

    pub fn model_name(&self) -> &str {
        self.generator.name()
    }

    /// Answer a question; a blank question gets an empty answer without any calls
    pub async fn answer(&self, question: &str) -> Result<String, EolError> {
        Ok(self.answer_with_trace(question).await?.text)
    }

    /// Like `answer`, also returning the intent and the context block used
    pub async fn answer_with_trace(&self, question: &str) -> Result<Answer, EolError> {
        if question.trim().is_empty() {
            return Ok(Answer {
                intent: Intent::General,
                context: String::new(),
                text: String::new(),
            });
        }

        let intent = self.router.classify(question).await?;

        let context = ContextAssembler::new(&self.catalog, self.tickets.as_ref(), self.backlog.as_ref())
            .build(intent, question)
            .await?;
        info!("Intent {} with {} bytes of context", intent, context.len());

        let text = self
            .generator
            .generate(&compose_final_prompt(question, &context), Some(ANSWER_INSTRUCTION))
            .await
            .map_err(|cause| EolError::GenerationError { cause })?;

        if text.trim().is_empty() {
            return Err(EolError::GenerationError {
                cause: anyhow::anyhow!("model {} returned an empty answer", self.generator.name()),
            });
        }

        Ok(Answer {
            intent,
            context,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::{
        BacklogItem, FixtureCatalog, GDriveConnector, JiraConnector, MockCatalogProvider,
        ProviderMode, Ticket,
    };
    use crate::models::MockGenerator;

    async fn engine_with(mock: Arc<MockGenerator>) -> QaEngine {
        QaEngine::new(
            &FixtureCatalog,
            Arc::new(JiraConnector::offline()),
            Arc::new(GDriveConnector::offline()),
            mock,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_catalog_failure_fails_construction() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_load()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("docs.python.org unreachable")));
        catalog.expect_mode().return_const(ProviderMode::Live);

        let result = QaEngine::new(
            &catalog,
            Arc::new(JiraConnector::offline()),
            Arc::new(GDriveConnector::offline()),
            Arc::new(MockGenerator::default()),
        )
        .await;

        assert!(matches!(result, Err(EolError::CatalogError { .. })));
    }

    #[tokio::test]
    async fn test_final_prompt_carries_question_and_context() {
        let mock = Arc::new(MockGenerator::default());
        mock.push_reply("JIRA_COUNT").push_reply("There are 2 testing tickets.");
        let engine = engine_with(mock.clone()).await;

        let question = "How many testing tickets do we have?";
        let answer = engine.answer_with_trace(question).await.unwrap();
        assert_eq!(answer.intent, Intent::JiraCount);
        assert_eq!(answer.context, "Found 2 tickets with status 'Testing'.");
        assert_eq!(answer.text, "There are 2 testing tickets.");

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        let final_call = &calls[1];
        assert!(final_call.prompt.contains(question));
        assert!(final_call.prompt.contains(&answer.context));
        assert_eq!(final_call.prompt, compose_final_prompt(question, &answer.context));
        assert_eq!(final_call.system_instruction.as_deref(), Some(ANSWER_INSTRUCTION));
    }

    #[tokio::test]
    async fn test_ticket_key_question_reads_ticket() {
        let mock = Arc::new(MockGenerator::default().with_classification("GENERAL"));
        let engine = engine_with(mock).await;

        let answer = engine.answer_with_trace("tell me about scrum-6").await.unwrap();
        assert_eq!(answer.intent, Intent::JiraDetail);
        assert!(answer.context.contains("Summary: Update documentation for ctypes"));
        // unscripted mock echoes the context
        assert_eq!(answer.text, answer.context);
    }

    #[tokio::test]
    async fn test_deprecated_count_question_routes_to_deprecations() {
        let mock = Arc::new(MockGenerator::default().with_classification("JIRA_COUNT"));
        let engine = engine_with(mock).await;

        let answer = engine
            .answer_with_trace("How many tickets cover deprecated ctypes APIs?")
            .await
            .unwrap();
        assert_eq!(answer.intent, Intent::DeprecationInfo);
        assert!(answer.context.starts_with("Matching deprecations:"));
        assert!(answer.context.contains("ctypes.SetPointerType"));
    }

    #[tokio::test]
    async fn test_blank_question_makes_no_calls() {
        let mock = Arc::new(MockGenerator::default());
        let engine = engine_with(mock.clone()).await;

        assert_eq!(engine.answer("   ").await.unwrap(), "");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let mock = Arc::new(MockGenerator::default());
        mock.push_reply("GENERAL").push_failure("503 Service Unavailable");
        let engine = engine_with(mock).await;

        let err = engine.answer("hello").await.unwrap_err();
        assert!(matches!(err, EolError::GenerationError { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_empty_generation_is_an_error() {
        let mock = Arc::new(MockGenerator::default());
        mock.push_reply("GENERAL").push_reply("  ");
        let engine = engine_with(mock).await;

        let err = engine.answer("hello").await.unwrap_err();
        assert!(matches!(err, EolError::GenerationError { .. }));
    }

    #[tokio::test]
    async fn test_classification_failure_skips_retrieval_and_generation() {
        let mock = Arc::new(MockGenerator::default());
        mock.push_failure("timeout");
        let engine = engine_with(mock.clone()).await;

        let err = engine.answer("list the backlog").await.unwrap_err();
        assert!(matches!(err, EolError::ClassificationError { .. }));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_pickup_with_case_only_difference() {
        let mock = Arc::new(MockGenerator::default().with_classification("BACKLOG_PICKUP"));
        let engine = QaEngine::new(
            &FixtureCatalog,
            Arc::new(JiraConnector::with_fixtures(
                "SCRUM",
                vec![Ticket::new("SCRUM-1", "deprecate old ssl", "To Do")],
            )),
            Arc::new(GDriveConnector::with_fixtures(vec![BacklogItem::new(
                "Deprecate old SSL",
                "",
                "ssl_notes.txt",
            )])),
            mock,
        )
        .await
        .unwrap();

        let answer = engine.answer_with_trace("what can we pick up next?").await.unwrap();
        assert_eq!(answer.intent, Intent::BacklogPickup);
        assert_eq!(answer.context, "Everything in backlog is already in Jira.");
    }
}
