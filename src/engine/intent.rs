use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::constants::DEPRECATION_KEYWORDS;
use crate::models::TextGenerator;
use crate::utils::EolError;

static PYTHON_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bpython\s*3\.\d+\b").expect("static regex"));

/// What a question is asking for; selects the retrieval path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    DeprecationInfo,
    DeprecationGap,
    JiraList,
    JiraDetail,
    JiraCount,
    BacklogList,
    BacklogPickup,
    General,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::DeprecationInfo,
        Intent::DeprecationGap,
        Intent::JiraList,
        Intent::JiraDetail,
        Intent::JiraCount,
        Intent::BacklogList,
        Intent::BacklogPickup,
        Intent::General,
    ];

    /// Canonical label, as the classifier is asked to answer
    pub fn label(self) -> &'static str {
        match self {
            Intent::DeprecationInfo => "DEPRECATION_INFO",
            Intent::DeprecationGap => "DEPRECATION_GAP",
            Intent::JiraList => "JIRA_LIST",
            Intent::JiraDetail => "JIRA_DETAIL",
            Intent::JiraCount => "JIRA_COUNT",
            Intent::BacklogList => "BACKLOG_LIST",
            Intent::BacklogPickup => "BACKLOG_PICKUP",
            Intent::General => "GENERAL",
        }
    }

    /// The label that occurs earliest in untrusted model output
    pub fn find_in(raw: &str) -> Option<Intent> {
        Intent::ALL
            .iter()
            .filter_map(|intent| raw.find(intent.label()).map(|pos| (pos, *intent)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, intent)| intent)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const CLASSIFIER_INSTRUCTION: &str = "You are a helpful assistant for a Python EOL management project. \
Classify the user's query into one of the following INTENTS:\n\
- DEPRECATION_INFO: Questions about Python features, deprecations, or removals.\n\
- DEPRECATION_GAP: Requests to find deprecations that happened but are NOT in the backlog (e.g. 'new proposals', 'not in backlog').\n\
- JIRA_LIST: Requests to list Jira tickets (e.g., 'show me tickets', 'list items').\n\
- JIRA_DETAIL: Requests for details about a specific Jira ticket (e.g., SCRUM-123, 'content of ticket').\n\
- JIRA_COUNT: Requests to count tickets in a certain status (e.g., 'how many testing tickets').\n\
- BACKLOG_LIST: Requests to list files in the Google Drive backlog.\n\
- BACKLOG_PICKUP: Requests to find backlog items not yet in Jira.\n\
- GENERAL: General greeting or queries not related to the above.\n\n\
If the query contains a ticket key like SCRUM-123 (any letter case), prefer JIRA_DETAIL.\n\
Respond ONLY with the INTENT name.";

pub fn classification_prompt(question: &str) -> String {
    format!("Classify this query: '{}'", question)
}

/// A deterministic correction applied after the model's guess
#[derive(Clone, Copy)]
pub struct Override {
    pub name: &'static str,
    pub intent: Intent,
    /// Receives the lowercased question
    pub matches: fn(&str) -> bool,
    /// Strong overrides always win; weak ones only fire when no earlier override did
    pub strong: bool,
}

fn mentions_deprecation(q: &str) -> bool {
    DEPRECATION_KEYWORDS.iter().any(|k| q.contains(k)) || PYTHON_VERSION_RE.is_match(q)
}

fn mentions_ticket_key(q: &str) -> bool {
    q.contains("scrum-")
}

fn asks_ticket_count(q: &str) -> bool {
    q.contains("how many") && q.contains("ticket")
}

/// Overrides in evaluation order
pub const OVERRIDES: &[Override] = &[
    Override {
        name: "deprecation-keywords",
        intent: Intent::DeprecationInfo,
        matches: mentions_deprecation,
        strong: true,
    },
    Override {
        name: "ticket-key",
        intent: Intent::JiraDetail,
        matches: mentions_ticket_key,
        strong: true,
    },
    Override {
        name: "ticket-count",
        intent: Intent::JiraCount,
        matches: asks_ticket_count,
        strong: false,
    },
];

/// Apply `overrides` in order on top of the model's intent
pub fn apply_overrides(question: &str, baseline: Intent, overrides: &[Override]) -> Intent {
    let q = question.to_lowercase();
    let mut intent = baseline;
    let mut overridden = false;

    for rule in overrides {
        if (rule.strong || !overridden) && (rule.matches)(&q) {
            debug!("Override '{}' -> {}", rule.name, rule.intent);
            intent = rule.intent;
            overridden = true;
        }
    }

    intent
}

/// Classifies questions with one model call plus deterministic overrides
pub struct IntentRouter {
    generator: Arc<dyn TextGenerator>,
    overrides: &'static [Override],
}

impl IntentRouter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            overrides: OVERRIDES,
        }
    }

    pub async fn classify(&self, question: &str) -> Result<Intent, EolError> {
        let raw = self
            .generator
            .generate(&classification_prompt(question), Some(CLASSIFIER_INSTRUCTION))
            .await
            .map_err(|cause| EolError::ClassificationError { cause })?;

        let baseline = Intent::find_in(raw.trim()).unwrap_or_else(|| {
            debug!("Unrecognized intent label {:?}, using GENERAL", raw);
            Intent::General
        });
        debug!("Model classified as {}", baseline);

        Ok(apply_overrides(question, baseline, self.overrides))
    }
}
