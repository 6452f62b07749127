use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the Python deprecation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationRecord {
    /// Deprecated API, usually a dotted name such as `ast.Num`
    pub feature: String,
    /// Version the deprecation started in, empty when the docs don't say
    #[serde(default)]
    pub version_deprecated: String,
    /// Version the feature is (or was) removed in
    #[serde(default)]
    pub version_removed: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub description: String,
    /// "Use X instead" hint when the docs give one
    #[serde(default)]
    pub replacement: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl DeprecationRecord {
    pub fn new(feature: impl Into<String>, version_deprecated: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            version_deprecated: version_deprecated.into(),
            version_removed: None,
            module: None,
            description: String::new(),
            replacement: None,
            url: None,
        }
    }

    pub fn removed_in(mut self, version: impl Into<String>) -> Self {
        self.version_removed = Some(version.into());
        self
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn replaced_by(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    pub fn at(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A Jira issue as the assistant sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// `PROJECT-NUMBER`
    pub key: String,
    pub summary: String,
    /// Workflow label, e.g. "To Do", "In Progress", "Testing", "Done"
    pub status: String,
    pub description: String,
    pub assignee: Option<String>,
}

impl Ticket {
    pub fn new(
        key: impl Into<String>,
        summary: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        let key = key.into();
        Self {
            description: format!("Task for {}", key),
            key,
            summary: summary.into(),
            status: status.into(),
            assignee: None,
        }
    }
}

/// A note in the Drive backlog folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogItem {
    pub title: String,
    pub description: String,
    /// File the item was read from
    pub source: String,
}

impl BacklogItem {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            source: source.into(),
        }
    }
}

/// Whether a provider talks to its backend or serves fixtures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    Live,
    Offline,
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderMode::Live => write!(f, "live"),
            ProviderMode::Offline => write!(f, "offline"),
        }
    }
}
