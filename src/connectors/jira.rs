use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use super::fixtures;
use super::traits::TicketProvider;
use super::types::{ProviderMode, Ticket};
use crate::constants::{JIRA_DEFAULT_ISSUE_TYPE, JIRA_PAGE_SIZE};

const ISSUE_FIELDS: &str = "summary,status,description,assignee";

/// Credentials and target project for a live Jira instance
#[derive(Debug, Clone)]
pub struct JiraCredentials {
    pub server: String,
    pub email: String,
    pub token: String,
    pub project_key: String,
}

enum Backend {
    Live {
        client: Client,
        credentials: JiraCredentials,
    },
    Offline {
        tickets: Vec<Ticket>,
        project_key: String,
        next_number: AtomicU64,
    },
}

/// Jira REST v2 connector with an explicit offline mode
pub struct JiraConnector {
    backend: Backend,
}

impl JiraConnector {
    /// Connect to a live Jira instance
    pub fn live(credentials: JiraCredentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        info!("Jira connector live against {}", credentials.server);
        Ok(Self {
            backend: Backend::Live {
                client,
                credentials: JiraCredentials {
                    server: credentials.server.trim_end_matches('/').to_string(),
                    ..credentials
                },
            },
        })
    }

    /// Serve the demo SCRUM fixtures
    pub fn offline() -> Self {
        Self::with_fixtures("SCRUM", fixtures::tickets())
    }

    /// Serve the given tickets without touching the network
    pub fn with_fixtures(project_key: impl Into<String>, tickets: Vec<Ticket>) -> Self {
        let highest = tickets
            .iter()
            .filter_map(|t| t.key.rsplit('-').next()?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            backend: Backend::Offline {
                tickets,
                project_key: project_key.into(),
                next_number: AtomicU64::new(highest + 1),
            },
        }
    }

    fn auth(request: reqwest::RequestBuilder, credentials: &JiraCredentials) -> reqwest::RequestBuilder {
        request
            .basic_auth(&credentials.email, Some(&credentials.token))
            .header("Accept", "application/json")
    }

    async fn search(
        client: &Client,
        credentials: &JiraCredentials,
        status: Option<&str>,
    ) -> Result<Vec<Ticket>> {
        let jql = build_jql(&credentials.project_key, status);
        let url = format!("{}/rest/api/2/search", credentials.server);
        debug!("Jira search: {}", jql);

        let mut tickets = Vec::new();
        let mut start_at = 0usize;

        let page_size = JIRA_PAGE_SIZE.to_string();

        loop {
            let offset = start_at.to_string();
            let request = client.get(&url).query(&[
                ("jql", jql.as_str()),
                ("fields", ISSUE_FIELDS),
                ("startAt", offset.as_str()),
                ("maxResults", page_size.as_str()),
            ]);

            let response = Self::auth(request, credentials)
                .send()
                .await
                .with_context(|| format!("Failed to reach Jira at {}", credentials.server))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                anyhow::bail!("Jira search failed ({}): {}", status, error_text);
            }

            let page: SearchResponse = response.json().await.context("Malformed Jira search response")?;
            let fetched = page.issues.len();
            tickets.extend(page.issues.into_iter().map(Issue::into_ticket));
            start_at += fetched;

            if fetched == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(tickets)
    }
}

/// JQL for every issue of a project, optionally filtered by status
fn build_jql(project_key: &str, status: Option<&str>) -> String {
    let mut jql = format!("project = \"{}\"", escape_jql(project_key));
    if let Some(status) = status {
        jql.push_str(&format!(" AND status = \"{}\"", escape_jql(status)));
    }
    jql
}

fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl TicketProvider for JiraConnector {
    async fn list(&self, status: Option<&str>) -> Result<Vec<Ticket>> {
        match &self.backend {
            Backend::Live {
                client,
                credentials,
            } => Self::search(client, credentials, status).await,
            Backend::Offline { tickets, .. } => Ok(tickets
                .iter()
                .filter(|t| status.map_or(true, |s| t.status.eq_ignore_ascii_case(s)))
                .cloned()
                .collect()),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Ticket>> {
        match &self.backend {
            Backend::Live {
                client,
                credentials,
            } => {
                let url = format!("{}/rest/api/2/issue/{}", credentials.server, key);
                let request = client.get(&url).query(&[("fields", ISSUE_FIELDS)]);
                let response = Self::auth(request, credentials)
                    .send()
                    .await
                    .with_context(|| format!("Failed to reach Jira at {}", credentials.server))?;

                if response.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if !response.status().is_success() {
                    let status = response.status();
                    let error_text = response.text().await.unwrap_or_default();
                    anyhow::bail!("Jira lookup of {} failed ({}): {}", key, status, error_text);
                }

                let issue: Issue = response.json().await.context("Malformed Jira issue")?;
                Ok(Some(issue.into_ticket()))
            }
            Backend::Offline { tickets, .. } => Ok(tickets.iter().find(|t| t.key == key).cloned()),
        }
    }

    async fn create(&self, summary: &str, description: &str) -> Result<String> {
        match &self.backend {
            Backend::Live {
                client,
                credentials,
            } => {
                let url = format!("{}/rest/api/2/issue", credentials.server);
                let body = json!({
                    "fields": {
                        "project": { "key": credentials.project_key },
                        "summary": summary,
                        "description": description,
                        "issuetype": { "name": JIRA_DEFAULT_ISSUE_TYPE },
                    }
                });

                let response = Self::auth(client.post(&url).json(&body), credentials)
                    .send()
                    .await
                    .with_context(|| format!("Failed to reach Jira at {}", credentials.server))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let error_text = response.text().await.unwrap_or_default();
                    anyhow::bail!("Jira issue creation failed ({}): {}", status, error_text);
                }

                let created: CreatedIssue = response.json().await.context("Malformed Jira create response")?;
                info!("Created Jira issue {}", created.key);
                Ok(created.key)
            }
            Backend::Offline {
                project_key,
                next_number,
                ..
            } => {
                let key = format!("{}-{}", project_key, next_number.fetch_add(1, Ordering::Relaxed));
                info!("Offline mode: pretended to create {} for '{}'", key, summary);
                Ok(key)
            }
        }
    }

    fn mode(&self) -> ProviderMode {
        match self.backend {
            Backend::Live { .. } => ProviderMode::Live,
            Backend::Offline { .. } => ProviderMode::Offline,
        }
    }
}

// Response structures for the Jira REST v2 API

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
    status: Option<NamedField>,
    description: Option<String>,
    assignee: Option<Assignee>,
}

#[derive(Debug, Deserialize)]
struct NamedField {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Assignee {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

impl Issue {
    fn into_ticket(self) -> Ticket {
        Ticket {
            key: self.key,
            summary: self.fields.summary,
            status: self.fields.status.map(|s| s.name).unwrap_or_default(),
            description: self.fields.description.unwrap_or_default(),
            assignee: self.fields.assignee.map(|a| a.display_name),
        }
    }
}
