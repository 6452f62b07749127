use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::intent::Intent;
use super::matcher::{match_deprecations, MatchMode, MatchResult};
use crate::connectors::{BacklogItem, BacklogProvider, DeprecationRecord, Ticket, TicketProvider};
use crate::constants::{STATUS_KEYWORDS, TICKET_KEY_PREFIX};
use crate::utils::{EolError, ProviderKind};

static TICKET_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"scrum-(\d+)").expect("static regex"));

const NA: &str = "N/A";

/// Turns an intent into the plain-text evidence block for the final prompt
pub struct ContextAssembler<'a> {
    catalog: &'a [DeprecationRecord],
    tickets: &'a dyn TicketProvider,
    backlog: &'a dyn BacklogProvider,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(
        catalog: &'a [DeprecationRecord],
        tickets: &'a dyn TicketProvider,
        backlog: &'a dyn BacklogProvider,
    ) -> Self {
        Self {
            catalog,
            tickets,
            backlog,
        }
    }

    pub async fn build(&self, intent: Intent, question: &str) -> Result<String, EolError> {
        match intent {
            Intent::DeprecationInfo => Ok(render_matches(&match_deprecations(question, self.catalog))),
            Intent::DeprecationGap => {
                let items = self.backlog_items().await?;
                Ok(render_gaps(&find_gaps(self.catalog, &items)))
            }
            Intent::JiraList => {
                let tickets = self.tickets_with_status(None).await?;
                Ok(render_ticket_list(&tickets))
            }
            Intent::JiraCount => {
                let status = infer_status(question);
                let tickets = self.tickets_with_status(status).await?;
                Ok(render_count(tickets.len(), status))
            }
            Intent::JiraDetail => {
                let Some(key) = extract_ticket_key(question) else {
                    return Ok(format!(
                        "Could not identify ticket key ({}-XXX) in query.",
                        TICKET_KEY_PREFIX
                    ));
                };
                let ticket = self
                    .tickets
                    .get(&key)
                    .await
                    .map_err(|cause| EolError::retrieval(ProviderKind::Tickets, cause))?;
                Ok(match ticket {
                    Some(ticket) => render_ticket(&ticket),
                    None => format!("Ticket {} not found.", key),
                })
            }
            Intent::BacklogList => {
                let items = self.backlog_items().await?;
                Ok(render_backlog(&items))
            }
            Intent::BacklogPickup => {
                let items = self.backlog_items().await?;
                let tickets = self.tickets_with_status(None).await?;
                Ok(render_pickup(&find_pickups(&items, &tickets)))
            }
            Intent::General => Ok(String::new()),
        }
    }

    async fn backlog_items(&self) -> Result<Vec<BacklogItem>, EolError> {
        self.backlog
            .list()
            .await
            .map_err(|cause| EolError::retrieval(ProviderKind::Backlog, cause))
    }

    async fn tickets_with_status(&self, status: Option<&str>) -> Result<Vec<Ticket>, EolError> {
        self.tickets
            .list(status)
            .await
            .map_err(|cause| EolError::retrieval(ProviderKind::Tickets, cause))
    }
}

/// Workflow status named by the question, first keyword wins
pub fn infer_status(question: &str) -> Option<&'static str> {
    let q = question.to_lowercase();
    STATUS_KEYWORDS
        .iter()
        .find(|(keyword, _)| q.contains(keyword))
        .map(|(_, status)| *status)
}

pub fn extract_ticket_key(question: &str) -> Option<String> {
    let q = question.to_lowercase();
    TICKET_NUMBER_RE
        .captures(&q)
        .map(|caps| format!("{}-{}", TICKET_KEY_PREFIX, &caps[1]))
}

/// Catalog records whose feature appears in no backlog title
pub fn find_gaps<'c>(catalog: &'c [DeprecationRecord], items: &[BacklogItem]) -> Vec<&'c DeprecationRecord> {
    let titles: HashSet<String> = items.iter().map(|item| item.title.to_lowercase()).collect();

    catalog
        .iter()
        .filter(|dep| {
            let feature = dep.feature.to_lowercase();
            !titles.iter().any(|title| title.contains(&feature))
        })
        .collect()
}

/// Backlog items whose title matches no ticket summary exactly (ignoring case)
pub fn find_pickups<'b>(items: &'b [BacklogItem], tickets: &[Ticket]) -> Vec<&'b BacklogItem> {
    let summaries: HashSet<String> = tickets.iter().map(|t| t.summary.to_lowercase()).collect();

    items
        .iter()
        .filter(|item| !summaries.contains(&item.title.to_lowercase()))
        .collect()
}

fn render_matches(result: &MatchResult<'_>) -> String {
    match result.mode {
        MatchMode::RemovalList => {
            let target = result.target.as_deref().unwrap_or(NA);
            if result.hits.is_empty() {
                return format!("No deprecations found pending removal in Python {}.", target);
            }
            let entries: Vec<String> = result
                .hits
                .iter()
                .map(|d| {
                    entry(
                        format!(
                            "- {} | Deprecated: {} | Module: {}",
                            d.feature,
                            or_na(&d.version_deprecated),
                            d.module.as_deref().unwrap_or(NA)
                        ),
                        d,
                    )
                })
                .collect();
            format!("Deprecations pending removal in Python {}:\n{}", target, entries.join("\n"))
        }
        MatchMode::FeatureSearch => {
            if result.hits.is_empty() {
                return "No matching deprecations found in the official list.".to_string();
            }
            let entries: Vec<String> = result
                .hits
                .iter()
                .map(|d| {
                    entry(
                        format!(
                            "- {} (Deprecated: {}, Removed: {}) | Module: {}",
                            d.feature,
                            or_na(&d.version_deprecated),
                            d.version_removed.as_deref().unwrap_or(NA),
                            d.module.as_deref().unwrap_or(NA)
                        ),
                        d,
                    )
                })
                .collect();
            format!("Matching deprecations:\n{}", entries.join("\n"))
        }
    }
}

/// Headline plus indented description and url lines, trailing blanks dropped
fn entry(headline: String, record: &DeprecationRecord) -> String {
    let mut text = headline;
    text.push_str(&format!("\n  {}", record.description));
    if let Some(replacement) = &record.replacement {
        text.push_str(&format!("\n  Replacement: {}", replacement));
    }
    text.push_str(&format!("\n  {}", record.url.as_deref().unwrap_or("")));
    text.trim_end().to_string()
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        NA
    } else {
        value
    }
}

fn render_gaps(gaps: &[&DeprecationRecord]) -> String {
    if gaps.is_empty() {
        return "All deprecations seem to be represented in the backlog.".to_string();
    }
    let lines: Vec<String> = gaps
        .iter()
        .map(|d| format!("- {} (Deprecated: {})", d.feature, or_na(&d.version_deprecated)))
        .collect();
    format!("Deprecations NOT found in Backlog:\n{}", lines.join("\n"))
}

fn render_ticket_list(tickets: &[Ticket]) -> String {
    if tickets.is_empty() {
        return "No Jira tickets found.".to_string();
    }
    let lines: Vec<String> = tickets
        .iter()
        .map(|t| format!("{}: {} ({})", t.key, t.summary, t.status))
        .collect();
    format!("Jira Tickets:\n{}", lines.join("\n"))
}

fn render_count(count: usize, status: Option<&str>) -> String {
    format!("Found {} tickets with status '{}'.", count, status.unwrap_or("Total"))
}

fn render_ticket(ticket: &Ticket) -> String {
    format!(
        "Ticket Details:\nKey: {}\nSummary: {}\nStatus: {}\nDescription: {}\nAssignee: {}",
        ticket.key,
        ticket.summary,
        ticket.status,
        ticket.description,
        ticket.assignee.as_deref().unwrap_or("Unassigned")
    )
}

fn render_backlog(items: &[BacklogItem]) -> String {
    if items.is_empty() {
        return "Backlog is empty.".to_string();
    }
    let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
    format!("Backlog Files:\n{}", titles.join("\n"))
}

fn render_pickup(items: &[&BacklogItem]) -> String {
    if items.is_empty() {
        return "Everything in backlog is already in Jira.".to_string();
    }
    let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
    format!("Items to Pickup (in Backlog but not Jira):\n{}", titles.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::{GDriveConnector, JiraConnector, MockBacklogProvider};
    use pretty_assertions::assert_eq;

    fn catalog() -> Vec<DeprecationRecord> {
        vec![
            DeprecationRecord::new("asyncio.coroutine", "3.8")
                .removed_in("3.11")
                .in_module("asyncio")
                .described("Use async def instead.")
                .at("https://docs.python.org/3/deprecations/#asyncio"),
            DeprecationRecord::new("smtpd module", "3.6")
                .removed_in("3.12")
                .described("Use aiosmtpd instead.")
                .replaced_by("aiosmtpd"),
        ]
    }

    async fn build(
        intent: Intent,
        question: &str,
        catalog: &[DeprecationRecord],
        jira: &JiraConnector,
        drive: &GDriveConnector,
    ) -> String {
        ContextAssembler::new(catalog, jira, drive)
            .build(intent, question)
            .await
            .unwrap()
    }

    #[test]
    fn test_infer_status_order() {
        assert_eq!(infer_status("how many testing tickets?"), Some("Testing"));
        assert_eq!(infer_status("How many are Done"), Some("Done"));
        assert_eq!(infer_status("tickets in progress"), Some("In Progress"));
        assert_eq!(infer_status("what is still to do"), Some("To Do"));
        assert_eq!(infer_status("todo count"), Some("To Do"));
        assert_eq!(infer_status("done testing?"), Some("Testing"));
        assert_eq!(infer_status("how many tickets"), None);
    }

    #[test]
    fn test_extract_ticket_key() {
        assert_eq!(extract_ticket_key("show Scrum-42 please"), Some("SCRUM-42".to_string()));
        assert_eq!(extract_ticket_key("show scrum-x"), None);
        assert_eq!(extract_ticket_key("show the ticket"), None);
    }

    #[test]
    fn test_gap_uses_substring_of_titles() {
        let catalog = catalog();
        let items = vec![BacklogItem::new("Remove asyncio.coroutine support", "", "a.txt")];

        let gaps = find_gaps(&catalog, &items);
        let features: Vec<_> = gaps.iter().map(|d| d.feature.as_str()).collect();
        assert_eq!(features, vec!["smtpd module"]);
    }

    #[test]
    fn test_pickup_compares_whole_titles_ignoring_case() {
        let items = vec![
            BacklogItem::new("Deprecate old SSL", "", "ssl.txt"),
            BacklogItem::new("Deprecate old SSL v2", "", "ssl2.txt"),
        ];
        let tickets = vec![Ticket::new("SCRUM-1", "deprecate old ssl", "To Do")];

        let pickups = find_pickups(&items, &tickets);
        assert_eq!(pickups.len(), 1);
        assert_eq!(pickups[0].title, "Deprecate old SSL v2");
    }

    #[tokio::test]
    async fn test_removal_list_context() {
        let catalog = catalog();
        let jira = JiraConnector::offline();
        let drive = GDriveConnector::offline();

        let context = build(
            Intent::DeprecationInfo,
            "what is pending removal in python 3.12?",
            &catalog,
            &jira,
            &drive,
        )
        .await;
        assert_eq!(
            context,
            "Deprecations pending removal in Python 3.12:\n\
             - smtpd module | Deprecated: 3.6 | Module: N/A\n  \
             Use aiosmtpd instead.\n  \
             Replacement: aiosmtpd"
        );

        let empty = build(
            Intent::DeprecationInfo,
            "pending removal in python 3.20",
            &catalog,
            &jira,
            &drive,
        )
        .await;
        assert_eq!(empty, "No deprecations found pending removal in Python 3.20.");
    }

    #[tokio::test]
    async fn test_feature_search_context() {
        let catalog = catalog();
        let jira = JiraConnector::offline();
        let drive = GDriveConnector::offline();

        let context = build(Intent::DeprecationInfo, "asyncio.coroutine", &catalog, &jira, &drive).await;
        assert_eq!(
            context,
            "Matching deprecations:\n\
             - asyncio.coroutine (Deprecated: 3.8, Removed: 3.11) | Module: asyncio\n  \
             Use async def instead.\n  \
             https://docs.python.org/3/deprecations/#asyncio"
        );

        let none = build(Intent::DeprecationInfo, "tkinter", &catalog, &jira, &drive).await;
        assert_eq!(none, "No matching deprecations found in the official list.");
    }

    #[tokio::test]
    async fn test_gap_context() {
        let catalog = catalog();
        let jira = JiraConnector::offline();
        let drive = GDriveConnector::with_fixtures(vec![BacklogItem::new(
            "Remove asyncio.coroutine support",
            "",
            "notes.txt",
        )]);

        let context = build(Intent::DeprecationGap, "what is missing", &catalog, &jira, &drive).await;
        assert_eq!(context, "Deprecations NOT found in Backlog:\n- smtpd module (Deprecated: 3.6)");

        let covered = GDriveConnector::with_fixtures(vec![
            BacklogItem::new("Remove asyncio.coroutine support", "", "a.txt"),
            BacklogItem::new("Drop the SMTPD MODULE", "", "b.txt"),
        ]);
        let context = build(Intent::DeprecationGap, "gaps?", &catalog, &jira, &covered).await;
        assert_eq!(context, "All deprecations seem to be represented in the backlog.");
    }

    #[tokio::test]
    async fn test_jira_list_context() {
        let jira = JiraConnector::offline();
        let drive = GDriveConnector::offline();

        let context = build(Intent::JiraList, "list tickets", &[], &jira, &drive).await;
        assert_eq!(
            context,
            "Jira Tickets:\n\
             SCRUM-1: Deprecate old C API (Testing)\n\
             SCRUM-6: Update documentation for ctypes (Done)\n\
             SCRUM-3: Another testing task (Testing)"
        );

        let empty = JiraConnector::with_fixtures("SCRUM", Vec::new());
        let context = build(Intent::JiraList, "list tickets", &[], &empty, &drive).await;
        assert_eq!(context, "No Jira tickets found.");
    }

    #[tokio::test]
    async fn test_jira_count_context() {
        let jira = JiraConnector::offline();
        let drive = GDriveConnector::offline();

        let testing = build(Intent::JiraCount, "How many testing tickets?", &[], &jira, &drive).await;
        assert_eq!(testing, "Found 2 tickets with status 'Testing'.");

        let total = build(Intent::JiraCount, "how many tickets?", &[], &jira, &drive).await;
        assert_eq!(total, "Found 3 tickets with status 'Total'.");

        let todo = build(Intent::JiraCount, "how many to do tickets", &[], &jira, &drive).await;
        assert_eq!(todo, "Found 0 tickets with status 'To Do'.");
    }

    #[tokio::test]
    async fn test_jira_detail_context() {
        let mut ticket = Ticket::new("SCRUM-9", "Replace ast.Num", "In Progress");
        ticket.assignee = Some("Dana".to_string());
        let jira = JiraConnector::with_fixtures("SCRUM", vec![ticket]);
        let drive = GDriveConnector::offline();

        let context = build(Intent::JiraDetail, "details of scrum-9", &[], &jira, &drive).await;
        assert_eq!(
            context,
            "Ticket Details:\nKey: SCRUM-9\nSummary: Replace ast.Num\nStatus: In Progress\n\
             Description: Task for SCRUM-9\nAssignee: Dana"
        );

        let missing = build(Intent::JiraDetail, "what about SCRUM-10", &[], &jira, &drive).await;
        assert_eq!(missing, "Ticket SCRUM-10 not found.");

        let no_key = build(Intent::JiraDetail, "that ticket", &[], &jira, &drive).await;
        assert_eq!(no_key, "Could not identify ticket key (SCRUM-XXX) in query.");
    }

    #[tokio::test]
    async fn test_backlog_contexts() {
        let jira = JiraConnector::with_fixtures(
            "SCRUM",
            vec![Ticket::new("SCRUM-2", "deprecate old ssl", "To Do")],
        );
        let drive = GDriveConnector::with_fixtures(vec![BacklogItem::new(
            "Deprecate old SSL",
            "Remove SSL v2/v3 support",
            "ssl_notes.txt",
        )]);

        let list = build(Intent::BacklogList, "show backlog", &[], &jira, &drive).await;
        assert_eq!(list, "Backlog Files:\nDeprecate old SSL");

        let pickup = build(Intent::BacklogPickup, "what to pick up", &[], &jira, &drive).await;
        assert_eq!(pickup, "Everything in backlog is already in Jira.");

        // the SSL note is tracked by SCRUM-2, the email note is not
        let fresh = GDriveConnector::offline();
        let pickup = build(Intent::BacklogPickup, "what to pick up", &[], &jira, &fresh).await;
        assert_eq!(
            pickup,
            "Items to Pickup (in Backlog but not Jira):\n\
             New deprecation for email module"
        );

        let empty = GDriveConnector::with_fixtures(Vec::new());
        let list = build(Intent::BacklogList, "show backlog", &[], &jira, &empty).await;
        assert_eq!(list, "Backlog is empty.");
    }

    #[tokio::test]
    async fn test_general_context_is_empty() {
        let jira = JiraConnector::offline();
        let drive = GDriveConnector::offline();
        assert_eq!(build(Intent::General, "hi", &catalog(), &jira, &drive).await, "");
    }

    #[tokio::test]
    async fn test_backlog_failure_is_tagged_retrieval_error() {
        let jira = JiraConnector::offline();
        let mut backlog = MockBacklogProvider::new();
        backlog
            .expect_list()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("401 Unauthorized")));

        let err = ContextAssembler::new(&[], &jira, &backlog)
            .build(Intent::BacklogList, "show backlog")
            .await
            .unwrap_err();

        match err {
            EolError::RetrievalError { provider, .. } => assert_eq!(provider, ProviderKind::Backlog),
            other => panic!("Expected retrieval error, got {:?}", other),
        }
    }
}
