use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::fixtures;
use super::traits::BacklogProvider;
use super::types::{BacklogItem, ProviderMode};
use crate::constants::{GDRIVE_API_BASE, GDRIVE_DOC_MIME, GDRIVE_FOLDER_MIME, GDRIVE_TEXT_MIME};

enum Backend {
    Live {
        client: Client,
        api_base: String,
        access_token: String,
        folder: String,
    },
    Offline {
        items: Vec<BacklogItem>,
    },
}

/// Google Drive v3 connector reading backlog notes from one folder
pub struct GDriveConnector {
    backend: Backend,
}

impl GDriveConnector {
    /// Read notes from the named folder with an already-issued access token
    pub fn live(access_token: String, folder: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        info!("Drive connector live, backlog folder '{}'", folder);
        Ok(Self {
            backend: Backend::Live {
                client,
                api_base: GDRIVE_API_BASE.to_string(),
                access_token,
                folder,
            },
        })
    }

    /// Serve the demo backlog notes
    pub fn offline() -> Self {
        Self::with_fixtures(fixtures::backlog())
    }

    pub fn with_fixtures(items: Vec<BacklogItem>) -> Self {
        Self {
            backend: Backend::Offline { items },
        }
    }

    async fn fetch(
        client: &Client,
        api_base: &str,
        access_token: &str,
        folder: &str,
    ) -> Result<Vec<BacklogItem>> {
        let folder_query = format!(
            "name = '{}' and mimeType = '{}'",
            escape_query(folder),
            GDRIVE_FOLDER_MIME
        );
        let folders = list_files(client, api_base, access_token, &folder_query).await?;

        let Some(folder_entry) = folders.into_iter().next() else {
            warn!("Drive folder '{}' not found, backlog is empty", folder);
            return Ok(Vec::new());
        };

        let children_query = format!(
            "'{}' in parents and (mimeType = '{}' or mimeType = '{}')",
            folder_entry.id, GDRIVE_TEXT_MIME, GDRIVE_DOC_MIME
        );
        let files = list_files(client, api_base, access_token, &children_query).await?;
        debug!("Drive folder '{}' holds {} notes", folder, files.len());

        let mut items = Vec::with_capacity(files.len());
        for file in files {
            let content = read_content(client, api_base, access_token, &file).await?;
            items.push(BacklogItem {
                title: file.name.clone(),
                description: content,
                source: file.name,
            });
        }

        Ok(items)
    }
}

fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Run a Drive `files.list` query across all pages
async fn list_files(
    client: &Client,
    api_base: &str,
    access_token: &str,
    query: &str,
) -> Result<Vec<DriveFile>> {
    let url = format!("{}/files", api_base);
    let mut files = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut params = vec![
            ("q", query.to_string()),
            ("fields", "nextPageToken, files(id, name, mimeType)".to_string()),
            ("spaces", "drive".to_string()),
        ];
        if let Some(token) = &page_token {
            params.push(("pageToken", token.clone()));
        }

        let response = client
            .get(&url)
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await
            .context("Failed to reach Google Drive")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Drive file listing failed ({}): {}", status, error_text);
        }

        let page: FileList = response.json().await.context("Malformed Drive file list")?;
        files.extend(page.files);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(files)
}

/// Google Docs are exported as plain text, text files are downloaded as-is
async fn read_content(
    client: &Client,
    api_base: &str,
    access_token: &str,
    file: &DriveFile,
) -> Result<String> {
    let request = if file.mime_type == GDRIVE_DOC_MIME {
        client
            .get(format!("{}/files/{}/export", api_base, file.id))
            .query(&[("mimeType", GDRIVE_TEXT_MIME)])
    } else {
        client
            .get(format!("{}/files/{}", api_base, file.id))
            .query(&[("alt", "media")])
    };

    let response = request
        .bearer_auth(access_token)
        .send()
        .await
        .with_context(|| format!("Failed to download '{}'", file.name))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Reading '{}' failed ({}): {}", file.name, status, error_text);
    }

    response
        .text()
        .await
        .with_context(|| format!("'{}' is not valid text", file.name))
}

#[async_trait]
impl BacklogProvider for GDriveConnector {
    async fn list(&self) -> Result<Vec<BacklogItem>> {
        match &self.backend {
            Backend::Live {
                client,
                api_base,
                access_token,
                folder,
            } => Self::fetch(client, api_base, access_token, folder).await,
            Backend::Offline { items } => Ok(items.clone()),
        }
    }

    fn mode(&self) -> ProviderMode {
        match self.backend {
            Backend::Live { .. } => ProviderMode::Live,
            Backend::Offline { .. } => ProviderMode::Offline,
        }
    }
}

// Response structures for the Drive v3 API

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
}
