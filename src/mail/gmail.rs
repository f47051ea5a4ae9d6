// src/mail/gmail.rs
//! Thin Gmail REST client - only the two message endpoints the sync job needs.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::GmailConfig;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ListMessagesResponse {
    messages: Option<Vec<MessageRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub body: MessageBody,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: MessageBody,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub payload: MessagePayload,
}

pub struct GmailClient {
    client: reqwest::Client,
    access_token: String,
}

impl GmailClient {
    pub fn new(config: &GmailConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            access_token: config.access_token.clone(),
        })
    }

    /// List recent message ids matching the provider query, capped at
    /// `max_results`.
    pub async fn list_messages(&self, query: &str, max_results: usize) -> Result<Vec<MessageRef>> {
        let url = format!("{}/users/me/messages", GMAIL_API_BASE);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("q", query), ("maxResults", &max_results.to_string())])
            .send()
            .await
            .context("Gmail list request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gmail list request returned {}: {}", status, body);
        }

        let list: ListMessagesResponse = response
            .json()
            .await
            .context("Failed to parse Gmail list response")?;

        let messages = list.messages.unwrap_or_default();
        debug!("Gmail query matched {} message(s)", messages.len());
        Ok(messages)
    }

    /// Fetch one full message with payload and headers.
    pub async fn get_message(&self, id: &str) -> Result<Message> {
        let url = format!("{}/users/me/messages/{}", GMAIL_API_BASE, id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await
            .with_context(|| format!("Gmail get request failed for message {}", id))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gmail get request for {} returned {}: {}", id, status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse Gmail message {}", id))
    }
}
