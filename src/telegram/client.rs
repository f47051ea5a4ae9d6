// src/telegram/client.rs
//! Minimal Telegram Bot API client: long-poll getUpdates plus sendMessage.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Long-poll window for getUpdates.
pub const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Result<Self> {
        // Request timeout must outlast the long-poll window.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", TELEGRAM_API_BASE, bot_token),
        })
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let url = format!("{}/getUpdates", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
                ("allowed_updates", "[\"message\"]".to_string()),
            ])
            .send()
            .await
            .context("Telegram getUpdates request failed")?;

        let api: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .context("Failed to parse Telegram getUpdates response")?;

        if !api.ok {
            anyhow::bail!(
                "Telegram getUpdates rejected: {}",
                api.description.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        Ok(api.result.unwrap_or_default())
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{}/sendMessage", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .context("Telegram sendMessage request failed")?;

        let api: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .context("Failed to parse Telegram sendMessage response")?;

        if !api.ok {
            anyhow::bail!(
                "Telegram sendMessage rejected: {}",
                api.description.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        Ok(())
    }
}
