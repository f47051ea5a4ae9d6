// src/telegram/mod.rs
pub mod client;
pub mod commands;

pub use client::TelegramClient;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::context::AppContext;

/// Run the bot polling loop. Transport errors back off and retry; command
/// failures are absorbed per message inside `handle_message`.
pub async fn run_bot(ctx: Arc<AppContext>) -> Result<()> {
    let client = TelegramClient::new(&ctx.config.telegram.bot_token)?;
    info!("Telegram bot polling started");

    let mut offset: i64 = 0;
    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed, retrying in 5s: {:#}", e);
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else { continue };
            let Some(text) = message.text else { continue };

            if let Err(e) = commands::handle_message(&ctx, &client, message.chat.id, &text).await {
                warn!("Failed to answer chat {}: {:#}", message.chat.id, e);
            }
        }
    }
}
