// src/telegram/commands.rs
use anyhow::Result;
use tracing::{error, info};

use crate::context::AppContext;
use crate::database::{ApplicationRepository, NewApplication};
use crate::sync::run_sync;
use crate::telegram::client::TelegramClient;

/// A fully validated bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Status { company: String },
    List,
    Sync,
    Add { company: String, status: String },
    Update { company: String, status: String },
    Delete { company: String },
}

/// Parse outcome: a command, a usage hint for a known command with missing
/// arguments, or text the bot ignores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Command(Command),
    Usage(String),
    Ignored,
}

const START_TEXT: &str = "👋 Hi! I'm your Job Tracker Bot.\n\n\
Commands:\n\
• /status <company> → Check status of a company\n\
• /list → Show all applications\n\
• /sync → Sync latest job updates from Gmail\n\
• /add <company> <status> → Add new application\n\
• /update <company> <status> → Update application status\n\
• /delete <company> → Delete an application";

/// Parse a message text into a command. Validation failures become usage
/// hints for the user instead of errors for the caller.
pub fn parse_command(text: &str) -> Parsed {
    let mut words = text.split_whitespace();
    let Some(command) = words.next() else {
        return Parsed::Ignored;
    };
    let args: Vec<&str> = words.collect();

    match command {
        "/start" => Parsed::Command(Command::Start),
        "/list" => Parsed::Command(Command::List),
        "/sync" => Parsed::Command(Command::Sync),
        "/status" => {
            if args.is_empty() {
                Parsed::Usage(
                    "Please provide a company name. Example: /status Google".to_string(),
                )
            } else {
                Parsed::Command(Command::Status {
                    company: args.join(" "),
                })
            }
        }
        "/add" => {
            if args.len() < 2 {
                Parsed::Usage(
                    "❌ Usage: /add <company_name> <status>\nExample: /add Google Applied"
                        .to_string(),
                )
            } else {
                Parsed::Command(Command::Add {
                    company: args[0].to_string(),
                    status: args[1..].join(" "),
                })
            }
        }
        "/update" => {
            if args.len() < 2 {
                Parsed::Usage(
                    "❌ Usage: /update <company_name> <new_status>\nExample: /update Google Interview Scheduled"
                        .to_string(),
                )
            } else {
                Parsed::Command(Command::Update {
                    company: args[0].to_string(),
                    status: args[1..].join(" "),
                })
            }
        }
        "/delete" => {
            if args.is_empty() {
                Parsed::Usage(
                    "❌ Usage: /delete <company_name>\nExample: /delete Google".to_string(),
                )
            } else {
                Parsed::Command(Command::Delete {
                    company: args.join(" "),
                })
            }
        }
        _ => Parsed::Ignored,
    }
}

/// Execute one parsed message end to end, replying on the same chat. Store
/// and sync failures are logged and reported as a generic user-facing
/// message; they never take down the polling loop.
pub async fn handle_message(
    ctx: &AppContext,
    client: &TelegramClient,
    chat_id: i64,
    text: &str,
) -> Result<()> {
    match parse_command(text) {
        Parsed::Ignored => Ok(()),
        Parsed::Usage(hint) => client.send_message(chat_id, &hint).await,
        Parsed::Command(command) => {
            info!("Executing bot command: {:?}", command);
            let reply = match execute(ctx, client, chat_id, command).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Bot command failed: {:#}", e);
                    "⚠️ Something went wrong. Please try again.".to_string()
                }
            };
            client.send_message(chat_id, &reply).await
        }
    }
}

async fn execute(
    ctx: &AppContext,
    client: &TelegramClient,
    chat_id: i64,
    command: Command,
) -> Result<String> {
    let pool = ctx.db.pool()?;
    let repo = ApplicationRepository::new(pool);

    let reply = match command {
        Command::Start => START_TEXT.to_string(),

        Command::Status { company } => {
            let apps = repo.search_by_company(&company).await?;
            if apps.is_empty() {
                format!("No applications found for {}.", company)
            } else {
                apps.iter()
                    .map(|a| format!("🏢 {} → 📌 {}", a.company_name, a.status))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }

        Command::List => {
            let apps = repo.list().await?;
            if apps.is_empty() {
                "📂 No applications found in the tracker.".to_string()
            } else {
                let lines = apps
                    .iter()
                    .map(|a| format!("🏢 {} → 📌 {}", a.company_name, a.status))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("📋 All Applications:\n{}", lines)
            }
        }

        Command::Sync => {
            client
                .send_message(chat_id, "🔄 Syncing Gmail for updates... Please wait.")
                .await?;

            match run_sync(ctx).await {
                Ok(updated) if !updated.is_empty() => {
                    let lines = updated
                        .iter()
                        .map(|u| format!("🏢 {} → 📌 {}", u.company, u.new_status))
                        .collect::<Vec<_>>()
                        .join("\n");
                    format!("✅ Sync completed:\n{}", lines)
                }
                Ok(_) => "⚠️ No new updates found.".to_string(),
                Err(e) => {
                    error!("Manual sync failed: {:#}", e);
                    "⚠️ Sync failed. Check the server logs.".to_string()
                }
            }
        }

        Command::Add { company, status } => {
            let app = repo
                .create(NewApplication {
                    company_name: company,
                    status: Some(status),
                    ..Default::default()
                })
                .await?;
            format!("✅ Added new application:\n🏢 {} → 📌 {}", app.company_name, app.status)
        }

        Command::Update { company, status } => {
            match repo.update_status_by_company(&company, &status).await? {
                Some(app) => {
                    format!("✅ Updated:\n🏢 {} → 📌 {}", app.company_name, app.status)
                }
                None => format!("❌ No application found for {}.", company),
            }
        }

        Command::Delete { company } => match repo.delete_by_company(&company).await? {
            Some(_) => format!("🗑️ Deleted application for {}.", company),
            None => format!("❌ No application found for {}.", company),
        },
    };

    Ok(reply)
}
