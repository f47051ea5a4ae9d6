// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_GMAIL_QUERY: &str =
    "from:(linkedin.com OR naukri.com OR internshala.com OR indeed.com)";

/// Per-environment settings read from config.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

/// Telegram bot token plus the chat that receives the daily summary.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub summary_chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct GmailConfig {
    pub access_token: String,
    pub query: String,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub interval_hours: u64,
    pub summary_hour: u32,
    pub message_window: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: EnvironmentConfig,
    pub telegram: TelegramConfig,
    pub gmail: GmailConfig,
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration for the current environment. Missing config.yaml
    /// or missing required secrets abort startup.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        Ok(Self {
            environment: Self::load_environment_file(&environment)?,
            telegram: Self::load_telegram()?,
            gmail: Self::load_gmail()?,
            sync: Self::load_sync()?,
        })
    }

    fn get_environment() -> String {
        std::env::var("APPLITRACK_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_environment_file(environment: &str) -> Result<EnvironmentConfig> {
        let config_path = PathBuf::from("config.yaml");
        if !config_path.exists() {
            anyhow::bail!(
                "config.yaml not found in current directory. Server cannot start without configuration."
            );
        }

        let config_content =
            std::fs::read_to_string(&config_path).context("Failed to read config.yaml")?;

        let config_file: ConfigFile =
            serde_yaml::from_str(&config_content).context("Failed to parse config.yaml")?;

        let env_config = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(EnvironmentConfig {
            database_path: Self::resolve_path(&env_config.database_path)?,
            port: env_config.port,
        })
    }

    fn resolve_path(path: &PathBuf) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.clone())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    fn load_telegram() -> Result<TelegramConfig> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_BOT_TOKEN environment variable not set"))?;

        let summary_chat_id = std::env::var("TELEGRAM_SUMMARY_CHAT_ID")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_SUMMARY_CHAT_ID environment variable not set"))?
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("TELEGRAM_SUMMARY_CHAT_ID must be a numeric chat id"))?;

        Ok(TelegramConfig {
            bot_token,
            summary_chat_id,
        })
    }

    fn load_gmail() -> Result<GmailConfig> {
        let access_token = std::env::var("GMAIL_ACCESS_TOKEN")
            .map_err(|_| anyhow::anyhow!("GMAIL_ACCESS_TOKEN environment variable not set"))?;

        let query =
            std::env::var("GMAIL_QUERY").unwrap_or_else(|_| DEFAULT_GMAIL_QUERY.to_string());

        Ok(GmailConfig {
            access_token,
            query,
        })
    }

    fn load_sync() -> Result<SyncConfig> {
        let interval_hours = Self::env_number("SYNC_INTERVAL_HOURS", 12)?;
        let summary_hour: u64 = Self::env_number("SUMMARY_HOUR", 9)?;
        if summary_hour > 23 {
            anyhow::bail!("SUMMARY_HOUR must be between 0 and 23");
        }
        let message_window = Self::env_number("SYNC_MESSAGE_WINDOW", 10)? as usize;

        Ok(SyncConfig {
            interval_hours,
            summary_hour: summary_hour as u32,
            message_window,
        })
    }

    fn env_number(name: &str, default: u64) -> Result<u64> {
        match std::env::var(name) {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("{} must be a number, got: {}", name, raw)),
            Err(_) => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_file_sections() {
        let yaml = r#"
local:
  database_path: data/applitrack.db
  port: 8000
production:
  database_path: /app/data/applitrack.db
  port: 8000
"#;
        let parsed: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.local.port, 8000);
        assert!(parsed.production.database_path.is_absolute());
    }

    #[test]
    fn test_default_gmail_query_targets_job_platforms() {
        assert!(DEFAULT_GMAIL_QUERY.contains("linkedin.com"));
        assert!(DEFAULT_GMAIL_QUERY.contains("indeed.com"));
    }
}
