// src/summary.rs
use anyhow::Result;
use tracing::info;

use crate::context::AppContext;
use crate::database::{Application, ApplicationRepository};
use crate::telegram::TelegramClient;

const SUMMARY_TITLE: &str = "📊 Daily Job Application Summary";

/// Render the summary body: one line per tracked application.
pub fn format_summary(apps: &[Application]) -> String {
    if apps.is_empty() {
        return "No applications tracked yet.".to_string();
    }

    apps.iter()
        .map(|a| format!("{} - {} ({}) → {}", a.company_name, a.role, a.platform, a.status))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read-only daily job: list every record and push it to the configured
/// notification chat.
pub async fn send_daily_summary(ctx: &AppContext) -> Result<()> {
    let pool = ctx.db.pool()?;
    let apps = ApplicationRepository::new(pool).list().await?;

    let body = format_summary(&apps);
    let text = format!("{}\n\n{}", SUMMARY_TITLE, body);

    let client = TelegramClient::new(&ctx.config.telegram.bot_token)?;
    client
        .send_message(ctx.config.telegram.summary_chat_id, &text)
        .await?;

    info!("Daily summary sent ({} application(s))", apps.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn app(company: &str, role: &str, platform: &str, status: &str) -> Application {
        let now = Utc::now();
        Application {
            id: 1,
            company_name: company.to_string(),
            role: role.to_string(),
            platform: platform.to_string(),
            date_applied: now.date_naive(),
            status: status.to_string(),
            job_link: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_format_summary_empty() {
        assert_eq!(format_summary(&[]), "No applications tracked yet.");
    }

    #[test]
    fn test_format_summary_lines() {
        let apps = vec![
            app("Google", "SWE", "LinkedIn", "Applied"),
            app("Netflix", "Not specified", "Not specified", "Offer"),
        ];
        let body = format_summary(&apps);
        assert_eq!(
            body,
            "Google - SWE (LinkedIn) → Applied\nNetflix - Not specified (Not specified) → Offer"
        );
    }
}
