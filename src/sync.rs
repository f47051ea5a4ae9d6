// src/sync.rs
use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::database::ApplicationRepository;
use crate::mail::parser::{parse_message, ParsedEmail};
use crate::mail::GmailClient;

/// One applied status change, reported for display and logging only.
#[derive(Debug, Clone, Serialize)]
pub struct StatusTransition {
    pub company: String,
    pub old_status: String,
    pub new_status: String,
    pub email_subject: String,
}

/// Fetch recent messages from Gmail, decode them, and reconcile into the
/// store. Individual messages that fail to fetch or decode are logged and
/// skipped; a provider failure on the listing call fails the whole run and
/// is absorbed at the scheduler or handler boundary.
pub async fn run_sync(ctx: &AppContext) -> Result<Vec<StatusTransition>> {
    let window = ctx.config.sync.message_window;
    let gmail = GmailClient::new(&ctx.config.gmail)?;

    let refs = gmail.list_messages(&ctx.config.gmail.query, window).await?;

    let mut parsed = Vec::new();
    for message_ref in &refs {
        let message = match gmail.get_message(&message_ref.id).await {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping message {}: fetch failed: {:#}", message_ref.id, e);
                continue;
            }
        };

        match parse_message(&message) {
            Ok(email) => parsed.push(email),
            Err(e) => {
                warn!("Skipping message {}: decode failed: {:#}", message_ref.id, e);
            }
        }
    }

    let updated = reconcile(ctx.db.pool()?, &parsed, window).await?;
    info!("Gmail sync completed: {} update(s)", updated.len());
    Ok(updated)
}

/// Match decoded messages against tracked applications and persist status
/// changes.
///
/// Processes at most `window` messages per run; excess messages are not
/// considered. A record is mutated at most once per run, only when the
/// classified status differs from the stored one, and every applied
/// mutation yields exactly one audit entry.
pub async fn reconcile(
    pool: &SqlitePool,
    messages: &[ParsedEmail],
    window: usize,
) -> Result<Vec<StatusTransition>> {
    let repo = ApplicationRepository::new(pool);
    let mut updated = Vec::new();
    let mut touched: HashSet<i64> = HashSet::new();

    for email in messages.iter().take(window) {
        let Some(app) = repo.find_match_for_subject(&email.subject).await? else {
            continue;
        };

        if touched.contains(&app.id) {
            continue;
        }

        let new_status = email.status.as_str();
        if app.status == new_status {
            continue;
        }

        if repo.update_status_by_id(app.id, new_status).await?.is_none() {
            // Record vanished between match and update; treat as unmatched.
            continue;
        }
        touched.insert(app.id);

        updated.push(StatusTransition {
            company: app.company_name,
            old_status: app.status,
            new_status: new_status.to_string(),
            email_subject: email.subject.clone(),
        });
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ApplicationStatus;
    use crate::database::{test_pool, NewApplication};

    fn email(subject: &str, status: ApplicationStatus) -> ParsedEmail {
        ParsedEmail {
            subject: subject.to_string(),
            preview: String::new(),
            status,
        }
    }

    async fn seed(pool: &SqlitePool, company: &str, status: &str) -> i64 {
        let repo = ApplicationRepository::new(pool);
        let app = repo
            .create(NewApplication {
                company_name: company.to_string(),
                status: Some(status.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        app.id
    }

    #[tokio::test]
    async fn test_reconcile_updates_matched_record() {
        let pool = test_pool().await;
        let id = seed(&pool, "Netflix", "Applied").await;

        let messages = vec![email("Netflix", ApplicationStatus::InterviewScheduled)];
        let updated = reconcile(&pool, &messages, 10).await.unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].company, "Netflix");
        assert_eq!(updated[0].old_status, "Applied");
        assert_eq!(updated[0].new_status, "Interview Scheduled");
        assert_eq!(updated[0].email_subject, "Netflix");

        let repo = ApplicationRepository::new(&pool);
        let app = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(app.status, "Interview Scheduled");
    }

    #[tokio::test]
    async fn test_reconcile_skips_unmatched_message() {
        let pool = test_pool().await;
        let id = seed(&pool, "Netflix", "Applied").await;

        let messages = vec![email("Random Corp", ApplicationStatus::Rejected)];
        let updated = reconcile(&pool, &messages, 10).await.unwrap();

        assert!(updated.is_empty());
        let repo = ApplicationRepository::new(&pool);
        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().status, "Applied");
    }

    #[tokio::test]
    async fn test_reconcile_unchanged_status_is_not_audited() {
        let pool = test_pool().await;
        seed(&pool, "Netflix", "Rejected").await;

        let messages = vec![email("Netflix", ApplicationStatus::Rejected)];
        let updated = reconcile(&pool, &messages, 10).await.unwrap();
        assert!(updated.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_respects_window() {
        let pool = test_pool().await;
        let id = seed(&pool, "Netflix", "Applied").await;

        // The only matching message sits just past the window.
        let mut messages: Vec<ParsedEmail> = (0..10)
            .map(|i| email(&format!("Unrelated {}", i), ApplicationStatus::Offer))
            .collect();
        messages.push(email("Netflix", ApplicationStatus::Offer));

        let updated = reconcile(&pool, &messages, 10).await.unwrap();
        assert!(updated.is_empty());

        let repo = ApplicationRepository::new(&pool);
        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().status, "Applied");
    }

    #[tokio::test]
    async fn test_reconcile_mutates_each_record_at_most_once() {
        let pool = test_pool().await;
        let id = seed(&pool, "Netflix", "Applied").await;

        let messages = vec![
            email("Netflix", ApplicationStatus::InterviewScheduled),
            email("Netflix", ApplicationStatus::Rejected),
        ];
        let updated = reconcile(&pool, &messages, 10).await.unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].new_status, "Interview Scheduled");

        let repo = ApplicationRepository::new(&pool);
        assert_eq!(
            repo.find_by_id(id).await.unwrap().unwrap().status,
            "Interview Scheduled"
        );
    }
}
