// src/database.rs
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_STATUS: &str = "Applied";
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub company_name: String,
    pub role: String,
    pub platform: String,
    pub date_applied: NaiveDate,
    pub status: String,
    pub job_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Explicit create payload. Optional fields get the documented defaults
/// instead of passing a dynamic map around.
#[derive(Debug, Clone, Default)]
pub struct NewApplication {
    pub company_name: String,
    pub role: Option<String>,
    pub platform: Option<String>,
    pub date_applied: Option<NaiveDate>,
    pub status: Option<String>,
    pub job_link: Option<String>,
}

#[derive(Debug)]
pub struct DatabaseConfig {
    pub database_path: PathBuf,
    pub pool: Option<SqlitePool>,
}

impl DatabaseConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            pool: None,
        }
    }

    /// Initialize the database connection pool
    pub async fn init_pool(&mut self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", self.database_path.display());

        let pool = SqlitePool::connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;
        self.pool = Some(pool);

        info!("Database connection pool initialized: {}", database_url);
        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Database pool not initialized. Call init_pool() first."))
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        let pool = self.pool()?;
        migrate(pool).await
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'Not specified',
            platform TEXT NOT NULL DEFAULT 'Not specified',
            date_applied TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Applied',
            job_link TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_applications_company_name
        ON applications(company_name);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed successfully");
    Ok(())
}

const SELECT_COLUMNS: &str = "SELECT id, company_name, role, platform, date_applied, status, \
                              job_link, created_at, updated_at FROM applications";

pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new application record with generated id and timestamps.
    pub async fn create(&self, new: NewApplication) -> Result<Application> {
        let now = Utc::now();
        let role = new.role.unwrap_or_else(|| NOT_SPECIFIED.to_string());
        let platform = new.platform.unwrap_or_else(|| NOT_SPECIFIED.to_string());
        let date_applied = new.date_applied.unwrap_or_else(|| now.date_naive());
        let status = new.status.unwrap_or_else(|| DEFAULT_STATUS.to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO applications
                (company_name, role, platform, date_applied, status, job_link, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.company_name)
        .bind(&role)
        .bind(&platform)
        .bind(date_applied)
        .bind(&status)
        .bind(&new.job_link)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!("Created application {} for company: {}", id, new.company_name);

        Ok(Application {
            id,
            company_name: new.company_name,
            role,
            platform,
            date_applied,
            status,
            job_link: new.job_link,
            created_at: now,
            updated_at: now,
        })
    }

    /// List all tracked applications.
    pub async fn list(&self) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
            .fetch_all(self.pool)
            .await?;
        Ok(apps)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(app)
    }

    /// Human-facing company search: all records whose name contains the
    /// query fragment, case-insensitive.
    pub async fn search_by_company(&self, fragment: &str) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(&format!(
            "{} WHERE LOWER(company_name) LIKE '%' || LOWER(?) || '%' ORDER BY id ASC",
            SELECT_COLUMNS
        ))
        .bind(fragment)
        .fetch_all(self.pool)
        .await?;
        Ok(apps)
    }

    /// First record whose name contains the query fragment.
    pub async fn find_first_by_company(&self, fragment: &str) -> Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>(&format!(
            "{} WHERE LOWER(company_name) LIKE '%' || LOWER(?) || '%' ORDER BY id ASC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(fragment)
        .fetch_optional(self.pool)
        .await?;
        Ok(app)
    }

    /// Mail-sync matching: first record whose company name matches the
    /// decoded email subject, i.e. the subject is contained in the stored
    /// name (case-insensitive). This is the reverse direction of
    /// `search_by_company` and is kept separate on purpose; the two behave
    /// differently whenever subject and name differ in length.
    pub async fn find_match_for_subject(&self, subject: &str) -> Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>(&format!(
            "{} WHERE LOWER(company_name) LIKE '%' || LOWER(?) || '%' ORDER BY id ASC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(subject)
        .fetch_optional(self.pool)
        .await?;
        Ok(app)
    }

    /// Update status by id. Returns the updated record, or None when the id
    /// does not exist (surfaced as NotFound by the command surfaces).
    pub async fn update_status_by_id(&self, id: i64, status: &str) -> Result<Option<Application>> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Updated application {} status to: {}", id, status);
        self.find_by_id(id).await
    }

    /// Update status of the first record matching a company fragment.
    pub async fn update_status_by_company(
        &self,
        fragment: &str,
        status: &str,
    ) -> Result<Option<Application>> {
        let Some(app) = self.find_first_by_company(fragment).await? else {
            return Ok(None);
        };
        self.update_status_by_id(app.id, status).await
    }

    /// Delete the first record matching a company fragment. Returns the
    /// deleted record, or None when nothing matched.
    pub async fn delete_by_company(&self, fragment: &str) -> Result<Option<Application>> {
        let Some(app) = self.find_first_by_company(fragment).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM applications WHERE id = ?")
            .bind(app.id)
            .execute(self.pool)
            .await?;

        info!("Deleted application {} for company: {}", app.id, app.company_name);
        Ok(Some(app))
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // Single connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_app(company: &str) -> NewApplication {
        NewApplication {
            company_name: company.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let pool = test_pool().await;
        let repo = ApplicationRepository::new(&pool);

        let app = repo.create(new_app("Google")).await.unwrap();
        assert_eq!(app.company_name, "Google");
        assert_eq!(app.role, NOT_SPECIFIED);
        assert_eq!(app.platform, NOT_SPECIFIED);
        assert_eq!(app.status, DEFAULT_STATUS);
        assert_eq!(app.job_link, None);
        assert_eq!(app.date_applied, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_search_by_company_substring_case_insensitive() {
        let pool = test_pool().await;
        let repo = ApplicationRepository::new(&pool);
        repo.create(new_app("Google")).await.unwrap();

        let hits = repo.search_by_company("go").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].company_name, "Google");

        let misses = repo.search_by_company("zzz").await.unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn test_find_match_for_subject_reverse_direction() {
        let pool = test_pool().await;
        let repo = ApplicationRepository::new(&pool);
        repo.create(new_app("Netflix")).await.unwrap();

        // Exact subject matches.
        let hit = repo.find_match_for_subject("Netflix").await.unwrap();
        assert!(hit.is_some());

        // A subject longer than the stored name does not match in this
        // direction, unlike the human-facing search.
        let miss = repo
            .find_match_for_subject("Your Netflix application")
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_update_status_not_found() {
        let pool = test_pool().await;
        let repo = ApplicationRepository::new(&pool);

        assert!(repo.update_status_by_id(42, "Offer").await.unwrap().is_none());
        assert!(repo
            .update_status_by_company("nowhere", "Offer")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_status_bumps_updated_at() {
        let pool = test_pool().await;
        let repo = ApplicationRepository::new(&pool);
        let app = repo.create(new_app("Meta")).await.unwrap();

        let updated = repo
            .update_status_by_id(app.id, "In Review")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "In Review");
        assert!(updated.updated_at >= app.updated_at);
    }

    #[tokio::test]
    async fn test_add_delete_list_roundtrip() {
        let pool = test_pool().await;
        let repo = ApplicationRepository::new(&pool);

        repo.create(new_app("Google")).await.unwrap();
        let deleted = repo.delete_by_company("Google").await.unwrap();
        assert!(deleted.is_some());
        assert!(repo.list().await.unwrap().is_empty());

        // Deleting again reports NotFound rather than silently succeeding.
        assert!(repo.delete_by_company("Google").await.unwrap().is_none());
    }
}
