// src/web/types.rs
use chrono::NaiveDate;
use rocket::serde::{Deserialize, Serialize};

use crate::database::{Application, NewApplication};
use crate::sync::StatusTransition;

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationCreate {
    pub company_name: String,
    pub role: Option<String>,
    pub platform: Option<String>,
    pub date_applied: Option<NaiveDate>,
    pub status: Option<String>,
    pub job_link: Option<String>,
}

impl From<ApplicationCreate> for NewApplication {
    fn from(req: ApplicationCreate) -> Self {
        NewApplication {
            company_name: req.company_name,
            role: req.role,
            platform: req.platform,
            date_applied: req.date_applied,
            status: req.status,
            job_link: req.job_link,
        }
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StatusUpdate {
    pub status: String,
}

/// The Application representation every endpoint returns.
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationOut {
    pub id: i64,
    pub company_name: String,
    pub role: String,
    pub platform: String,
    pub date_applied: NaiveDate,
    pub status: String,
    pub job_link: Option<String>,
}

impl From<Application> for ApplicationOut {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            company_name: app.company_name,
            role: app.role,
            platform: app.platform,
            date_applied: app.date_applied,
            status: app.status,
            job_link: app.job_link,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SyncResponse {
    pub updated: Vec<StatusTransition>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}
