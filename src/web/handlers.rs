// src/web/handlers.rs
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tracing::{error, info};

use crate::context::AppContext;
use crate::database::ApplicationRepository;
use crate::sync::run_sync;
use crate::web::types::{
    ApplicationCreate, ApplicationOut, ErrorResponse, StatusUpdate, SyncResponse,
};

type HandlerError = Custom<Json<ErrorResponse>>;

fn database_error(e: anyhow::Error) -> HandlerError {
    error!("Database operation failed: {:#}", e);
    Custom(
        Status::InternalServerError,
        Json(ErrorResponse::new(
            "Database operation failed".to_string(),
            "DATABASE_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
        )),
    )
}

fn not_found(detail: String) -> HandlerError {
    Custom(
        Status::NotFound,
        Json(ErrorResponse::new(
            detail,
            "NOT_FOUND".to_string(),
            vec!["Check the application id".to_string()],
        )),
    )
}

pub async fn create_application_handler(
    request: Json<ApplicationCreate>,
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<ApplicationOut>, HandlerError> {
    let pool = ctx.db.pool().map_err(database_error)?;

    info!("Creating application for company: {}", request.company_name);

    let app = ApplicationRepository::new(pool)
        .create(request.into_inner().into())
        .await
        .map_err(database_error)?;

    Ok(Json(app.into()))
}

pub async fn list_applications_handler(
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<Vec<ApplicationOut>>, HandlerError> {
    let pool = ctx.db.pool().map_err(database_error)?;

    let apps = ApplicationRepository::new(pool)
        .list()
        .await
        .map_err(database_error)?;

    Ok(Json(apps.into_iter().map(Into::into).collect()))
}

pub async fn update_status_handler(
    id: i64,
    update: Json<StatusUpdate>,
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<ApplicationOut>, HandlerError> {
    let pool = ctx.db.pool().map_err(database_error)?;

    let updated = ApplicationRepository::new(pool)
        .update_status_by_id(id, &update.status)
        .await
        .map_err(database_error)?;

    match updated {
        Some(app) => Ok(Json(app.into())),
        None => Err(not_found("Application not found".to_string())),
    }
}

pub async fn status_by_company_handler(
    company: String,
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<Vec<ApplicationOut>>, HandlerError> {
    let pool = ctx.db.pool().map_err(database_error)?;

    let apps = ApplicationRepository::new(pool)
        .search_by_company(&company)
        .await
        .map_err(database_error)?;

    Ok(Json(apps.into_iter().map(Into::into).collect()))
}

pub async fn sync_emails_handler(
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<SyncResponse>, HandlerError> {
    info!("Manual email sync triggered via API");

    match run_sync(ctx.inner()).await {
        Ok(updated) => Ok(Json(SyncResponse { updated })),
        Err(e) => {
            error!("Manual sync failed: {:#}", e);
            Err(Custom(
                Status::BadGateway,
                Json(ErrorResponse::new(
                    "Email sync failed".to_string(),
                    "SYNC_FAILED".to_string(),
                    vec![
                        "Check the Gmail access token".to_string(),
                        "Try again in a few moments".to_string(),
                    ],
                )),
            ))
        }
    }
}
