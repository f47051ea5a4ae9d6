// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, put, routes, Request, Response, State};
use std::sync::Arc;
use tracing::info;

use crate::context::AppContext;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[post("/applications", data = "<request>")]
pub async fn create_application(
    request: Json<ApplicationCreate>,
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<ApplicationOut>, rocket::response::status::Custom<Json<ErrorResponse>>> {
    handlers::create_application_handler(request, ctx).await
}

#[get("/applications")]
pub async fn list_applications(
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<Vec<ApplicationOut>>, rocket::response::status::Custom<Json<ErrorResponse>>> {
    handlers::list_applications_handler(ctx).await
}

#[put("/applications/<id>", data = "<update>")]
pub async fn update_application(
    id: i64,
    update: Json<StatusUpdate>,
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<ApplicationOut>, rocket::response::status::Custom<Json<ErrorResponse>>> {
    handlers::update_status_handler(id, update, ctx).await
}

#[get("/applications/status/<company>")]
pub async fn status_by_company(
    company: String,
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<Vec<ApplicationOut>>, rocket::response::status::Custom<Json<ErrorResponse>>> {
    handlers::status_by_company_handler(company, ctx).await
}

#[post("/sync-emails")]
pub async fn sync_emails(
    ctx: &State<Arc<AppContext>>,
) -> Result<Json<SyncResponse>, rocket::response::status::Custom<Json<ErrorResponse>>> {
    handlers::sync_emails_handler(ctx).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn route_not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Request body failed validation".to_string(),
        "VALIDATION_ERROR".to_string(),
        vec![
            "company_name is required".to_string(),
            "date_applied must be YYYY-MM-DD".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
    ))
}

// Main server start function
pub async fn start_web_server(ctx: Arc<AppContext>) -> Result<()> {
    let port = ctx.config.environment.port;

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    info!("Starting job application tracker API on port {}", port);

    let _rocket = rocket::custom(figment)
        .attach(Cors)
        .manage(ctx)
        .register(
            "/",
            catchers![bad_request, route_not_found, unprocessable, internal_error],
        )
        .mount(
            "/",
            routes![
                create_application,
                list_applications,
                update_application,
                status_by_company,
                sync_emails,
                options,
            ],
        )
        .launch()
        .await?;

    Ok(())
}
