pub mod classifier;
pub mod config;
pub mod context;
pub mod database;
pub mod mail;
pub mod scheduler;
pub mod summary;
pub mod sync;
pub mod telegram;
pub mod web;

pub use config::AppConfig;
pub use context::AppContext;
pub use web::start_web_server;
