use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use applitrack::{scheduler, summary, sync, telegram, AppConfig, AppContext};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Parser)]
#[command(name = "applitrack", about = "Personal job application tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the API server, Telegram bot and background jobs (default)
    Serve,
    /// Run one email reconciliation pass and print the applied updates
    Sync,
    /// Send the daily summary once and exit
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    Registry::default()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("applitrack=info")))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load()?;

    info!("Starting job application tracker");
    info!(
        "Environment: {}",
        std::env::var("APPLITRACK_ENV").unwrap_or_else(|_| "local".to_string())
    );
    info!("Database: {}", config.environment.database_path.display());
    info!("Gmail query: {}", config.gmail.query);

    let ctx = Arc::new(AppContext::initialize(config).await?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            scheduler::spawn_jobs(Arc::clone(&ctx))?;

            let bot_ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                if let Err(e) = telegram::run_bot(bot_ctx).await {
                    tracing::error!("Telegram bot stopped: {:#}", e);
                }
            });

            applitrack::start_web_server(Arc::clone(&ctx)).await?;
        }
        Command::Sync => {
            let updated = sync::run_sync(&ctx).await?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        Command::Summary => {
            summary::send_daily_summary(&ctx).await?;
        }
    }

    ctx.shutdown().await;
    Ok(())
}
