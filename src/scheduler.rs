// src/scheduler.rs
//! Background jobs: periodic Gmail sync and the daily summary.
//!
//! Each job runs in its own loop and is awaited inline, so a job never
//! overlaps its own previous run. Failures are logged and the loop keeps
//! going; neither job can cancel or delay the other.

use anyhow::{Context, Result};
use chrono::Utc;
use cron::Schedule;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::context::AppContext;
use crate::summary::send_daily_summary;
use crate::sync::run_sync;

/// Spawn both background jobs.
pub fn spawn_jobs(ctx: Arc<AppContext>) -> Result<()> {
    let schedule = summary_schedule(ctx.config.sync.summary_hour)?;

    let sync_ctx = Arc::clone(&ctx);
    tokio::spawn(async move {
        run_sync_loop(sync_ctx).await;
    });

    tokio::spawn(async move {
        run_summary_loop(ctx, schedule).await;
    });

    Ok(())
}

/// Cron schedule firing once a day at the configured hour (UTC).
pub fn summary_schedule(hour: u32) -> Result<Schedule> {
    // The cron crate expects a seconds field.
    let expr = format!("0 0 {} * * *", hour);
    expr.parse::<Schedule>()
        .with_context(|| format!("Invalid summary schedule: {}", expr))
}

async fn run_sync_loop(ctx: Arc<AppContext>) {
    let period = Duration::from_secs(ctx.config.sync.interval_hours * 3600);
    info!(
        "Email sync scheduled every {} hour(s)",
        ctx.config.sync.interval_hours
    );

    // First firing happens one full interval after startup.
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match run_sync(&ctx).await {
            Ok(updated) => {
                info!("Scheduled sync applied {} update(s)", updated.len());
            }
            Err(e) => {
                error!("Scheduled sync failed: {:#}", e);
            }
        }
    }
}

async fn run_summary_loop(ctx: Arc<AppContext>, schedule: Schedule) {
    info!(
        "Daily summary scheduled at {:02}:00 UTC",
        ctx.config.sync.summary_hour
    );

    loop {
        let Some(next) = schedule.upcoming(Utc).next() else {
            error!("Summary schedule has no upcoming firing, stopping summary job");
            return;
        };

        let wait = (next - Utc::now())
            .to_std()
            .unwrap_or(Duration::from_secs(0));
        tokio::time::sleep(wait).await;

        if let Err(e) = send_daily_summary(&ctx).await {
            error!("Daily summary failed: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_summary_schedule_parses() {
        assert!(summary_schedule(9).is_ok());
        assert!(summary_schedule(0).is_ok());
        assert!(summary_schedule(23).is_ok());
    }

    #[test]
    fn test_summary_schedule_fires_at_configured_hour() {
        let schedule = summary_schedule(9).unwrap();
        let next = schedule.upcoming(Utc).next().unwrap();
        assert_eq!(next.hour(), 9);
        assert_eq!(next.minute(), 0);
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn test_summary_schedule_fires_once_per_day() {
        let schedule = summary_schedule(9).unwrap();
        let mut upcoming = schedule.upcoming(Utc);
        let first = upcoming.next().unwrap();
        let second = upcoming.next().unwrap();
        assert_eq!((second - first).num_hours(), 24);
    }
}
