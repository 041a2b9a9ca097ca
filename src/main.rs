//! Maintenance Engine demo
//!
//! Seeds the demo fleet, backfills telemetry and keeps ticking the simulated
//! sensors, logging risk changes as they happen.

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maintenance_engine::{
    config::{AppConfig, LoggingConfig},
    models::report::DashboardSummary,
    services::{access, telemetry::SimulatedTelemetry},
    Session,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::info!("Starting Maintenance Engine v{}", env!("CARGO_PKG_VERSION"));

    let source = Box::new(SimulatedTelemetry::new(config.telemetry.seed));
    let session = Session::demo(config, source)
        .await
        .context("Failed to open demo session")?;
    tracing::info!(
        "Visible sections: {:?}",
        access::visible_sections(session.user.role)
    );

    let telemetry = &session.services.telemetry;
    telemetry
        .backfill(session.config.telemetry.backfill_days, Utc::now())
        .await?;
    log_dashboard(&session.services.stats.dashboard(Utc::now()).await?);

    let period = Duration::from_secs(session.config.telemetry.tick_seconds);
    tokio::select! {
        result = telemetry.run(period, session.config.telemetry.max_ticks) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    log_dashboard(&session.services.stats.dashboard(Utc::now()).await?);
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("maintenance_engine={}", logging.level).into());

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn log_dashboard(summary: &DashboardSummary) {
    tracing::info!(
        "Dashboard: {} units, {} open error alert(s), {} open warning(s), {} upcoming task(s)",
        summary.total_equipment,
        summary.critical_alerts,
        summary.warning_alerts,
        summary.upcoming_tasks
    );
    for overview in &summary.at_risk {
        tracing::info!(
            "At risk: {} [{}] risk {}, next service {}",
            overview.equipment.name,
            overview.equipment.status,
            overview.health.predicted_risk,
            overview
                .health
                .next_service_date
                .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
        );
    }
}
