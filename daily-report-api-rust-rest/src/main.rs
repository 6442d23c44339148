use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use daily_report_api_rust::{
    app,
    config::Config,
    constants::API_NAME,
    repository::{DailyReportRepository, ParkingHistoryRepository},
    service::DailyAggregationService,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "{} Starting daily report server for tenant {} on port {}",
        API_NAME,
        config.tenant_id,
        config.server_port
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("{} Connected to database", API_NAME);

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("{} Database migrations completed", API_NAME);
    }

    let history_repo = ParkingHistoryRepository::new(pool.clone(), config.history_table.clone());
    let report_repo = DailyReportRepository::new(pool, config.report_table.clone());
    let service = DailyAggregationService::new(
        Arc::new(history_repo),
        Arc::new(report_repo),
        config.tenant_id.clone(),
        config.max_concurrency,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("{} Server listening on {}", API_NAME, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(service)).await?;

    Ok(())
}
