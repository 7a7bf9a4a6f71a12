//! Callmask Server
//!
//! Issues per-booking virtual numbers, gates calls on payment and expiry, and
//! flags suspicious call activity.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use callmask_api::{build_cors, configure, json_config};
use callmask_core::AppConfig;
use callmask_db::{
    create_pool, run_migrations, PgBookingRepository, PgCallLogRepository,
    PgSecurityAlertRepository, PgVirtualNumberRepository,
};
use callmask_services::masking::Repositories;
use callmask_services::{CallMaskingService, ExpirySweeper};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "callmask={lvl},callmask_api={lvl},callmask_services={lvl},callmask_db={lvl},actix_web=info,sqlx=warn",
            lvl = log_level
        ))
    });

    let json = env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Callmask v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if config.masking.secret.is_empty() {
        warn!("masking.secret is empty; virtual numbers are derivable by anyone who knows a booking id");
    }

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to apply migrations")?;
    }

    let numbers = Arc::new(PgVirtualNumberRepository::new(pool.clone()));
    let repos = Repositories {
        bookings: Arc::new(PgBookingRepository::new(pool.clone())),
        numbers: numbers.clone(),
        calls: Arc::new(PgCallLogRepository::new(pool.clone())),
        alerts: Arc::new(PgSecurityAlertRepository::new(pool.clone())),
    };

    let service = CallMaskingService::from_config(repos, &config.masking, &config.analysis)
        .context("Failed to build masking service")?;
    let service = web::Data::new(service);

    // Background sweep of lapsed numbers
    if config.masking.sweep_interval_secs > 0 {
        let sweeper = ExpirySweeper::new(
            numbers,
            Duration::from_secs(config.masking.sweep_interval_secs),
        );
        tokio::spawn(sweeper.run());
    } else {
        info!("Expiry sweeper disabled");
    }

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    let cors_origins = config.server.cors_origins.clone();

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(json_config())
            .wrap(build_cors(&cors_origins))
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(TracingLogger::default())
            .configure(configure)
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
