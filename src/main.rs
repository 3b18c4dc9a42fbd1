use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use chrono::Local;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use attendance_desk::config::Config;
use attendance_desk::db::init_db;
use attendance_desk::docs::ApiDoc;
use attendance_desk::remote::{PostgrestConnector, RemotePersistenceClient};
use attendance_desk::resolver::NetworkInfoResolver;
use attendance_desk::routes;
use attendance_desk::service::{StatisticsService, SubmissionService};
use attendance_desk::store::{LocalRecordStore, SqliteStorage};
use attendance_desk::utils::time::DATE_FORMAT;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance desk is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.local_database_url).await?;
    let store = Arc::new(
        LocalRecordStore::open(Arc::new(SqliteStorage::new(pool)))
            .await
            .context("Failed to open local record store")?,
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build lookup HTTP client")?;
    let resolver = Arc::new(NetworkInfoResolver::from_config(&config, http));
    let remote = Arc::new(RemotePersistenceClient::new(Arc::new(
        PostgrestConnector::from_config(&config),
    )));

    // Explicit readiness check; a failure only means submissions start in local mode
    match remote.ensure_ready().await {
        Ok(_) => info!("Remote store ready"),
        Err(e) => warn!(error = %e, "Remote store unavailable at startup, will retry on demand"),
    }

    let submissions = Arc::new(SubmissionService::new(
        store.clone(),
        remote.clone(),
        resolver,
    ));
    let stats = Arc::new(StatisticsService::new(store.clone(), remote.clone()));

    let refresh_stats = stats.clone();
    let refresh_every = Duration::from_secs(config.stats_refresh_secs.max(1));
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(refresh_every);
        loop {
            ticker.tick().await;
            let today = Local::now().date_naive().format(DATE_FORMAT).to_string();
            let summary = refresh_stats.daily_summary(&today).await;
            info!(
                date = %today,
                source = %summary.source,
                checkins = summary.checkin_count,
                checkouts = summary.checkout_count,
                "Today's attendance"
            );
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // tail segment serves the UI's static assets
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config_data.clone()))
            .app_data(Data::from(store.clone()))
            .app_data(Data::from(remote.clone()))
            .app_data(Data::from(submissions.clone()))
            .app_data(Data::from(stats.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config_data))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
