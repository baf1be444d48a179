use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use crate::docs::ApiDoc;
use crate::service::AttendanceService;
use crate::store::MySqlStore;
use crate::utils::clock::SystemClock;
use crate::utils::upload::UploadStore;
use anyhow::Context;
use config::Config;
use db::init_db;
use tracing::info;
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    let calendar = config.calendar();
    info!(
        timezone = %calendar.timezone(),
        cutoff_minutes = calendar.cutoff_minutes(),
        "Server starting..."
    );

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if let Some((username, password)) = &config.bootstrap_admin {
        db::ensure_admin(&pool, username, password).await?;
    }

    let store = Arc::new(MySqlStore::new(pool.clone()));
    let service = Data::new(AttendanceService::new(
        store.clone(),
        store,
        Arc::new(SystemClock),
        calendar,
    ));

    let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes)
        .await
        .with_context(|| format!("Failed to prepare {}", config.upload_dir.display()))?;
    let uploads = Data::new(uploads);

    let server_addr = config.server_addr.clone();
    let api_doc = ApiDoc::for_prefix(&config.api_prefix);
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", api_doc.clone()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(config_data.clone())
            .app_data(service.clone())
            .app_data(uploads.clone())
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
