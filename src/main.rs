use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

use metalflow_attendance::config::Config;
use metalflow_attendance::db::init_db;
use metalflow_attendance::docs::ApiDoc;
use metalflow_attendance::engine::SystemClock;
use metalflow_attendance::routes::{self, Limiters};
use metalflow_attendance::utils::roster_cache;

use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "MetalFlow attendance"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        addr = %config.server_addr,
        utc_offset = %config.utc_offset,
        shift = ?config.attendance.shift,
        "Server starting..."
    );

    let pool = init_db(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    roster_cache::configure(config.roster_cache_ttl);
    let pool_for_cache_warmup = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = roster_cache::warmup_roster_cache(&pool_for_cache_warmup).await {
            warn!(error = %e, "Failed to warm up roster cache");
        }
    });

    let limiters = Limiters::from_config(&config)?;
    let clock = Data::new(SystemClock::new(config.utc_offset));
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the UI's JS/CSS files match
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(clock.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
