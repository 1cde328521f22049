//! Backend entry-point: loads configuration, prepares storage and serves the
//! REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use blog_backend::demo_data::seed_demo_on_startup;
use blog_backend::inbound::http::health::HealthState;
use blog_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use blog_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{AppSettings, ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load application settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;

    let mut config = ServerConfig::new(
        settings.bind_addr(),
        session,
        settings.session_ttl()?,
        settings.password_cost()?,
    );

    if let Some(url) = settings.database_url() {
        run_pending_migrations(url)
            .await
            .wrap_err("failed to apply database migrations")?;
        let pool_config = PoolConfig::new(url).with_max_size(settings.db_max_connections()?);
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to create database pool")?;
        info!("database pool ready");
        config = config.with_db_pool(pool);
    }

    let http_state = build_http_state(&config);
    seed_demo_on_startup(settings.seed_demo, &http_state)
        .await
        .wrap_err("failed to seed demo content")?;

    let bind_addr = config.bind_addr;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, http_state, bind_addr)
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated with an error")
}
