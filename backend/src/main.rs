//! Backend entry-point: loads settings, wires adapters and serves the API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;
mod settings;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use tcg_backend::domain::IdentificationCharging;
use tcg_backend::inbound::http::health::HealthState;
use tcg_backend::inbound::http::session_config::{BuildMode, session_settings_from_toggles};
use tcg_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

#[cfg(feature = "metrics")]
use server::build_prometheus;
use server::{AdapterSettings, ServerConfig, create_server};
use settings::AppSettings;

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

    let settings = load_settings(std::env::args_os())?;
    let config = server_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)
        .wrap_err("failed to start HTTP server")?
        .await
        .wrap_err("HTTP server stopped with an error")
}

fn load_settings<I>(args: I) -> Result<AppSettings>
where
    I: IntoIterator<Item = std::ffi::OsString>,
{
    AppSettings::load_from_iter(args).map_err(|e| eyre!("failed to load settings: {e}"))
}

async fn server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let session = session_settings_from_toggles(
        &settings.session_toggles(),
        BuildMode::from_debug_assertions(),
    )
    .wrap_err("invalid session configuration")?;
    let bind_addr = settings.bind_addr()?;

    let adapters = AdapterSettings::new(
        settings.grading_api()?,
        settings.storage()?,
        settings.auth()?,
        settings.http_timeout(),
    );

    let config = ServerConfig::new(session.key, session.cookie_secure, session.same_site, bind_addr)
        .with_adapters(adapters)
        .with_upload_limit(settings.max_upload_bytes())
        .with_identification_charging(IdentificationCharging::from(
            settings.identify_charges_credit,
        ));

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(build_prometheus());

    let Some(database_url) = settings.database_url() else {
        warn!("TCG_DATABASE_URL not set; serving fixture data");
        return Ok(config);
    };

    if settings.run_migrations {
        let applied = run_pending_migrations(database_url)
            .await
            .wrap_err("failed to run database migrations")?;
        info!(applied, "database migrations applied");
    }

    let pool_config = PoolConfig::new(database_url);
    let pool_config = match settings.db_max_connections {
        Some(max_size) => pool_config.with_max_size(max_size),
        None => pool_config,
    };
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to create database pool")?;
    Ok(config.with_db_pool(pool))
}
