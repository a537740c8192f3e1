//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use tcg_backend::domain::{DEFAULT_MAX_UPLOAD_BYTES, IdentificationCharging};
use tcg_backend::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use crate::settings::{AuthSettings, GradingApiSettings, StorageSettings};

/// Connection settings for the outbound HTTP adapters.
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub(crate) grading_api: Option<GradingApiSettings>,
    pub(crate) storage: Option<StorageSettings>,
    pub(crate) auth: Option<AuthSettings>,
    pub(crate) timeout: Duration,
}

impl AdapterSettings {
    /// Bundle adapter settings; absent groups fall back to fixtures.
    #[must_use]
    pub fn new(
        grading_api: Option<GradingApiSettings>,
        storage: Option<StorageSettings>,
        auth: Option<AuthSettings>,
        timeout: Duration,
    ) -> Self {
        Self {
            grading_api,
            storage,
            auth,
            timeout,
        }
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self::new(None, None, None, Duration::from_secs(30))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) adapters: AdapterSettings,
    pub(crate) max_upload_bytes: usize,
    pub(crate) identification_charging: IdentificationCharging,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration with fixture-backed ports.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            adapters: AdapterSettings::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            identification_charging: IdentificationCharging::Free,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach outbound adapter settings.
    #[must_use]
    pub fn with_adapters(mut self, adapters: AdapterSettings) -> Self {
        self.adapters = adapters;
        self
    }

    /// Override the image upload limit.
    #[must_use]
    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Choose whether identification costs a credit.
    #[must_use]
    pub fn with_identification_charging(mut self, charging: IdentificationCharging) -> Self {
        self.identification_charging = charging;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
