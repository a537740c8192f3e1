//! Application settings loaded via OrthoConfig.
//!
//! Every value can come from a `TCG_*` environment variable, a config file or
//! a command-line flag. Adapter settings are optional; when a group is
//! incomplete the server falls back to fixture ports for the features that
//! need it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use tcg_backend::domain::DEFAULT_MAX_UPLOAD_BYTES;
use tcg_backend::inbound::http::session_config::SessionToggles;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A value could not be parsed.
    #[error("invalid value for {name}='{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TCG")]
pub struct AppSettings {
    /// Socket address to bind; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without it every port uses fixtures.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// Session key file path.
    pub session_key_file: Option<PathBuf>,
    /// Raw `Secure` cookie flag.
    pub session_cookie_secure: Option<String>,
    /// Raw `SameSite` policy.
    pub session_same_site: Option<String>,
    /// Raw flag permitting generated session keys.
    pub session_allow_ephemeral: Option<String>,
    /// Grading and identification API base URL.
    pub grading_api_url: Option<String>,
    /// Grading API token.
    pub grading_api_token: Option<String>,
    /// Object storage API root.
    pub storage_url: Option<String>,
    /// Storage bucket for card photos and overlays.
    pub storage_bucket: Option<String>,
    /// Storage service key.
    pub storage_service_key: Option<String>,
    /// Managed auth service root.
    pub auth_url: Option<String>,
    /// Managed auth API key.
    pub auth_api_key: Option<String>,
    /// Outbound request timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Maximum image upload size in bytes.
    pub max_upload_bytes: Option<usize>,
    /// Charge one credit per identification.
    #[ortho_config(default = false)]
    pub identify_charges_credit: bool,
}

/// Grading API connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingApiSettings {
    pub url: Url,
    pub token: String,
}

/// Object storage connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub url: Url,
    pub bucket: String,
    pub service_key: String,
}

/// Managed auth connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub url: Url,
    pub api_key: String,
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::Invalid {
        name,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl AppSettings {
    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_empty(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
            name: "TCG_BIND_ADDR",
            value: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Non-empty database URL, if configured.
    pub fn database_url(&self) -> Option<&str> {
        non_empty(self.database_url.as_ref())
    }

    /// Outbound request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    /// Upload limit for card photos and identification images.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Raw session toggles for validation.
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self.session_key_file.clone(),
            cookie_secure: self.session_cookie_secure.clone(),
            same_site: self.session_same_site.clone(),
            allow_ephemeral: self.session_allow_ephemeral.clone(),
        }
    }

    /// Grading API settings when both URL and token are present.
    pub fn grading_api(&self) -> Result<Option<GradingApiSettings>, SettingsError> {
        let (Some(url), Some(token)) = (
            non_empty(self.grading_api_url.as_ref()),
            non_empty(self.grading_api_token.as_ref()),
        ) else {
            return Ok(None);
        };
        Ok(Some(GradingApiSettings {
            url: parse_url("TCG_GRADING_API_URL", url)?,
            token: token.to_owned(),
        }))
    }

    /// Storage settings when URL, bucket and key are all present.
    pub fn storage(&self) -> Result<Option<StorageSettings>, SettingsError> {
        let (Some(url), Some(bucket), Some(service_key)) = (
            non_empty(self.storage_url.as_ref()),
            non_empty(self.storage_bucket.as_ref()),
            non_empty(self.storage_service_key.as_ref()),
        ) else {
            return Ok(None);
        };
        Ok(Some(StorageSettings {
            url: parse_url("TCG_STORAGE_URL", url)?,
            bucket: bucket.to_owned(),
            service_key: service_key.to_owned(),
        }))
    }

    /// Auth settings when URL and API key are present.
    pub fn auth(&self) -> Result<Option<AuthSettings>, SettingsError> {
        let (Some(url), Some(api_key)) = (
            non_empty(self.auth_url.as_ref()),
            non_empty(self.auth_api_key.as_ref()),
        ) else {
            return Ok(None);
        };
        Ok(Some(AuthSettings {
            url: parse_url("TCG_AUTH_URL", url)?,
            api_key: api_key.to_owned(),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "TCG_BIND_ADDR",
        "TCG_DATABASE_URL",
        "TCG_RUN_MIGRATIONS",
        "TCG_GRADING_API_URL",
        "TCG_GRADING_API_TOKEN",
        "TCG_MAX_UPLOAD_BYTES",
        "TCG_IDENTIFY_CHARGES_CREDIT",
        "TCG_HTTP_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("tcg-backend")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None::<String>)).collect()
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url().is_none());
        assert!(!settings.run_migrations);
        assert!(!settings.identify_charges_credit);
        assert_eq!(settings.max_upload_bytes(), DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(settings.http_timeout(), Duration::from_secs(30));
        assert_eq!(settings.grading_api().expect("no grading api"), None);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        for (name, value) in &mut vars {
            *value = match *name {
                "TCG_BIND_ADDR" => Some("127.0.0.1:9090".to_owned()),
                "TCG_DATABASE_URL" => Some("postgres://grader@localhost/cards".to_owned()),
                "TCG_RUN_MIGRATIONS" => Some("true".to_owned()),
                "TCG_GRADING_API_URL" => Some("https://grading.example.com/".to_owned()),
                "TCG_GRADING_API_TOKEN" => Some("secret".to_owned()),
                "TCG_MAX_UPLOAD_BYTES" => Some("2048".to_owned()),
                "TCG_IDENTIFY_CHARGES_CREDIT" => Some("true".to_owned()),
                "TCG_HTTP_TIMEOUT_SECS" => Some("5".to_owned()),
                _ => None,
            };
        }
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address").to_string(),
            "127.0.0.1:9090"
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://grader@localhost/cards")
        );
        assert!(settings.run_migrations);
        assert!(settings.identify_charges_credit);
        assert_eq!(settings.max_upload_bytes(), 2048);
        assert_eq!(settings.http_timeout(), Duration::from_secs(5));
        let grading = settings
            .grading_api()
            .expect("valid url")
            .expect("grading api configured");
        assert_eq!(grading.url.as_str(), "https://grading.example.com/");
        assert_eq!(grading.token, "secret");
    }

    #[rstest]
    fn malformed_urls_are_reported() {
        let mut vars = cleared();
        for (name, value) in &mut vars {
            *value = match *name {
                "TCG_GRADING_API_URL" => Some("not a url".to_owned()),
                "TCG_GRADING_API_TOKEN" => Some("secret".to_owned()),
                _ => None,
            };
        }
        let _guard = lock_env(vars);

        let err = load_from_empty_args()
            .grading_api()
            .expect_err("invalid url");
        assert!(err.to_string().contains("TCG_GRADING_API_URL"));
    }
}
