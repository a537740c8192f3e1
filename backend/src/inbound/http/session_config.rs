//! Session cookie configuration and validation.
//!
//! Raw toggles arrive from the application settings as optional strings so
//! that "missing" and "invalid" stay distinguishable. Debug builds fall back
//! to defaults with a warning; release builds reject anything not set
//! explicitly and correctly.

use actix_web::cookie::{Key, SameSite};
use std::path::PathBuf;
use tracing::warn;
use zeroize::Zeroize;

/// Default location of the mounted session key.
pub const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// Minimum key length accepted in release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
/// Shortest key material `Key::derive_from` accepts.
const KEY_DERIVE_MIN_LEN: usize = 32;

const COOKIE_SECURE: &str = "TCG_SESSION_COOKIE_SECURE";
const SAME_SITE: &str = "TCG_SESSION_SAME_SITE";
const ALLOW_EPHEMERAL: &str = "TCG_SESSION_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAME_SITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Tolerates defaults and warns about missing toggles.
    Debug,
    /// Requires explicit, valid toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tcg_backend::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Unvalidated session toggles as read from configuration.
#[derive(Clone, Debug, Default)]
pub struct SessionToggles {
    /// Path of the key file; defaults to [`SESSION_KEY_DEFAULT_PATH`].
    pub key_file: Option<PathBuf>,
    /// Boolean flag for the cookie `Secure` attribute.
    pub cookie_secure: Option<String>,
    /// `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    /// Whether a generated key may replace an unreadable key file.
    pub allow_ephemeral: Option<String>,
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required setting is missing.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A setting is present but invalid.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without a secure cookie.
    #[error("TCG_SESSION_SAME_SITE=None requires TCG_SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral keys.
    #[error("TCG_SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Validate session toggles for the given build mode.
///
/// # Examples
///
/// ```rust
/// use tcg_backend::inbound::http::session_config::{
///     BuildMode, SessionToggles, session_settings_from_toggles,
/// };
///
/// let toggles = SessionToggles {
///     key_file: Some("/nonexistent/session_key".into()),
///     ..SessionToggles::default()
/// };
/// let settings = session_settings_from_toggles(&toggles, BuildMode::Debug)
///     .expect("debug builds fall back to defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_toggles(
    toggles: &SessionToggles,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = bool_toggle(COOKIE_SECURE, toggles.cookie_secure.as_deref(), mode, true)?;
    let same_site = same_site(toggles.same_site.as_deref(), mode, cookie_secure)?;
    let allow_ephemeral =
        bool_toggle(ALLOW_EPHEMERAL, toggles.allow_ephemeral.as_deref(), mode, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(toggles.key_file.clone(), mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn bool_toggle(
    name: &'static str,
    raw: Option<&str>,
    mode: BuildMode,
    debug_default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = raw else {
        if mode.is_debug() {
            warn!(setting = name, default = debug_default, "session setting not set");
            return Ok(debug_default);
        }
        return Err(SessionConfigError::Missing { name });
    };
    match parse_bool(value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(setting = name, value, default = debug_default, "invalid session setting");
            Ok(debug_default)
        }
        None => Err(SessionConfigError::Invalid {
            name,
            value: value.to_owned(),
            expected: BOOL_EXPECTED,
        }),
    }
}

fn same_site(
    raw: Option<&str>,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = raw else {
        if mode.is_debug() {
            warn!(setting = SAME_SITE, "session setting not set; using Lax");
            return Ok(default_same_site);
        }
        return Err(SessionConfigError::Missing { name: SAME_SITE });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("SameSite=None with an insecure cookie; browsers may reject it");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(setting = SAME_SITE, value, "invalid session setting; using Lax");
            Ok(default_same_site)
        }
        _ => Err(SessionConfigError::Invalid {
            name: SAME_SITE,
            value: value.to_owned(),
            expected: SAME_SITE_EXPECTED,
        }),
    }
}

fn session_key(
    key_file: Option<PathBuf>,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = key_file.unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH));

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            let min_len = if mode.is_debug() {
                KEY_DERIVE_MIN_LEN
            } else {
                SESSION_KEY_MIN_LEN
            };
            if length < min_len {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
