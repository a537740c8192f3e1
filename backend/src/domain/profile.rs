//! Public profile primitives: usernames and display names.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Minimum username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length.
pub const USERNAME_MAX: usize = 20;
/// Maximum display name length.
pub const DISPLAY_NAME_MAX: usize = 50;

static USERNAME_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn username_regex() -> Option<&'static Regex> {
    USERNAME_RE
        .get_or_init(|| Regex::new("^[a-z0-9_]+$").ok())
        .as_ref()
}

/// Validation failures for profile input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    /// Username length outside the allowed range.
    #[error("username must be between {min} and {max} characters")]
    UsernameLength {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
    /// Username contains characters other than `a-z`, `0-9`, `_`.
    #[error("username may only contain lowercase letters, numbers, or underscores")]
    UsernameCharacters,
    /// Display name too long.
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Maximum length.
        max: usize,
    },
}

/// Unique public handle. Stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validate and normalise a username.
    ///
    /// # Examples
    /// ```
    /// use tcg_backend::domain::Username;
    ///
    /// let name = Username::new(" Ash_Ketchum ").expect("valid");
    /// assert_eq!(name.as_ref(), "ash_ketchum");
    /// ```
    pub fn new(raw: &str) -> Result<Self, ProfileValidationError> {
        let normalised = raw.trim().to_lowercase();
        let length = normalised.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(ProfileValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        let valid = match username_regex() {
            Some(re) => re.is_match(&normalised),
            None => normalised
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
        };
        if !valid {
            return Err(ProfileValidationError::UsernameCharacters);
        }
        Ok(Self(normalised))
    }

    /// Username as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated profile creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    /// Chosen username.
    pub username: Username,
    /// Optional display name; blank values are dropped.
    pub display_name: Option<String>,
}

impl NewProfile {
    /// Validate raw profile input.
    pub fn try_new(username: &str, display_name: Option<&str>) -> Result<Self, ProfileValidationError> {
        let username = Username::new(username)?;
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        if display_name
            .as_ref()
            .is_some_and(|name| name.chars().count() > DISPLAY_NAME_MAX)
        {
            return Err(ProfileValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self {
            username,
            display_name,
        })
    }
}
