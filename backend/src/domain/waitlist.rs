//! Waitlist signups.

use std::fmt;

/// Maximum accepted email length (RFC 5321 path limit).
pub const EMAIL_MAX: usize = 254;

/// Validation failures for a waitlist email.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaitlistEmailError {
    /// Blank input.
    #[error("email must not be empty")]
    Empty,
    /// Not shaped like `local@domain.tld`, or too long.
    #[error("email address is not valid")]
    Invalid,
}

/// Syntactically plausible, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaitlistEmail(String);

impl WaitlistEmail {
    /// Validate an address: one `@`, non-empty local part, and a dotted
    /// domain without whitespace.
    ///
    /// # Examples
    /// ```
    /// use tcg_backend::domain::WaitlistEmail;
    ///
    /// assert!(WaitlistEmail::new("Oak@Pallet.town").is_ok());
    /// assert!(WaitlistEmail::new("oak@localhost").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, WaitlistEmailError> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() {
            return Err(WaitlistEmailError::Empty);
        }
        if email.len() > EMAIL_MAX || email.chars().any(char::is_whitespace) {
            return Err(WaitlistEmailError::Invalid);
        }
        let Some((local, domain)) = email.split_once('@') else {
            return Err(WaitlistEmailError::Invalid);
        };
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && domain.split('.').all(|label| !label.is_empty());
        if local.is_empty() || !domain_ok {
            return Err(WaitlistEmailError::Invalid);
        }
        Ok(Self(email))
    }

    /// Normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for WaitlistEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaitlistEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a signup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitlistSignup {
    /// The address was added.
    Added,
    /// The address was already on the list.
    AlreadyRegistered,
}
