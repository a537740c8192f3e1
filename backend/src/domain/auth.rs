//! Login credentials.
//!
//! Handlers build [`LoginCredentials`] from the request body before calling
//! the `LoginService` port, so adapters only ever see validated input.

use zeroize::Zeroizing;

/// Reasons a login payload is rejected before reaching the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated email/password pair.
///
/// ## Invariants
/// - `email` is trimmed and lowercased, never empty.
/// - `password` is non-empty and kept verbatim; it is zeroed on drop.
///
/// # Examples
/// ```
/// use tcg_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ash@Example.com ", "pikachu")
///     .expect("valid credentials");
/// assert_eq!(creds.email(), "ash@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Password exactly as supplied.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
