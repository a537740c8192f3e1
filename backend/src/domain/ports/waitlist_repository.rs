//! Driven port for waitlist signups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{WaitlistEmail, WaitlistSignup};

use super::define_port_error;

define_port_error! {
    /// Errors raised by waitlist adapters.
    pub enum WaitlistRepositoryError {
        /// Connection could not be established or was lost.
        Connection { message: String } => "waitlist connection failed: {message}",
        /// Insert failed.
        Query { message: String } => "waitlist query failed: {message}",
    }
}

/// Waitlist persistence. Adding an existing address is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    /// Add `email`, reporting whether it was already present.
    async fn add(
        &self,
        email: &WaitlistEmail,
        signed_up_at: DateTime<Utc>,
    ) -> Result<WaitlistSignup, WaitlistRepositoryError>;
}
