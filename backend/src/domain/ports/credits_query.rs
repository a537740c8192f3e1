//! Driving port for reading a credit balance.

use async_trait::async_trait;

use crate::domain::{CreditBalance, Error, UserId};

/// Balance lookup for display. Never used to authorise paid work.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreditsQuery: Send + Sync {
    /// Current balance of `user`.
    async fn balance(&self, user: &UserId) -> Result<CreditBalance, Error>;
}

/// Fixture reporting an empty balance.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCreditsQuery;

#[async_trait]
impl CreditsQuery for FixtureCreditsQuery {
    async fn balance(&self, _user: &UserId) -> Result<CreditBalance, Error> {
        Ok(CreditBalance::new(0))
    }
}
