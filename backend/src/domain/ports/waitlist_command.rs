//! Driving port for joining the waitlist.

use async_trait::async_trait;

use crate::domain::{Error, WaitlistEmail, WaitlistSignup};

/// Waitlist signup use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WaitlistCommand: Send + Sync {
    /// Add an address; repeating a signup is not an error.
    async fn join(&self, email: WaitlistEmail) -> Result<WaitlistSignup, Error>;
}

/// Fixture accepting every signup as new.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWaitlistCommand;

#[async_trait]
impl WaitlistCommand for FixtureWaitlistCommand {
    async fn join(&self, _email: WaitlistEmail) -> Result<WaitlistSignup, Error> {
        Ok(WaitlistSignup::Added)
    }
}
