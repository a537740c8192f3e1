//! Driving port for account data deletion.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// Account deletion use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Delete every row and stored object the user owns.
    async fn delete_account(&self, user: &UserId) -> Result<(), Error>;
}

/// Fixture with nothing to delete.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountCommand;

#[async_trait]
impl AccountCommand for FixtureAccountCommand {
    async fn delete_account(&self, _user: &UserId) -> Result<(), Error> {
        Ok(())
    }
}
