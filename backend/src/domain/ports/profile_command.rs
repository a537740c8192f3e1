//! Driving port for profile setup.

use async_trait::async_trait;

use crate::domain::{Error, NewProfile, UserId, Username};

/// Username checks and profile creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Whether `username` can still be claimed.
    async fn username_available(&self, username: &Username) -> Result<bool, Error>;

    /// Create the caller's profile.
    async fn create_profile(&self, user: &UserId, profile: NewProfile) -> Result<(), Error>;
}

/// Fixture accepting every username.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileCommand;

#[async_trait]
impl ProfileCommand for FixtureProfileCommand {
    async fn username_available(&self, _username: &Username) -> Result<bool, Error> {
        Ok(true)
    }

    async fn create_profile(&self, _user: &UserId, _profile: NewProfile) -> Result<(), Error> {
        Ok(())
    }
}
