//! Driven port for public profiles (backed by the `check_username_available`
//! and `create_user_profile` procedures).

use async_trait::async_trait;

use crate::domain::{NewProfile, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile adapters.
    pub enum ProfileRepositoryError {
        /// Username already belongs to another account.
        UsernameTaken { username: String } => "username already taken: {username}",
        /// The caller already has a profile.
        ProfileExists => "profile already exists",
        /// Connection could not be established or was lost.
        Connection { message: String } => "profile repository connection failed: {message}",
        /// Query or procedure call failed.
        Query { message: String } => "profile repository query failed: {message}",
    }
}

/// Profile persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Whether `username` is free.
    async fn is_username_available(
        &self,
        username: &Username,
    ) -> Result<bool, ProfileRepositoryError>;

    /// Create the caller's profile.
    async fn create_profile(
        &self,
        user: &UserId,
        profile: &NewProfile,
    ) -> Result<(), ProfileRepositoryError>;
}
