//! Profile setup: username availability and profile creation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{ProfileCommand, ProfileRepository, ProfileRepositoryError};
use crate::domain::{Error, NewProfile, UserId, Username};

/// Profile service implementing [`ProfileCommand`].
pub struct ProfileService<P> {
    repo: Arc<P>,
}

impl<P> ProfileService<P> {
    /// Create the service.
    pub fn new(repo: Arc<P>) -> Self {
        Self { repo }
    }
}

impl<P> ProfileService<P>
where
    P: ProfileRepository,
{
    fn map_profile_error(error: ProfileRepositoryError) -> Error {
        match error {
            ProfileRepositoryError::UsernameTaken { username } => {
                Error::conflict("username already taken")
                    .with_details(json!({ "field": "username", "value": username }))
            }
            ProfileRepositoryError::ProfileExists => Error::conflict("profile already exists"),
            ProfileRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("profile repository unavailable: {message}"))
            }
            ProfileRepositoryError::Query { message } => {
                Error::internal(format!("profile repository error: {message}"))
            }
        }
    }
}

#[async_trait]
impl<P> ProfileCommand for ProfileService<P>
where
    P: ProfileRepository,
{
    async fn username_available(&self, username: &Username) -> Result<bool, Error> {
        self.repo
            .is_username_available(username)
            .await
            .map_err(Self::map_profile_error)
    }

    async fn create_profile(&self, user: &UserId, profile: NewProfile) -> Result<(), Error> {
        self.repo
            .create_profile(user, &profile)
            .await
            .map_err(Self::map_profile_error)?;
        info!(user_id = %user, username = %profile.username, "profile created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockProfileRepository;
    use rstest::rstest;

    fn profile() -> NewProfile {
        NewProfile::try_new("ash_k", Some("Ash")).expect("valid profile")
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn availability_comes_from_the_repository(#[case] free: bool) {
        let mut repo = MockProfileRepository::new();
        repo.expect_is_username_available()
            .withf(|name| name.as_ref() == "misty")
            .return_once(move |_| Ok(free));

        let username = Username::new("Misty").expect("valid username");
        let available = ProfileService::new(Arc::new(repo))
            .username_available(&username)
            .await
            .expect("checked");
        assert_eq!(available, free);
    }

    #[rstest]
    #[case(ProfileRepositoryError::username_taken("ash_k"), ErrorCode::Conflict)]
    #[case(ProfileRepositoryError::profile_exists(), ErrorCode::Conflict)]
    #[case(ProfileRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ProfileRepositoryError::query("bad call"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn creation_failures_map_to_codes(
        #[case] failure: ProfileRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockProfileRepository::new();
        repo.expect_create_profile()
            .return_once(move |_, _| Err(failure));

        let err = ProfileService::new(Arc::new(repo))
            .create_profile(&UserId::random(), profile())
            .await
            .expect_err("creation fails");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn creation_passes_the_profile_through() {
        let mut repo = MockProfileRepository::new();
        repo.expect_create_profile()
            .withf(|_, p| p.username.as_ref() == "ash_k" && p.display_name.as_deref() == Some("Ash"))
            .times(1)
            .return_once(|_, _| Ok(()));

        ProfileService::new(Arc::new(repo))
            .create_profile(&UserId::random(), profile())
            .await
            .expect("created");
    }
}
