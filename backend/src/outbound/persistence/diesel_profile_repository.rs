//! PostgreSQL-backed `ProfileRepository` using the profile stored procedures.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::{Nullable, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{NewProfile, UserId, Username};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CreateProfileResult, UsernameAvailableResult};
use super::pool::{DbPool, PoolError};

const CHECK_USERNAME_SQL: &str = "SELECT check_username_available($1) AS available";
const CREATE_PROFILE_SQL: &str = "SELECT create_user_profile($1, $2, $3) AS outcome";

/// Diesel-backed implementation of the `ProfileRepository` port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    map_basic_pool_error(error, ProfileRepositoryError::connection)
}

fn map_diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> ProfileRepositoryError {
    move |error| {
        map_basic_diesel_error(
            error,
            operation,
            ProfileRepositoryError::query,
            ProfileRepositoryError::connection,
        )
    }
}

/// Interpret the status string returned by `create_user_profile`.
fn creation_outcome(outcome: &str, username: &Username) -> Result<(), ProfileRepositoryError> {
    match outcome {
        "created" => Ok(()),
        "username_taken" => Err(ProfileRepositoryError::username_taken(username.as_str())),
        "profile_exists" => Err(ProfileRepositoryError::profile_exists()),
        other => Err(ProfileRepositoryError::query(format!(
            "create_user_profile returned unexpected outcome '{other}'"
        ))),
    }
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn is_username_available(
        &self,
        username: &Username,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: UsernameAvailableResult = sql_query(CHECK_USERNAME_SQL)
            .bind::<Text, _>(username.as_str())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error("check_username_available"))?;
        Ok(result.available)
    }

    async fn create_profile(
        &self,
        user: &UserId,
        profile: &NewProfile,
    ) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: CreateProfileResult = sql_query(CREATE_PROFILE_SQL)
            .bind::<SqlUuid, _>(*user.as_uuid())
            .bind::<Text, _>(profile.username.as_str())
            .bind::<Nullable<Text>, _>(profile.display_name.as_deref())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error("create_user_profile"))?;
        creation_outcome(&result.outcome, &profile.username)
    }
}
