//! PostgreSQL-backed `WaitlistRepository` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{WaitlistRepository, WaitlistRepositoryError};
use crate::domain::{WaitlistEmail, WaitlistSignup};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::waitlist;

/// Diesel-backed implementation of the `WaitlistRepository` port.
#[derive(Clone)]
pub struct DieselWaitlistRepository {
    pool: DbPool,
}

impl DieselWaitlistRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WaitlistRepositoryError {
    map_basic_pool_error(error, WaitlistRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> WaitlistRepositoryError {
    map_basic_diesel_error(
        error,
        "insert waitlist signup",
        WaitlistRepositoryError::query,
        WaitlistRepositoryError::connection,
    )
}

/// Zero inserted rows means the address hit the primary key conflict.
fn signup_outcome(inserted: usize) -> WaitlistSignup {
    if inserted == 0 {
        WaitlistSignup::AlreadyRegistered
    } else {
        WaitlistSignup::Added
    }
}

#[async_trait]
impl WaitlistRepository for DieselWaitlistRepository {
    async fn add(
        &self,
        email: &WaitlistEmail,
        signed_up_at: DateTime<Utc>,
    ) -> Result<WaitlistSignup, WaitlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(waitlist::table)
            .values((
                waitlist::email.eq(email.as_str()),
                waitlist::created_at.eq(signed_up_at),
            ))
            .on_conflict(waitlist::email)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(signup_outcome(inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_inserts_are_already_registered() {
        assert_eq!(signup_outcome(0), WaitlistSignup::AlreadyRegistered);
        assert_eq!(signup_outcome(1), WaitlistSignup::Added);
    }
}
