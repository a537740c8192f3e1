//! PostgreSQL-backed `AccountRepository` implementation.
//!
//! All of a user's rows are removed in one transaction; a failure part way
//! leaves everything in place.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::info;

use crate::domain::UserId;
use crate::domain::ports::{AccountRepository, AccountRepositoryError, DeletedAccountData};

use super::diesel_basic_error_mapping::{
    affected_rows, map_basic_diesel_error, map_basic_pool_error,
};
use super::pool::{DbPool, PoolError};
use super::schema::{cards, credit_transactions, grading_records, profiles, user_credits};

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    map_basic_pool_error(error, AccountRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    map_basic_diesel_error(
        error,
        "delete account data",
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn delete_account_data(
        &self,
        user: &UserId,
    ) -> Result<DeletedAccountData, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *user.as_uuid();

        let (grading_count, card_count) = conn
            .transaction(|conn| {
                async move {
                    let grading_count = diesel::delete(
                        grading_records::table.filter(grading_records::user_id.eq(user_uuid)),
                    )
                    .execute(conn)
                    .await?;
                    let card_count =
                        diesel::delete(cards::table.filter(cards::user_id.eq(user_uuid)))
                            .execute(conn)
                            .await?;
                    diesel::delete(profiles::table.filter(profiles::user_id.eq(user_uuid)))
                        .execute(conn)
                        .await?;
                    diesel::delete(
                        credit_transactions::table
                            .filter(credit_transactions::user_id.eq(user_uuid)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(user_credits::table.filter(user_credits::user_id.eq(user_uuid)))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((grading_count, card_count))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        info!(user_id = %user, cards = card_count, "account rows deleted");
        Ok(DeletedAccountData {
            cards: affected_rows(card_count),
            grading_records: affected_rows(grading_count),
        })
    }
}
