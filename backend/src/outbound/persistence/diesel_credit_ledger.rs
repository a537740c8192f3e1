//! PostgreSQL-backed `CreditLedger` using the credit stored procedures.
//!
//! Balance changes go exclusively through `deduct_user_credit` and
//! `refund_user_credit`; the deduct procedure's conditional update is the
//! only serialisation point between concurrent paid requests.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{CreditLedger, CreditLedgerError};
use crate::domain::{CreditBalance, PaidOperation, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::CreditBalanceResult;
use super::pool::{DbPool, PoolError};
use super::schema::user_credits;

const DEDUCT_SQL: &str = "SELECT deduct_user_credit($1, $2) AS credits";
const REFUND_SQL: &str = "SELECT refund_user_credit($1, $2) AS credits";

/// Diesel-backed implementation of the `CreditLedger` port.
#[derive(Clone)]
pub struct DieselCreditLedger {
    pool: DbPool,
}

impl DieselCreditLedger {
    /// Create a new ledger with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn call(
        &self,
        sql: &'static str,
        user: &UserId,
        operation: PaidOperation,
        label: &'static str,
    ) -> Result<Option<i32>, CreditLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: CreditBalanceResult = sql_query(sql)
            .bind::<SqlUuid, _>(*user.as_uuid())
            .bind::<Text, _>(operation.as_str())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error(label))?;
        Ok(result.credits)
    }
}

fn map_pool_error(error: PoolError) -> CreditLedgerError {
    map_basic_pool_error(error, CreditLedgerError::connection)
}

fn map_diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> CreditLedgerError {
    move |error| {
        map_basic_diesel_error(
            error,
            operation,
            CreditLedgerError::query,
            CreditLedgerError::connection,
        )
    }
}

/// Interpret the deduct procedure's result: `NULL` means nothing was taken.
fn deduction_outcome(credits: Option<i32>) -> Result<CreditBalance, CreditLedgerError> {
    credits
        .map(CreditBalance::from_db)
        .ok_or_else(CreditLedgerError::insufficient_credits)
}

#[async_trait]
impl CreditLedger for DieselCreditLedger {
    async fn balance(&self, user: &UserId) -> Result<CreditBalance, CreditLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let credits: Option<i32> = user_credits::table
            .filter(user_credits::user_id.eq(user.as_uuid()))
            .select(user_credits::credits)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("read credit balance"))?;
        Ok(credits.map_or(CreditBalance::new(0), CreditBalance::from_db))
    }

    async fn deduct(
        &self,
        user: &UserId,
        operation: PaidOperation,
    ) -> Result<CreditBalance, CreditLedgerError> {
        let credits = self
            .call(DEDUCT_SQL, user, operation, "deduct_user_credit")
            .await?;
        let balance = deduction_outcome(credits)?;
        debug!(user_id = %user, operation = operation.as_str(), remaining = balance.get(), "credit deducted");
        Ok(balance)
    }

    async fn refund(
        &self,
        user: &UserId,
        operation: PaidOperation,
    ) -> Result<CreditBalance, CreditLedgerError> {
        let credits = self
            .call(REFUND_SQL, user, operation, "refund_user_credit")
            .await?;
        credits
            .map(CreditBalance::from_db)
            .ok_or_else(|| CreditLedgerError::query("refund_user_credit returned no balance"))
    }
}
