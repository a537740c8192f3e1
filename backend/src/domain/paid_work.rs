//! Charge-then-refund wrapper for work that costs the user a credit.
//!
//! The credit is taken before the work starts so the ledger's atomic
//! deduction is the only admission check. When the work fails the credit is
//! given back. A failed refund is logged and the work's error is still the
//! one returned.

use std::future::Future;

use tracing::{error, info};

use crate::domain::port_errors::map_deduct_error;
use crate::domain::ports::CreditLedger;
use crate::domain::{Error, PaidOperation, UserId};

/// Deduct one credit, run `work`, refund if it fails.
pub(crate) async fn charge_then_run<L, F, Fut, T>(
    ledger: &L,
    user: &UserId,
    operation: PaidOperation,
    work: F,
) -> Result<T, Error>
where
    L: CreditLedger + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let remaining = ledger
        .deduct(user, operation)
        .await
        .map_err(map_deduct_error)?;
    info!(
        user_id = %user,
        operation = operation.as_str(),
        remaining = remaining.get(),
        "credit deducted"
    );

    match work().await {
        Ok(value) => Ok(value),
        Err(err) => {
            refund(ledger, user, operation, &err).await;
            Err(err)
        }
    }
}

async fn refund<L>(ledger: &L, user: &UserId, operation: PaidOperation, cause: &Error)
where
    L: CreditLedger + ?Sized,
{
    match ledger.refund(user, operation).await {
        Ok(balance) => info!(
            user_id = %user,
            operation = operation.as_str(),
            balance = balance.get(),
            cause = %cause,
            "credit refunded after failed paid operation"
        ),
        Err(refund_error) => error!(
            user_id = %user,
            operation = operation.as_str(),
            cause = %cause,
            error = %refund_error,
            "credit refund failed; balance is one credit short"
        ),
    }
}
