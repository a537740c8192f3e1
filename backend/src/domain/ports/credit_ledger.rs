//! Driven port for the per-user credit balance.
//!
//! The ledger is the serialization point for paid work: `deduct` must be a
//! single atomic operation in the backing store (a stored procedure that
//! decrements only when the balance is positive). Callers never authorise a
//! paid call from a separately read balance.

use async_trait::async_trait;

use crate::domain::{CreditBalance, PaidOperation, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credit ledger adapters.
    pub enum CreditLedgerError {
        /// The balance was zero; nothing was deducted.
        InsufficientCredits => "insufficient credits",
        /// Connection could not be established or was lost.
        Connection { message: String } => "credit ledger connection failed: {message}",
        /// The procedure call failed.
        Query { message: String } => "credit ledger query failed: {message}",
    }
}

/// Atomic credit bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Current balance. Informational only.
    async fn balance(&self, user: &UserId) -> Result<CreditBalance, CreditLedgerError>;

    /// Atomically take one credit; returns the balance afterwards.
    async fn deduct(
        &self,
        user: &UserId,
        operation: PaidOperation,
    ) -> Result<CreditBalance, CreditLedgerError>;

    /// Give back one credit taken by [`CreditLedger::deduct`].
    async fn refund(
        &self,
        user: &UserId,
        operation: PaidOperation,
    ) -> Result<CreditBalance, CreditLedgerError>;
}
