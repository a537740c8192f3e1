//! Driven port for removing everything an account owns.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by account data adapters.
    pub enum AccountRepositoryError {
        /// Connection could not be established or was lost.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Deletion failed; the transaction was rolled back.
        Query { message: String } => "account repository query failed: {message}",
    }
}

/// Rows removed by [`AccountRepository::delete_account_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedAccountData {
    /// Collection cards.
    pub cards: u64,
    /// Grading records.
    pub grading_records: u64,
}

/// Account-wide deletion. Must be transactional: all rows or none.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Delete cards, grading records, profile and credit rows for `user`.
    async fn delete_account_data(
        &self,
        user: &UserId,
    ) -> Result<DeletedAccountData, AccountRepositoryError>;
}
