//! Driven port for grading records.

use async_trait::async_trait;

use crate::domain::{CardId, GradingRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by grading record adapters.
    pub enum GradingRecordRepositoryError {
        /// Connection could not be established or was lost.
        Connection { message: String } => "grading record connection failed: {message}",
        /// Query or mutation failed.
        Query { message: String } => "grading record query failed: {message}",
    }
}

/// Storage for the single retained grading record per card.
///
/// Replacement is two separate calls (`delete_for_card` then `insert`) so
/// the caller can treat a failed delete as non-fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GradingRecordRepository: Send + Sync {
    /// Latest record for an owned card.
    async fn find_for_card(
        &self,
        owner: &UserId,
        card_id: &CardId,
    ) -> Result<Option<GradingRecord>, GradingRecordRepositoryError>;

    /// Remove every record for the card; returns the number removed.
    async fn delete_for_card(
        &self,
        owner: &UserId,
        card_id: &CardId,
    ) -> Result<u64, GradingRecordRepositoryError>;

    /// Persist a new record.
    async fn insert(&self, record: &GradingRecord) -> Result<(), GradingRecordRepositoryError>;
}
