//! Driven port for collection card storage.
//!
//! Every operation is scoped by the owning [`UserId`]; an adapter must never
//! return or mutate a card owned by someone else. "Not owned" and "does not
//! exist" are indistinguishable to callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Card, CardGradeSummary, CardId, CardSide, NewCard, OverlayUrls, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by card repository adapters.
    pub enum CardRepositoryError {
        /// Connection could not be established or was lost.
        Connection { message: String } => "card repository connection failed: {message}",
        /// Query or mutation failed.
        Query { message: String } => "card repository query failed: {message}",
    }
}

/// Persistence for user-owned cards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Insert a new card and return it.
    async fn create(
        &self,
        owner: &UserId,
        card: &NewCard,
        created_at: DateTime<Utc>,
    ) -> Result<Card, CardRepositoryError>;

    /// Cards owned by `owner`, newest first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Card>, CardRepositoryError>;

    /// Fetch a card if it exists and belongs to `owner`.
    async fn find_owned(
        &self,
        owner: &UserId,
        card_id: &CardId,
    ) -> Result<Option<Card>, CardRepositoryError>;

    /// Point one face at a stored image. Returns `false` when no owned card
    /// matched.
    async fn set_image_path(
        &self,
        owner: &UserId,
        card_id: &CardId,
        side: CardSide,
        path: &str,
    ) -> Result<bool, CardRepositoryError>;

    /// Mirror the latest grading onto the card.
    async fn record_grade(
        &self,
        owner: &UserId,
        card_id: &CardId,
        summary: &CardGradeSummary,
        overlays: &OverlayUrls,
    ) -> Result<(), CardRepositoryError>;

    /// Delete an owned card. Returns `false` when nothing matched.
    async fn delete_owned(
        &self,
        owner: &UserId,
        card_id: &CardId,
    ) -> Result<bool, CardRepositoryError>;
}
