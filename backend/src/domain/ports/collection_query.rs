//! Driving port for reading a user's collection.

use async_trait::async_trait;

use crate::domain::{Card, CardId, Error, GradingRecord, UserId};

/// A card together with its retained grading record.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetails {
    /// The card.
    pub card: Card,
    /// Latest grading, if any.
    pub grading: Option<GradingRecord>,
}

/// Collection reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionQuery: Send + Sync {
    /// Every card the user owns, newest first.
    async fn list_cards(&self, owner: &UserId) -> Result<Vec<Card>, Error>;

    /// One owned card with its grading record.
    async fn card_details(&self, owner: &UserId, card_id: &CardId) -> Result<CardDetails, Error>;
}

/// Fixture with an empty collection.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCollectionQuery;

#[async_trait]
impl CollectionQuery for FixtureCollectionQuery {
    async fn list_cards(&self, _owner: &UserId) -> Result<Vec<Card>, Error> {
        Ok(Vec::new())
    }

    async fn card_details(&self, _owner: &UserId, _card_id: &CardId) -> Result<CardDetails, Error> {
        Err(Error::not_found("card not found"))
    }
}
