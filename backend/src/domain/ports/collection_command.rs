//! Driving port for changing a user's collection.

use async_trait::async_trait;

use crate::domain::{Card, CardId, CardSide, Error, ImageContentType, NewCard, UserId};

/// Photo upload for one face of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardImageUpload {
    /// Face being uploaded.
    pub side: CardSide,
    /// Declared image format.
    pub content_type: ImageContentType,
    /// Image bytes.
    pub bytes: Vec<u8>,
}

/// Collection mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionCommand: Send + Sync {
    /// Add a card.
    async fn add_card(&self, owner: &UserId, card: NewCard) -> Result<Card, Error>;

    /// Store a face photo and point the card at it.
    async fn upload_image(
        &self,
        owner: &UserId,
        card_id: &CardId,
        upload: CardImageUpload,
    ) -> Result<Card, Error>;

    /// Remove a card and its stored images.
    async fn delete_card(&self, owner: &UserId, card_id: &CardId) -> Result<(), Error>;
}

/// Fixture used when no backing services are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCollectionCommand;

#[async_trait]
impl CollectionCommand for FixtureCollectionCommand {
    async fn add_card(&self, _owner: &UserId, _card: NewCard) -> Result<Card, Error> {
        Err(Error::service_unavailable("collection storage is not configured"))
    }

    async fn upload_image(
        &self,
        _owner: &UserId,
        _card_id: &CardId,
        _upload: CardImageUpload,
    ) -> Result<Card, Error> {
        Err(Error::not_found("card not found"))
    }

    async fn delete_card(&self, _owner: &UserId, _card_id: &CardId) -> Result<(), Error> {
        Err(Error::not_found("card not found"))
    }
}
