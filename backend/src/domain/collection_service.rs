//! Card collection management.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::port_errors::{map_card_repository_error, map_storage_error};
use crate::domain::ports::{
    CardDetails, CardImageUpload, CardRepository, CollectionCommand, CollectionQuery,
    GradingRecordRepository, GradingRecordRepositoryError, ImageStorage,
};
use crate::domain::{Card, CardId, Error, NewCard, UserId, card_storage_prefix};

/// Default cap on uploaded photo size.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Collection service implementing [`CollectionCommand`] and
/// [`CollectionQuery`].
pub struct CollectionService<C, R, S> {
    cards: Arc<C>,
    records: Arc<R>,
    storage: Arc<S>,
    clock: Arc<dyn Clock>,
    max_upload_bytes: usize,
}

impl<C, R, S> CollectionService<C, R, S> {
    /// Create the service.
    pub fn new(
        cards: Arc<C>,
        records: Arc<R>,
        storage: Arc<S>,
        clock: Arc<dyn Clock>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            cards,
            records,
            storage,
            clock,
            max_upload_bytes,
        }
    }
}

fn card_not_found() -> Error {
    Error::not_found("card not found")
}

impl<C, R, S> CollectionService<C, R, S>
where
    C: CardRepository,
    R: GradingRecordRepository,
    S: ImageStorage,
{
    fn map_record_error(error: GradingRecordRepositoryError) -> Error {
        match error {
            GradingRecordRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("grading record store unavailable: {message}"))
            }
            GradingRecordRepositoryError::Query { message } => {
                Error::internal(format!("grading record store error: {message}"))
            }
        }
    }

    async fn owned_card(&self, owner: &UserId, card_id: &CardId) -> Result<Card, Error> {
        self.cards
            .find_owned(owner, card_id)
            .await
            .map_err(map_card_repository_error)?
            .ok_or_else(card_not_found)
    }

    fn check_upload(&self, upload: &CardImageUpload) -> Result<(), Error> {
        if upload.bytes.is_empty() {
            return Err(Error::invalid_request("image body must not be empty"));
        }
        if upload.bytes.len() > self.max_upload_bytes {
            return Err(Error::payload_too_large(format!(
                "image exceeds {} bytes",
                self.max_upload_bytes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<C, R, S> CollectionCommand for CollectionService<C, R, S>
where
    C: CardRepository,
    R: GradingRecordRepository,
    S: ImageStorage,
{
    async fn add_card(&self, owner: &UserId, card: NewCard) -> Result<Card, Error> {
        let created = self
            .cards
            .create(owner, &card, self.clock.utc())
            .await
            .map_err(map_card_repository_error)?;
        info!(card_id = %created.id, user_id = %owner, "card added");
        Ok(created)
    }

    async fn upload_image(
        &self,
        owner: &UserId,
        card_id: &CardId,
        upload: CardImageUpload,
    ) -> Result<Card, Error> {
        self.check_upload(&upload)?;
        self.owned_card(owner, card_id).await?;

        let path = format!(
            "{}/{}.{}",
            card_storage_prefix(owner, card_id),
            upload.side.as_str(),
            upload.content_type.extension()
        );
        let stored = self
            .storage
            .upload(&path, upload.bytes, upload.content_type.mime())
            .await
            .map_err(map_storage_error)?;

        let updated = self
            .cards
            .set_image_path(owner, card_id, upload.side, &stored.path)
            .await
            .map_err(map_card_repository_error)?;
        if !updated {
            return Err(card_not_found());
        }
        info!(%card_id, side = upload.side.as_str(), "card image stored");
        self.owned_card(owner, card_id).await
    }

    async fn delete_card(&self, owner: &UserId, card_id: &CardId) -> Result<(), Error> {
        let deleted = self
            .cards
            .delete_owned(owner, card_id)
            .await
            .map_err(map_card_repository_error)?;
        if !deleted {
            return Err(card_not_found());
        }
        let prefix = card_storage_prefix(owner, card_id);
        match self.storage.remove_prefix(&prefix).await {
            Ok(removed) => info!(%card_id, removed, "card deleted"),
            Err(err) => warn!(%card_id, %prefix, error = %err, "card images not removed"),
        }
        Ok(())
    }
}

#[async_trait]
impl<C, R, S> CollectionQuery for CollectionService<C, R, S>
where
    C: CardRepository,
    R: GradingRecordRepository,
    S: ImageStorage,
{
    async fn list_cards(&self, owner: &UserId) -> Result<Vec<Card>, Error> {
        self.cards
            .list_for_owner(owner)
            .await
            .map_err(map_card_repository_error)
    }

    async fn card_details(&self, owner: &UserId, card_id: &CardId) -> Result<CardDetails, Error> {
        let card = self.owned_card(owner, card_id).await?;
        let grading = self
            .records
            .find_for_card(owner, card_id)
            .await
            .map_err(Self::map_record_error)?;
        Ok(CardDetails { card, grading })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        CardRepositoryError, ImageStorageError, MockCardRepository, MockGradingRecordRepository,
        MockImageStorage, StoredObject,
    };
    use crate::domain::{CardSide, ErrorCode, ImageContentType, OverlayUrls};
    use chrono::{DateTime, TimeZone, Utc};
    use mockable::DefaultClock;
    use rstest::rstest;

    const LIMIT: usize = 16;

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp")
    }

    fn card(owner: &UserId, id: CardId) -> Card {
        Card {
            id,
            owner: owner.clone(),
            name: "Blastoise".to_owned(),
            set_name: None,
            card_number: None,
            catalogue_card_id: None,
            front_image_path: None,
            back_image_path: None,
            overlays: OverlayUrls::default(),
            grade: None,
            created_at: created_at(),
        }
    }

    fn service(
        cards: MockCardRepository,
        records: MockGradingRecordRepository,
        storage: MockImageStorage,
    ) -> CollectionService<MockCardRepository, MockGradingRecordRepository, MockImageStorage> {
        CollectionService::new(
            Arc::new(cards),
            Arc::new(records),
            Arc::new(storage),
            Arc::new(DefaultClock),
            LIMIT,
        )
    }

    fn upload(bytes: Vec<u8>) -> CardImageUpload {
        CardImageUpload {
            side: CardSide::Back,
            content_type: ImageContentType::Webp,
            bytes,
        }
    }

    #[tokio::test]
    async fn add_card_persists_the_validated_card() {
        let owner = UserId::random();
        let owner_for_card = owner.clone();
        let mut cards = MockCardRepository::new();
        cards
            .expect_create()
            .withf(|_, card, _| card.name() == "Blastoise")
            .times(1)
            .return_once(move |_, _, _| Ok(card(&owner_for_card, CardId::random())));

        let new_card = NewCard::try_new("Blastoise", None, None, None).expect("valid card");
        let created = service(cards, MockGradingRecordRepository::new(), MockImageStorage::new())
            .add_card(&owner, new_card)
            .await
            .expect("created");
        assert_eq!(created.owner, owner);
    }

    #[tokio::test]
    async fn upload_stores_under_the_card_prefix() {
        let owner = UserId::random();
        let card_id = CardId::random();
        let expected_path = format!("{owner}/{card_id}/back.webp");
        let found = card(&owner, card_id);
        let mut updated = found.clone();
        updated.back_image_path = Some(expected_path.clone());

        let mut cards = MockCardRepository::new();
        let mut lookups = vec![updated, found];
        cards
            .expect_find_owned()
            .times(2)
            .returning(move |_, _| Ok(lookups.pop()));
        let path_for_set = expected_path.clone();
        cards
            .expect_set_image_path()
            .withf(move |_, _, side, path| *side == CardSide::Back && path == path_for_set)
            .times(1)
            .return_once(|_, _, _, _| Ok(true));
        let mut storage = MockImageStorage::new();
        let path_for_upload = expected_path.clone();
        storage
            .expect_upload()
            .withf(move |path, bytes, mime| {
                path == path_for_upload && bytes.len() == 3 && mime == "image/webp"
            })
            .times(1)
            .returning(|path, _, _| {
                Ok(StoredObject {
                    path: path.to_owned(),
                    public_url: format!("https://cdn.test/{path}"),
                })
            });

        let result = service(cards, MockGradingRecordRepository::new(), storage)
            .upload_image(&owner, &card_id, upload(vec![1, 2, 3]))
            .await
            .expect("uploaded");
        assert_eq!(result.back_image_path.as_deref(), Some(expected_path.as_str()));
    }

    #[rstest]
    #[case(Vec::new(), ErrorCode::InvalidRequest)]
    #[case(vec![7_u8; LIMIT + 1], ErrorCode::PayloadTooLarge)]
    #[tokio::test]
    async fn upload_rejects_bad_bodies_before_storage(
        #[case] bytes: Vec<u8>,
        #[case] expected: ErrorCode,
    ) {
        let mut storage = MockImageStorage::new();
        storage.expect_upload().times(0);

        let err = service(
            MockCardRepository::new(),
            MockGradingRecordRepository::new(),
            storage,
        )
        .upload_image(&UserId::random(), &CardId::random(), upload(bytes))
        .await
        .expect_err("rejected");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn upload_to_someone_elses_card_is_not_found() {
        let mut cards = MockCardRepository::new();
        cards.expect_find_owned().return_once(|_, _| Ok(None));
        let mut storage = MockImageStorage::new();
        storage.expect_upload().times(0);

        let err = service(cards, MockGradingRecordRepository::new(), storage)
            .upload_image(&UserId::random(), &CardId::random(), upload(vec![1]))
            .await
            .expect_err("not owned");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_removes_images_best_effort() {
        let mut cards = MockCardRepository::new();
        cards.expect_delete_owned().return_once(|_, _| Ok(true));
        let mut storage = MockImageStorage::new();
        storage
            .expect_remove_prefix()
            .times(1)
            .return_once(|_| Err(ImageStorageError::timeout("slow bucket")));

        service(cards, MockGradingRecordRepository::new(), storage)
            .delete_card(&UserId::random(), &CardId::random())
            .await
            .expect("deleted despite storage failure");
    }

    #[tokio::test]
    async fn delete_of_unknown_card_is_not_found() {
        let mut cards = MockCardRepository::new();
        cards.expect_delete_owned().return_once(|_, _| Ok(false));
        let mut storage = MockImageStorage::new();
        storage.expect_remove_prefix().times(0);

        let err = service(cards, MockGradingRecordRepository::new(), storage)
            .delete_card(&UserId::random(), &CardId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn details_include_the_grading_record() {
        let owner = UserId::random();
        let card_id = CardId::random();
        let found = card(&owner, card_id);
        let mut cards = MockCardRepository::new();
        cards
            .expect_find_owned()
            .return_once(move |_, _| Ok(Some(found)));
        let mut records = MockGradingRecordRepository::new();
        records.expect_find_for_card().return_once(|_, _| Ok(None));

        let details = service(cards, records, MockImageStorage::new())
            .card_details(&owner, &card_id)
            .await
            .expect("details");
        assert_eq!(details.card.id, card_id);
        assert!(details.grading.is_none());
    }

    #[rstest]
    #[case(CardRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(CardRepositoryError::query("bad sql"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn list_maps_repository_failures(
        #[case] failure: CardRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut cards = MockCardRepository::new();
        cards
            .expect_list_for_owner()
            .return_once(move |_| Err(failure));

        let err = service(cards, MockGradingRecordRepository::new(), MockImageStorage::new())
            .list_cards(&UserId::random())
            .await
            .expect_err("failed");
        assert_eq!(err.code(), expected);
    }
}
