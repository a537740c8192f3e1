//! Tests for the card grading workflow.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;
use serde_json::json;

use super::*;
use base64::Engine as _;
use crate::domain::ports::{
    CardRepositoryError, CreditLedgerError, GradingProviderError, ImageStorageError,
    MockCardRepository, MockCreditLedger, MockGradingProvider, MockGradingRecordRepository,
    MockImageStorage, OverlayImage, StoredObject,
};
use crate::domain::{
    Card, CenteringRatios, CreditBalance, ErrorCode, GradingReport, SubGrades,
};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        graded_at()
    }
}

fn graded_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
        .single()
        .expect("valid fixture timestamp")
}

fn card(owner: &UserId, id: CardId, front: Option<&str>, back: Option<&str>) -> Card {
    Card {
        id,
        owner: owner.clone(),
        name: "Charizard".to_owned(),
        set_name: Some("Base Set".to_owned()),
        card_number: Some("4/102".to_owned()),
        catalogue_card_id: None,
        front_image_path: front.map(str::to_owned),
        back_image_path: back.map(str::to_owned),
        overlays: OverlayUrls::default(),
        grade: None,
        created_at: graded_at(),
    }
}

fn report() -> GradingReport {
    GradingReport {
        grades: SubGrades {
            corners: 8.5,
            edges: 9.0,
            surface: 9.0,
            centering: 9.5,
            final_grade: 9.0,
            condition: Some("Mint".to_owned()),
        },
        front_centering: CenteringRatios {
            left_right: Some("52/48".to_owned()),
            top_bottom: Some("50/50".to_owned()),
        },
        back_centering: CenteringRatios::default(),
        confidence: Some(0.93),
        overlay_sources: OverlayUrls {
            front_full: Some("https://provider.test/front_full.jpg".to_owned()),
            front_exact: Some("https://provider.test/front_exact.jpg".to_owned()),
            back_full: Some("https://provider.test/back_full.jpg".to_owned()),
            back_exact: Some("https://provider.test/back_exact.jpg".to_owned()),
        },
        raw_response: json!({ "grades": { "final": 9.0 } }),
    }
}

struct Mocks {
    cards: MockCardRepository,
    records: MockGradingRecordRepository,
    ledger: MockCreditLedger,
    storage: MockImageStorage,
    provider: MockGradingProvider,
}

impl Mocks {
    fn new() -> Self {
        Self {
            cards: MockCardRepository::new(),
            records: MockGradingRecordRepository::new(),
            ledger: MockCreditLedger::new(),
            storage: MockImageStorage::new(),
            provider: MockGradingProvider::new(),
        }
    }

    fn with_card(mut self, found: Option<Card>) -> Self {
        self.cards
            .expect_find_owned()
            .times(1)
            .return_once(move |_, _| Ok(found));
        self
    }

    fn with_credit(mut self) -> Self {
        self.ledger
            .expect_deduct()
            .times(1)
            .return_once(|_, _| Ok(CreditBalance::new(2)));
        self
    }

    fn expect_refund(mut self, times: usize) -> Self {
        self.ledger
            .expect_refund()
            .times(times)
            .returning(|_, _| Ok(CreditBalance::new(3)));
        self
    }

    fn with_images(mut self) -> Self {
        self.storage
            .expect_download()
            .times(2)
            .returning(|path| Ok(path.as_bytes().to_vec()));
        self
    }

    fn into_service(
        self,
    ) -> CardGradingService<
        MockCardRepository,
        MockGradingRecordRepository,
        MockCreditLedger,
        MockImageStorage,
        MockGradingProvider,
    > {
        CardGradingService::new(
            CardGradingPorts {
                cards: Arc::new(self.cards),
                records: Arc::new(self.records),
                ledger: Arc::new(self.ledger),
                storage: Arc::new(self.storage),
                provider: Arc::new(self.provider),
            },
            Arc::new(FixtureClock),
        )
    }
}

fn graded_card(user: &UserId, card_id: CardId) -> Option<Card> {
    Some(card(
        user,
        card_id,
        Some("u/c/front.jpg"),
        Some("u/c/back.jpg"),
    ))
}

fn overlay_ok() -> Result<OverlayImage, GradingProviderError> {
    Ok(OverlayImage {
        bytes: vec![0x89, 0x50],
        content_type: "image/png".to_owned(),
    })
}

#[tokio::test]
async fn missing_card_is_not_found_and_charges_nothing() {
    let user = UserId::random();
    let mut mocks = Mocks::new().with_card(None);
    mocks.ledger.expect_deduct().times(0);
    let service = mocks.into_service();

    let err = service
        .grade_card(&user, &CardId::random())
        .await
        .expect_err("card is missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(Some("u/c/front.jpg"), None)]
#[case(None, Some("u/c/back.jpg"))]
#[case(None, None)]
#[tokio::test]
async fn missing_photo_is_rejected_before_charging(
    #[case] front: Option<&'static str>,
    #[case] back: Option<&'static str>,
) {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new().with_card(Some(card(&user, card_id, front, back)));
    mocks.ledger.expect_deduct().times(0);
    mocks.provider.expect_grade().times(0);
    let service = mocks.into_service();

    let err = service
        .grade_card(&user, &card_id)
        .await
        .expect_err("photo missing");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), BOTH_IMAGES_REQUIRED);
}

#[tokio::test]
async fn empty_balance_is_payment_required_without_provider_call() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new().with_card(graded_card(&user, card_id));
    mocks
        .ledger
        .expect_deduct()
        .times(1)
        .return_once(|_, _| Err(CreditLedgerError::insufficient_credits()));
    mocks.ledger.expect_refund().times(0);
    mocks.storage.expect_download().times(0);
    mocks.provider.expect_grade().times(0);
    let service = mocks.into_service();

    let err = service
        .grade_card(&user, &card_id)
        .await
        .expect_err("no credits");
    assert_eq!(err.code(), ErrorCode::PaymentRequired);
    assert_eq!(err.message(), "Insufficient credits");
}

#[tokio::test]
async fn other_deduction_failures_are_internal() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new().with_card(graded_card(&user, card_id));
    mocks
        .ledger
        .expect_deduct()
        .return_once(|_, _| Err(CreditLedgerError::query("procedure missing")));
    mocks.provider.expect_grade().times(0);
    let service = mocks.into_service();

    let err = service
        .grade_card(&user, &card_id)
        .await
        .expect_err("deduction failed");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn image_download_failure_is_refunded() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new()
        .with_card(graded_card(&user, card_id))
        .with_credit()
        .expect_refund(1);
    mocks
        .storage
        .expect_download()
        .returning(|path| Err(ImageStorageError::not_found(path)));
    mocks.provider.expect_grade().times(0);
    mocks.records.expect_insert().times(0);
    let service = mocks.into_service();

    service
        .grade_card(&user, &card_id)
        .await
        .expect_err("download failed");
}

#[rstest]
#[case(GradingProviderError::malformed_response("missing grades"))]
#[case(GradingProviderError::timeout("30s elapsed"))]
#[case(GradingProviderError::transport("connection reset"))]
#[tokio::test]
async fn provider_failure_is_refunded_and_writes_no_record(#[case] failure: GradingProviderError) {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new()
        .with_card(graded_card(&user, card_id))
        .with_credit()
        .expect_refund(1)
        .with_images();
    mocks
        .provider
        .expect_grade()
        .times(1)
        .return_once(move |_| Err(failure));
    mocks.records.expect_delete_for_card().times(0);
    mocks.records.expect_insert().times(0);
    let service = mocks.into_service();

    service
        .grade_card(&user, &card_id)
        .await
        .expect_err("provider failed");
}

#[tokio::test]
async fn refund_failure_still_surfaces_provider_error() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new()
        .with_card(graded_card(&user, card_id))
        .with_credit()
        .with_images();
    mocks
        .ledger
        .expect_refund()
        .times(1)
        .return_once(|_, _| Err(CreditLedgerError::connection("pool exhausted")));
    mocks
        .provider
        .expect_grade()
        .return_once(|_| Err(GradingProviderError::invalid_request("not a card")));
    let service = mocks.into_service();

    let err = service
        .grade_card(&user, &card_id)
        .await
        .expect_err("provider rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn photos_are_sent_base64_encoded() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new()
        .with_card(graded_card(&user, card_id))
        .with_credit()
        .expect_refund(1)
        .with_images();
    mocks
        .provider
        .expect_grade()
        .withf(|images| {
            images.front_base64 == STANDARD.encode("u/c/front.jpg")
                && images.back_base64 == STANDARD.encode("u/c/back.jpg")
        })
        .times(1)
        .return_once(|_| Err(GradingProviderError::malformed_response("stop here")));
    let service = mocks.into_service();

    service
        .grade_card(&user, &card_id)
        .await
        .expect_err("stopped after provider call");
}

#[tokio::test]
async fn success_replaces_record_and_tolerates_one_failed_overlay() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new()
        .with_card(graded_card(&user, card_id))
        .with_credit()
        .expect_refund(0)
        .with_images();
    mocks
        .provider
        .expect_grade()
        .times(1)
        .return_once(|_| Ok(report()));
    mocks
        .provider
        .expect_fetch_overlay()
        .times(4)
        .returning(|_| overlay_ok());
    mocks
        .storage
        .expect_upload()
        .times(4)
        .returning(|path, _, content_type| {
            assert_eq!(content_type, "image/png");
            if path.ends_with("back_exact.png") {
                Err(ImageStorageError::transport("bucket offline"))
            } else {
                Ok(StoredObject {
                    path: path.to_owned(),
                    public_url: format!("https://cdn.test/{path}"),
                })
            }
        });
    mocks
        .records
        .expect_delete_for_card()
        .times(1)
        .return_once(|_, _| Ok(1));
    mocks.records.expect_insert().times(1).return_once(|_| Ok(()));
    mocks
        .cards
        .expect_record_grade()
        .withf(|_, _, summary, _| summary.final_grade == 9.0)
        .times(1)
        .return_once(|_, _, _, _| Ok(()));
    let service = mocks.into_service();

    let record = service
        .grade_card(&user, &card_id)
        .await
        .expect("grading succeeds");

    assert_eq!(record.card_id, card_id);
    assert_eq!(record.grades.final_grade, 9.0);
    assert_eq!(record.graded_at, graded_at());
    assert_eq!(
        record.overlays.front_full.as_deref(),
        Some(format!("https://cdn.test/{user}/{card_id}/overlays/front_full.png").as_str())
    );
    assert!(record.overlays.front_exact.is_some());
    assert!(record.overlays.back_full.is_some());
    assert_eq!(record.overlays.back_exact, None);
}

#[tokio::test]
async fn missing_overlay_sources_are_skipped() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new()
        .with_card(graded_card(&user, card_id))
        .with_credit()
        .expect_refund(0)
        .with_images();
    mocks.provider.expect_grade().return_once(|_| {
        let mut without_overlays = report();
        without_overlays.overlay_sources = OverlayUrls::default();
        Ok(without_overlays)
    });
    mocks.provider.expect_fetch_overlay().times(0);
    mocks.storage.expect_upload().times(0);
    mocks.records.expect_delete_for_card().return_once(|_, _| Ok(0));
    mocks.records.expect_insert().return_once(|_| Ok(()));
    mocks.cards.expect_record_grade().return_once(|_, _, _, _| Ok(()));
    let service = mocks.into_service();

    let record = service
        .grade_card(&user, &card_id)
        .await
        .expect("grading succeeds");
    assert_eq!(record.overlays, OverlayUrls::default());
}

#[tokio::test]
async fn failed_delete_of_previous_record_still_inserts() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new()
        .with_card(graded_card(&user, card_id))
        .with_credit()
        .expect_refund(0)
        .with_images();
    mocks.provider.expect_grade().return_once(|_| Ok(report()));
    mocks
        .provider
        .expect_fetch_overlay()
        .returning(|_| Err(GradingProviderError::transport("gone")));
    mocks
        .records
        .expect_delete_for_card()
        .return_once(|_, _| Err(GradingRecordRepositoryError::query("lock timeout")));
    mocks.records.expect_insert().times(1).return_once(|_| Ok(()));
    mocks
        .cards
        .expect_record_grade()
        .return_once(|_, _, _, _| Err(CardRepositoryError::query("row vanished")));
    let service = mocks.into_service();

    let record = service
        .grade_card(&user, &card_id)
        .await
        .expect("grading still succeeds");
    assert_eq!(record.overlays, OverlayUrls::default());
}

#[tokio::test]
async fn failed_insert_is_internal_and_not_refunded() {
    let user = UserId::random();
    let card_id = CardId::random();
    let mut mocks = Mocks::new()
        .with_card(graded_card(&user, card_id))
        .with_credit()
        .expect_refund(0)
        .with_images();
    mocks.provider.expect_grade().return_once(|_| Ok(report()));
    mocks
        .provider
        .expect_fetch_overlay()
        .returning(|_| Err(GradingProviderError::timeout("slow")));
    mocks.records.expect_delete_for_card().return_once(|_, _| Ok(0));
    mocks
        .records
        .expect_insert()
        .return_once(|_| Err(GradingRecordRepositoryError::connection("refused")));
    mocks.cards.expect_record_grade().times(0);
    let service = mocks.into_service();

    let err = service
        .grade_card(&user, &card_id)
        .await
        .expect_err("insert failed");
    assert_eq!(err.code(), ErrorCode::InternalError);
}
