//! Card grading workflow.
//!
//! Preconditions (ownership, both photos present) are checked before any
//! credit moves. The credit is then deducted, the photos are fetched and
//! sent to the grading provider, and any failure up to a validated report is
//! refunded. Overlay copies and record replacement happen after the paid
//! work succeeded, so their failures never refund.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::join_all;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::paid_work::charge_then_run;
use crate::domain::port_errors::{
    map_card_repository_error, map_provider_error, map_storage_error,
};
use crate::domain::ports::{
    CardGradingCommand, CardRepository, CreditLedger, GradingImages, GradingProvider,
    GradingRecordRepository, GradingRecordRepositoryError, ImageStorage,
};
use crate::domain::{
    CardGradeSummary, CardId, Error, GradingRecord, GradingReport, ImageContentType, OverlayKind,
    OverlayUrls, PaidOperation, UserId, card_storage_prefix,
};

/// Message returned when a card is missing a face photo.
pub const BOTH_IMAGES_REQUIRED: &str = "Both front and back images are required";

/// Driven ports used by [`CardGradingService`].
pub struct CardGradingPorts<C, R, L, S, P> {
    /// Card lookup and grade summary updates.
    pub cards: Arc<C>,
    /// Grading record replacement.
    pub records: Arc<R>,
    /// Credit deduction and refund.
    pub ledger: Arc<L>,
    /// Photo downloads and overlay uploads.
    pub storage: Arc<S>,
    /// External grading service.
    pub provider: Arc<P>,
}

/// Grading service implementing [`CardGradingCommand`].
pub struct CardGradingService<C, R, L, S, P> {
    cards: Arc<C>,
    records: Arc<R>,
    ledger: Arc<L>,
    storage: Arc<S>,
    provider: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<C, R, L, S, P> CardGradingService<C, R, L, S, P> {
    /// Create the service.
    pub fn new(ports: CardGradingPorts<C, R, L, S, P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cards: ports.cards,
            records: ports.records,
            ledger: ports.ledger,
            storage: ports.storage,
            provider: ports.provider,
            clock,
        }
    }
}

impl<C, R, L, S, P> CardGradingService<C, R, L, S, P>
where
    C: CardRepository,
    R: GradingRecordRepository,
    L: CreditLedger,
    S: ImageStorage,
    P: GradingProvider,
{
    fn map_record_error(error: GradingRecordRepositoryError) -> Error {
        match error {
            GradingRecordRepositoryError::Connection { message } => {
                Error::internal(format!("grading record store unavailable: {message}"))
            }
            GradingRecordRepositoryError::Query { message } => {
                Error::internal(format!("grading record store error: {message}"))
            }
        }
    }

    async fn load_image(&self, path: &str) -> Result<String, Error> {
        let bytes = self
            .storage
            .download(path)
            .await
            .map_err(map_storage_error)?;
        Ok(STANDARD.encode(bytes))
    }

    /// Paid part of the workflow: fetch photos, call the provider.
    async fn obtain_report(
        &self,
        front_path: &str,
        back_path: &str,
    ) -> Result<GradingReport, Error> {
        let images = GradingImages {
            front_base64: self.load_image(front_path).await?,
            back_base64: self.load_image(back_path).await?,
        };
        self.provider
            .grade(&images)
            .await
            .map_err(map_provider_error)
    }

    async fn copy_overlay(&self, prefix: &str, kind: OverlayKind, source: &str) -> Option<String> {
        let overlay = match self.provider.fetch_overlay(source).await {
            Ok(overlay) => overlay,
            Err(err) => {
                warn!(overlay = kind.file_stem(), error = %err, "overlay download failed");
                return None;
            }
        };
        let content_type =
            ImageContentType::from_mime(&overlay.content_type).unwrap_or(ImageContentType::Jpeg);
        let path = format!(
            "{prefix}/overlays/{}.{}",
            kind.file_stem(),
            content_type.extension()
        );
        match self
            .storage
            .upload(&path, overlay.bytes, content_type.mime())
            .await
        {
            Ok(stored) => Some(stored.public_url),
            Err(err) => {
                warn!(overlay = kind.file_stem(), %path, error = %err, "overlay upload failed");
                None
            }
        }
    }

    /// Copy every provider overlay into our storage concurrently.
    async fn store_overlays(&self, prefix: &str, sources: &OverlayUrls) -> OverlayUrls {
        let copies = OverlayKind::ALL.iter().map(|&kind| async move {
            let url = match sources.get(kind) {
                Some(source) => self.copy_overlay(prefix, kind, source).await,
                None => None,
            };
            (kind, url)
        });
        let mut stored = OverlayUrls::default();
        for (kind, url) in join_all(copies).await {
            stored.set(kind, url);
        }
        stored
    }

    async fn persist(
        &self,
        user: &UserId,
        card_id: &CardId,
        record: &GradingRecord,
    ) -> Result<(), Error> {
        if let Err(err) = self.records.delete_for_card(user, card_id).await {
            warn!(%card_id, error = %err, "failed to delete previous grading record");
        }
        self.records
            .insert(record)
            .await
            .map_err(Self::map_record_error)?;

        let summary = CardGradeSummary {
            final_grade: record.grades.final_grade,
            confidence: record.confidence,
            graded_at: record.graded_at,
        };
        if let Err(err) = self
            .cards
            .record_grade(user, card_id, &summary, &record.overlays)
            .await
        {
            warn!(%card_id, error = %err, "failed to copy grade summary onto card");
        }
        Ok(())
    }
}

#[async_trait]
impl<C, R, L, S, P> CardGradingCommand for CardGradingService<C, R, L, S, P>
where
    C: CardRepository,
    R: GradingRecordRepository,
    L: CreditLedger,
    S: ImageStorage,
    P: GradingProvider,
{
    async fn grade_card(&self, user: &UserId, card_id: &CardId) -> Result<GradingRecord, Error> {
        let card = self
            .cards
            .find_owned(user, card_id)
            .await
            .map_err(map_card_repository_error)?
            .ok_or_else(|| Error::not_found("card not found"))?;
        let images = card
            .grading_images()
            .ok_or_else(|| Error::invalid_request(BOTH_IMAGES_REQUIRED))?;

        let report = charge_then_run(self.ledger.as_ref(), user, PaidOperation::Grading, || {
            self.obtain_report(images.front, images.back)
        })
        .await?;

        let prefix = card_storage_prefix(user, card_id);
        let overlays = self.store_overlays(&prefix, &report.overlay_sources).await;
        let record = GradingRecord::from_report(
            *card_id,
            user.clone(),
            report,
            overlays,
            self.clock.utc(),
        );
        self.persist(user, card_id, &record).await?;

        info!(
            %card_id,
            user_id = %user,
            final_grade = record.grades.final_grade,
            "card graded"
        );
        Ok(record)
    }
}

#[cfg(test)]
#[path = "card_grading_service_tests.rs"]
mod tests;
