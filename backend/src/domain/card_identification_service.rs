//! Card identification from a single photo.
//!
//! Nothing is persisted. When identification is configured as a paid
//! operation the call is wrapped in the same charge-then-refund policy as
//! grading.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::info;

use crate::domain::paid_work::charge_then_run;
use crate::domain::port_errors::map_provider_error;
use crate::domain::ports::{
    CardIdentificationQuery, CreditLedger, GradingProvider, IdentificationImage,
};
use crate::domain::{Error, IdentificationCandidate, PaidOperation, UserId, rank_matches};

/// Whether identification costs a credit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentificationCharging {
    /// Identification is free.
    #[default]
    Free,
    /// One credit per call, refunded on failure.
    OneCredit,
}

impl From<bool> for IdentificationCharging {
    fn from(charges: bool) -> Self {
        if charges { Self::OneCredit } else { Self::Free }
    }
}

/// Identification service implementing [`CardIdentificationQuery`].
pub struct CardIdentificationService<P, L> {
    provider: Arc<P>,
    ledger: Arc<L>,
    charging: IdentificationCharging,
    max_image_bytes: usize,
}

impl<P, L> CardIdentificationService<P, L> {
    /// Create the service.
    pub fn new(
        provider: Arc<P>,
        ledger: Arc<L>,
        charging: IdentificationCharging,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            provider,
            ledger,
            charging,
            max_image_bytes,
        }
    }
}

impl<P, L> CardIdentificationService<P, L>
where
    P: GradingProvider,
    L: CreditLedger,
{
    async fn call_provider(&self, encoded: &str) -> Result<Vec<IdentificationCandidate>, Error> {
        let matches = self
            .provider
            .identify(encoded)
            .await
            .map_err(map_provider_error)?;
        Ok(rank_matches(matches))
    }
}

#[async_trait]
impl<P, L> CardIdentificationQuery for CardIdentificationService<P, L>
where
    P: GradingProvider,
    L: CreditLedger,
{
    async fn identify_card(
        &self,
        user: &UserId,
        image: IdentificationImage,
    ) -> Result<Vec<IdentificationCandidate>, Error> {
        if image.bytes.is_empty() {
            return Err(Error::invalid_request("image must not be empty"));
        }
        if image.bytes.len() > self.max_image_bytes {
            return Err(Error::payload_too_large(format!(
                "image exceeds {} bytes",
                self.max_image_bytes
            )));
        }
        let encoded = STANDARD.encode(&image.bytes);

        let candidates = match self.charging {
            IdentificationCharging::Free => self.call_provider(&encoded).await?,
            IdentificationCharging::OneCredit => {
                charge_then_run(
                    self.ledger.as_ref(),
                    user,
                    PaidOperation::Identification,
                    || self.call_provider(&encoded),
                )
                .await?
            }
        };
        info!(user_id = %user, candidates = candidates.len(), "card identified");
        Ok(candidates)
    }
}
