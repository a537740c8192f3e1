//! Driving port for identifying a card from a photo.

use async_trait::async_trait;

use crate::domain::{Error, IdentificationCandidate, UserId};

/// Photo submitted for identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationImage {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// Identification use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardIdentificationQuery: Send + Sync {
    /// Ranked candidate matches, best first. May be empty.
    async fn identify_card(
        &self,
        user: &UserId,
        image: IdentificationImage,
    ) -> Result<Vec<IdentificationCandidate>, Error>;
}

/// Fixture that never finds a match.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCardIdentificationQuery;

#[async_trait]
impl CardIdentificationQuery for FixtureCardIdentificationQuery {
    async fn identify_card(
        &self,
        _user: &UserId,
        image: IdentificationImage,
    ) -> Result<Vec<IdentificationCandidate>, Error> {
        if image.bytes.is_empty() {
            return Err(Error::invalid_request("image must not be empty"));
        }
        Ok(Vec::new())
    }
}
