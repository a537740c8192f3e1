//! Driving port for grading a card.

use async_trait::async_trait;

use crate::domain::{CardId, Error, GradingRecord, UserId};

/// Grade one of the caller's cards, charging one credit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardGradingCommand: Send + Sync {
    /// Run the grading workflow and return the stored record.
    async fn grade_card(&self, user: &UserId, card_id: &CardId) -> Result<GradingRecord, Error>;
}

/// Fixture used when no backing services are configured. Its collection is
/// empty, so every card is reported as missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCardGradingCommand;

#[async_trait]
impl CardGradingCommand for FixtureCardGradingCommand {
    async fn grade_card(&self, _user: &UserId, _card_id: &CardId) -> Result<GradingRecord, Error> {
        Err(Error::not_found("card not found"))
    }
}
