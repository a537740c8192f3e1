//! Credit balances for paid operations.

use serde::Serialize;
use utoipa::ToSchema;

/// Remaining paid operations for a user. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CreditBalance(u32);

impl CreditBalance {
    /// Wrap a balance.
    #[must_use]
    pub const fn new(credits: u32) -> Self {
        Self(credits)
    }

    /// Convert a database counter, treating negative values as zero.
    #[must_use]
    pub fn from_db(value: i32) -> Self {
        Self(u32::try_from(value).unwrap_or(0))
    }

    /// Number of credits.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Operations that consume a credit. Recorded alongside ledger movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaidOperation {
    /// Condition grading of a card.
    Grading,
    /// Card identification from a photo.
    Identification,
}

impl PaidOperation {
    /// Label stored with the ledger entry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grading => "grading",
            Self::Identification => "identification",
        }
    }
}
