//! Driven port for the published TCGplayer price feed.

use async_trait::async_trait;

use crate::domain::PriceEntry;

use super::define_port_error;

define_port_error! {
    /// Errors raised by price feed adapters.
    pub enum PriceSourceError {
        /// Unknown group or otherwise rejected request.
        InvalidRequest { message: String } => "price feed rejected request: {message}",
        /// The request timed out.
        Timeout { message: String } => "price feed timed out: {message}",
        /// Network failure or 5xx.
        Transport { message: String } => "price feed transport failed: {message}",
        /// Body was not a recognised price list.
        Decode { message: String } => "price feed payload invalid: {message}",
    }
}

/// Source of price entries for one TCGplayer group.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Every price entry published for `group_id`.
    async fn fetch_prices(&self, group_id: i64) -> Result<Vec<PriceEntry>, PriceSourceError>;
}
