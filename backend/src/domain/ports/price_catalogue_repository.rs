//! Driven port for the reference catalogue tables touched by price sync.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{
    CataloguePriceCoverage, CatalogueRecord, PriceSampleRequest, PriceSnapshot,
    PricedRecordSample, PricedSet,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue adapters.
    pub enum PriceCatalogueRepositoryError {
        /// Connection could not be established or was lost.
        Connection { message: String } => "catalogue connection failed: {message}",
        /// Query or update failed.
        Query { message: String } => "catalogue query failed: {message}",
    }
}

/// Catalogue reads, price writes and the daily price history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceCatalogueRepository: Send + Sync {
    /// Sets that carry a TCGplayer group id, ordered by name.
    async fn list_priced_sets(&self) -> Result<Vec<PricedSet>, PriceCatalogueRepositoryError>;

    /// One set by id, when it exists and has a group id.
    async fn find_priced_set(
        &self,
        set_id: &str,
    ) -> Result<Option<PricedSet>, PriceCatalogueRepositoryError>;

    /// Resolve a product id within a set: sealed products first, then cards.
    async fn find_record(
        &self,
        product_id: i64,
        set_id: &str,
    ) -> Result<Option<CatalogueRecord>, PriceCatalogueRepositoryError>;

    /// Overwrite a record's price data. Returns `false` when the row vanished.
    async fn write_prices(
        &self,
        record: &CatalogueRecord,
        price_data: &[Value],
        updated_at: DateTime<Utc>,
    ) -> Result<bool, PriceCatalogueRepositoryError>;

    /// Upsert the day's history rows for a record. A second run on the same
    /// day replaces that day's rows. Returns the number of rows written.
    async fn record_price_history(
        &self,
        record: &CatalogueRecord,
        snapshots: &[PriceSnapshot],
    ) -> Result<u64, PriceCatalogueRepositoryError>;

    /// Row counts describing how much of the catalogue is priced.
    async fn price_coverage(
        &self,
        updated_since: DateTime<Utc>,
    ) -> Result<CataloguePriceCoverage, PriceCatalogueRepositoryError>;

    /// Cards then products that carry price data.
    async fn sample_priced_records(
        &self,
        request: &PriceSampleRequest,
    ) -> Result<Vec<PricedRecordSample>, PriceCatalogueRepositoryError>;
}
