//! Driving port for inspecting stored catalogue prices.

use async_trait::async_trait;

use crate::domain::{CataloguePriceCoverage, Error, PriceSampleRequest, PricedRecordSample};

/// Read-only views over catalogue prices, run from the `sync-prices` command.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceCatalogueQuery: Send + Sync {
    /// How many cards and products are linked, priced and recently updated.
    async fn price_coverage(&self) -> Result<CataloguePriceCoverage, Error>;

    /// A few priced records with their stored variants.
    async fn sample_prices(
        &self,
        request: &PriceSampleRequest,
    ) -> Result<Vec<PricedRecordSample>, Error>;
}
