//! Coverage figures and samples of stored catalogue prices.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;

use crate::domain::port_errors::map_catalogue_error;
use crate::domain::ports::{PriceCatalogueQuery, PriceCatalogueRepository};
use crate::domain::{
    CataloguePriceCoverage, Error, PRICE_FRESHNESS_HOURS, PriceSampleRequest, PricedRecordSample,
};

/// Upper bound on records sampled per table.
pub const PRICE_SAMPLE_MAX: u32 = 50;

/// Read-only price views implementing [`PriceCatalogueQuery`].
pub struct PriceCatalogueService<R> {
    catalogue: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> PriceCatalogueService<R> {
    /// Create the service.
    pub fn new(catalogue: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { catalogue, clock }
    }
}

#[async_trait]
impl<R> PriceCatalogueQuery for PriceCatalogueService<R>
where
    R: PriceCatalogueRepository,
{
    async fn price_coverage(&self) -> Result<CataloguePriceCoverage, Error> {
        let since = self.clock.utc() - Duration::hours(PRICE_FRESHNESS_HOURS);
        self.catalogue
            .price_coverage(since)
            .await
            .map_err(map_catalogue_error)
    }

    async fn sample_prices(
        &self,
        request: &PriceSampleRequest,
    ) -> Result<Vec<PricedRecordSample>, Error> {
        if request.limit == 0 {
            return Err(Error::invalid_request("sample limit must be at least 1"));
        }
        let bounded = PriceSampleRequest {
            set_id: request.set_id.clone(),
            limit: request.limit.min(PRICE_SAMPLE_MAX),
        };
        self.catalogue
            .sample_priced_records(&bounded)
            .await
            .map_err(map_catalogue_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockPriceCatalogueRepository, PriceCatalogueRepositoryError};
    use crate::domain::{CatalogueTable, ErrorCode, TablePriceCoverage};
    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::rstest;

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp")
        }
    }

    fn service(
        catalogue: MockPriceCatalogueRepository,
    ) -> PriceCatalogueService<MockPriceCatalogueRepository> {
        PriceCatalogueService::new(Arc::new(catalogue), Arc::new(FixtureClock))
    }

    #[rstest]
    #[tokio::test]
    async fn coverage_counts_updates_within_the_freshness_window() {
        let mut catalogue = MockPriceCatalogueRepository::new();
        catalogue
            .expect_price_coverage()
            .withf(|since| {
                *since
                    == Utc
                        .with_ymd_and_hms(2026, 4, 30, 12, 0, 0)
                        .single()
                        .expect("valid timestamp")
            })
            .return_once(|_| {
                Ok(CataloguePriceCoverage {
                    cards: TablePriceCoverage {
                        total: 10,
                        with_tcgplayer_id: 8,
                        with_prices: 6,
                        updated_recently: 4,
                    },
                    products: TablePriceCoverage::default(),
                })
            });

        let coverage = service(catalogue).price_coverage().await.expect("coverage");

        assert_eq!(coverage.cards.with_prices, 6);
        assert_eq!(coverage.products.total, 0);
    }

    #[rstest]
    #[case(3, 3)]
    #[case(500, PRICE_SAMPLE_MAX)]
    #[tokio::test]
    async fn sample_limit_is_capped(#[case] requested: u32, #[case] forwarded: u32) {
        let mut catalogue = MockPriceCatalogueRepository::new();
        catalogue
            .expect_sample_priced_records()
            .withf(move |request| {
                request.limit == forwarded && request.set_id.as_deref() == Some("sv8")
            })
            .return_once(|_| {
                Ok(vec![PricedRecordSample {
                    table: CatalogueTable::Cards,
                    id: "sv8-25".to_owned(),
                    name: "Pikachu ex".to_owned(),
                    price_last_updated: None,
                    variants: Vec::new(),
                }])
            });

        let samples = service(catalogue)
            .sample_prices(&PriceSampleRequest {
                set_id: Some("sv8".to_owned()),
                limit: requested,
            })
            .await
            .expect("samples");

        assert_eq!(samples.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn zero_sample_limit_is_rejected() {
        let mut catalogue = MockPriceCatalogueRepository::new();
        catalogue.expect_sample_priced_records().times(0);

        let err = service(catalogue)
            .sample_prices(&PriceSampleRequest {
                set_id: None,
                limit: 0,
            })
            .await
            .expect_err("invalid limit");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn lost_connection_is_unavailable() {
        let mut catalogue = MockPriceCatalogueRepository::new();
        catalogue
            .expect_price_coverage()
            .return_once(|_| Err(PriceCatalogueRepositoryError::connection("refused")));

        let err = service(catalogue)
            .price_coverage()
            .await
            .expect_err("no connection");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
