//! Catalogue price synchronisation from the TCGplayer price feed.
//!
//! Each set is processed independently: a failed fetch or lookup is counted
//! and the run moves on. Records written within the freshness window are
//! skipped unless the request forces a rewrite. Every price write is followed
//! by the day's history rows for that record; a failed history write is
//! counted as an error but leaves the price update in place. A dry run
//! performs every read and counts would-be writes as updates.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::port_errors::map_catalogue_error;
use crate::domain::ports::{PriceCatalogueRepository, PriceSource, PriceSyncCommand};
use crate::domain::{
    CatalogueRecord, Error, PriceSnapshot, PriceSyncReport, PriceSyncRequest, PriceSyncStats, PricedSet,
    SetScope, UnknownProduct, UnknownSetProducts, daily_snapshots, group_by_product,
};

/// Price synchronisation service implementing [`PriceSyncCommand`].
pub struct PriceSyncService<S, R> {
    source: Arc<S>,
    catalogue: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<S, R> PriceSyncService<S, R> {
    /// Create the service.
    pub fn new(source: Arc<S>, catalogue: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            catalogue,
            clock,
        }
    }
}

/// Options shared by every set in one run.
#[derive(Debug, Clone, Copy)]
struct RunOptions {
    dry_run: bool,
    force: bool,
    now: DateTime<Utc>,
}

impl<S, R> PriceSyncService<S, R>
where
    S: PriceSource,
    R: PriceCatalogueRepository,
{
    async fn resolve_sets(&self, scope: &SetScope) -> Result<Vec<PricedSet>, Error> {
        match scope {
            SetScope::All => self
                .catalogue
                .list_priced_sets()
                .await
                .map_err(map_catalogue_error),
            SetScope::One(set_id) => self
                .catalogue
                .find_priced_set(set_id)
                .await
                .map_err(map_catalogue_error)?
                .map(|set| vec![set])
                .ok_or_else(|| {
                    Error::not_found(format!("set {set_id} not found or has no group id"))
                }),
        }
    }

    async fn sync_product(
        &self,
        set: &PricedSet,
        product_id: i64,
        entries: Vec<Value>,
        options: RunOptions,
        stats: &mut PriceSyncStats,
        unknown: &mut Vec<UnknownProduct>,
    ) {
        let record = match self.catalogue.find_record(product_id, &set.id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                stats.unknown_products += 1;
                unknown.push(UnknownProduct {
                    product_id,
                    variants: entries,
                });
                return;
            }
            Err(err) => {
                warn!(set_id = %set.id, product_id, error = %err, "catalogue lookup failed");
                stats.errors += 1;
                return;
            }
        };

        if !options.force && record.is_fresh(options.now) {
            stats.record_skipped(record.table);
            return;
        }
        let snapshots = daily_snapshots(product_id, &entries, options.now.date_naive());
        if options.dry_run {
            stats.record_updated(record.table);
            stats.history_rows += snapshots.len() as u64;
            return;
        }
        match self
            .catalogue
            .write_prices(&record, &entries, options.now)
            .await
        {
            Ok(true) => {
                stats.record_updated(record.table);
                self.record_history(&record, &snapshots, stats).await;
            }
            Ok(false) => {
                warn!(table = %record.table, id = %record.id, "priced record vanished");
                stats.errors += 1;
            }
            Err(err) => {
                warn!(table = %record.table, id = %record.id, error = %err, "price write failed");
                stats.errors += 1;
            }
        }
    }

    async fn record_history(
        &self,
        record: &CatalogueRecord,
        snapshots: &[PriceSnapshot],
        stats: &mut PriceSyncStats,
    ) {
        if snapshots.is_empty() {
            return;
        }
        match self.catalogue.record_price_history(record, snapshots).await {
            Ok(rows) => stats.history_rows += rows,
            Err(err) => {
                warn!(table = %record.table, id = %record.id, error = %err, "price history write failed");
                stats.errors += 1;
            }
        }
    }

    async fn sync_set(
        &self,
        set: &PricedSet,
        options: RunOptions,
    ) -> (PriceSyncStats, Vec<UnknownProduct>) {
        let mut stats = PriceSyncStats::default();
        let mut unknown = Vec::new();

        let entries = match self.source.fetch_prices(set.group_id).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(set_id = %set.id, group_id = set.group_id, error = %err, "price fetch failed");
                stats.errors += 1;
                return (stats, unknown);
            }
        };

        for (product_id, variants) in group_by_product(entries) {
            self.sync_product(set, product_id, variants, options, &mut stats, &mut unknown)
                .await;
        }
        info!(
            set_id = %set.id,
            cards_updated = stats.cards_updated,
            products_updated = stats.products_updated,
            cards_skipped = stats.cards_skipped,
            products_skipped = stats.products_skipped,
            unknown_products = stats.unknown_products,
            history_rows = stats.history_rows,
            errors = stats.errors,
            "set prices synchronised"
        );
        (stats, unknown)
    }
}

#[async_trait]
impl<S, R> PriceSyncCommand for PriceSyncService<S, R>
where
    S: PriceSource,
    R: PriceCatalogueRepository,
{
    async fn sync_prices(&self, request: PriceSyncRequest) -> Result<PriceSyncReport, Error> {
        let sets = self.resolve_sets(&request.scope).await?;
        let options = RunOptions {
            dry_run: request.dry_run,
            force: request.force,
            now: self.clock.utc(),
        };

        let mut report = PriceSyncReport {
            dry_run: request.dry_run,
            ..PriceSyncReport::default()
        };
        for set in &sets {
            let (stats, unknown) = self.sync_set(set, options).await;
            report.sets_processed += 1;
            report.totals += stats;
            report.per_set.insert(set.id.clone(), stats);
            if !unknown.is_empty() {
                report.unknown.insert(
                    set.id.clone(),
                    UnknownSetProducts {
                        set_name: set.name.clone(),
                        product_ids: unknown,
                    },
                );
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockPriceCatalogueRepository, MockPriceSource, PriceCatalogueRepositoryError,
        PriceSourceError,
    };
    use crate::domain::{CatalogueRecord, CatalogueTable, ErrorCode, PriceEntry};
    use chrono::{Duration, Local, TimeZone};
    use rstest::{fixture, rstest};
    use serde_json::json;

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            now()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn surging_sparks() -> PricedSet {
        PricedSet {
            id: "sv8".to_owned(),
            name: "Surging Sparks".to_owned(),
            group_id: 23651,
        }
    }

    fn entry(product_id: Option<i64>, sub_type: &str) -> PriceEntry {
        PriceEntry {
            product_id,
            payload: json!({ "productId": product_id, "subTypeName": sub_type, "marketPrice": 1.5 }),
        }
    }

    fn record(table: CatalogueTable, id: &str, hours_ago: Option<i64>) -> CatalogueRecord {
        CatalogueRecord {
            table,
            id: id.to_owned(),
            price_last_updated: hours_ago.map(|h| now() - Duration::hours(h)),
        }
    }

    fn service(
        source: MockPriceSource,
        catalogue: MockPriceCatalogueRepository,
    ) -> PriceSyncService<MockPriceSource, MockPriceCatalogueRepository> {
        PriceSyncService::new(Arc::new(source), Arc::new(catalogue), Arc::new(FixtureClock))
    }

    fn request(scope: SetScope, dry_run: bool, force: bool) -> PriceSyncRequest {
        PriceSyncRequest {
            scope,
            dry_run,
            force,
        }
    }

    fn feed() -> Vec<PriceEntry> {
        vec![
            entry(Some(1), "Normal"),
            entry(Some(1), "Holofoil"),
            entry(Some(2), "Normal"),
            entry(Some(3), "Normal"),
            entry(None, "Orphan"),
        ]
    }

    fn catalogue_with_records(set: PricedSet) -> MockPriceCatalogueRepository {
        let mut catalogue = MockPriceCatalogueRepository::new();
        catalogue
            .expect_find_priced_set()
            .return_once(move |_| Ok(Some(set)));
        catalogue
            .expect_find_record()
            .returning(|product_id, _| {
                Ok(match product_id {
                    1 => Some(record(CatalogueTable::Cards, "sv8-1", Some(48))),
                    2 => Some(record(CatalogueTable::Products, "etb-sv8", Some(2))),
                    _ => None,
                })
            });
        catalogue
    }

    #[rstest]
    #[tokio::test]
    async fn stale_records_are_written_and_fresh_ones_skipped(surging_sparks: PricedSet) {
        let mut source = MockPriceSource::new();
        source
            .expect_fetch_prices()
            .withf(|group| *group == 23651)
            .return_once(|_| Ok(feed()));
        let mut catalogue = catalogue_with_records(surging_sparks);
        catalogue
            .expect_write_prices()
            .withf(|record, data, at| record.id == "sv8-1" && data.len() == 2 && *at == now())
            .times(1)
            .return_once(|_, _, _| Ok(true));
        catalogue
            .expect_record_price_history()
            .withf(|record, snapshots| {
                record.id == "sv8-1"
                    && snapshots.len() == 2
                    && snapshots
                        .iter()
                        .all(|s| s.product_id == 1 && s.price_date == now().date_naive())
            })
            .times(1)
            .return_once(|_, snapshots| Ok(snapshots.len() as u64));

        let report = service(source, catalogue)
            .sync_prices(request(SetScope::One("sv8".to_owned()), false, false))
            .await
            .expect("sync runs");

        assert_eq!(report.sets_processed, 1);
        assert_eq!(report.totals.cards_updated, 1);
        assert_eq!(report.totals.products_skipped, 1);
        assert_eq!(report.totals.unknown_products, 1);
        assert_eq!(report.totals.history_rows, 2);
        assert_eq!(report.totals.errors, 0);
        let unknown = report.unknown.get("sv8").expect("unknown products recorded");
        assert_eq!(unknown.set_name, "Surging Sparks");
        assert_eq!(unknown.product_ids[0].product_id, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn force_rewrites_fresh_records(surging_sparks: PricedSet) {
        let mut source = MockPriceSource::new();
        source.expect_fetch_prices().return_once(|_| Ok(feed()));
        let mut catalogue = catalogue_with_records(surging_sparks);
        catalogue
            .expect_write_prices()
            .times(2)
            .returning(|_, _, _| Ok(true));
        catalogue
            .expect_record_price_history()
            .times(2)
            .returning(|_, snapshots| Ok(snapshots.len() as u64));

        let report = service(source, catalogue)
            .sync_prices(request(SetScope::One("sv8".to_owned()), false, true))
            .await
            .expect("sync runs");
        assert_eq!(report.totals.cards_updated, 1);
        assert_eq!(report.totals.products_updated, 1);
        assert_eq!(report.totals.products_skipped, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn dry_run_counts_updates_without_writing(surging_sparks: PricedSet) {
        let mut source = MockPriceSource::new();
        source.expect_fetch_prices().return_once(|_| Ok(feed()));
        let mut catalogue = catalogue_with_records(surging_sparks);
        catalogue.expect_write_prices().times(0);
        catalogue.expect_record_price_history().times(0);

        let report = service(source, catalogue)
            .sync_prices(request(SetScope::One("sv8".to_owned()), true, false))
            .await
            .expect("sync runs");
        assert!(report.dry_run);
        assert_eq!(report.totals.cards_updated, 1);
        assert_eq!(report.totals.products_skipped, 1);
        assert_eq!(report.totals.history_rows, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_history_write_keeps_the_price_update(surging_sparks: PricedSet) {
        let mut source = MockPriceSource::new();
        source.expect_fetch_prices().return_once(|_| Ok(feed()));
        let mut catalogue = catalogue_with_records(surging_sparks);
        catalogue
            .expect_write_prices()
            .times(1)
            .return_once(|_, _, _| Ok(true));
        catalogue
            .expect_record_price_history()
            .times(1)
            .return_once(|_, _| Err(PriceCatalogueRepositoryError::query("deadlock detected")));

        let report = service(source, catalogue)
            .sync_prices(request(SetScope::One("sv8".to_owned()), false, false))
            .await
            .expect("sync runs");
        assert_eq!(report.totals.cards_updated, 1);
        assert_eq!(report.totals.history_rows, 0);
        assert_eq!(report.totals.errors, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn vanished_record_gets_no_history(surging_sparks: PricedSet) {
        let mut source = MockPriceSource::new();
        source.expect_fetch_prices().return_once(|_| Ok(feed()));
        let mut catalogue = catalogue_with_records(surging_sparks);
        catalogue
            .expect_write_prices()
            .return_once(|_, _, _| Ok(false));
        catalogue.expect_record_price_history().times(0);

        let report = service(source, catalogue)
            .sync_prices(request(SetScope::One("sv8".to_owned()), false, false))
            .await
            .expect("sync runs");
        assert_eq!(report.totals.cards_updated, 0);
        assert_eq!(report.totals.errors, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_fetch_is_counted_and_other_sets_continue(surging_sparks: PricedSet) {
        let stellar = PricedSet {
            id: "sv7".to_owned(),
            name: "Stellar Crown".to_owned(),
            group_id: 23537,
        };
        let mut catalogue = MockPriceCatalogueRepository::new();
        catalogue
            .expect_list_priced_sets()
            .return_once(move || Ok(vec![surging_sparks, stellar]));
        catalogue
            .expect_find_record()
            .returning(|_, _| Ok(Some(record(CatalogueTable::Cards, "sv7-1", None))));
        catalogue
            .expect_write_prices()
            .returning(|_, _, _| Ok(true));
        catalogue
            .expect_record_price_history()
            .returning(|_, snapshots| Ok(snapshots.len() as u64));
        let mut source = MockPriceSource::new();
        source.expect_fetch_prices().returning(|group| {
            if group == 23651 {
                Err(PriceSourceError::decode("unexpected body shape"))
            } else {
                Ok(vec![entry(Some(9), "Normal")])
            }
        });

        let report = service(source, catalogue)
            .sync_prices(request(SetScope::All, false, false))
            .await
            .expect("sync runs");
        assert_eq!(report.sets_processed, 2);
        assert_eq!(report.per_set["sv8"].errors, 1);
        assert_eq!(report.per_set["sv7"].cards_updated, 1);
        assert_eq!(report.totals.errors, 1);
    }

    #[tokio::test]
    async fn unknown_set_is_not_found() {
        let mut catalogue = MockPriceCatalogueRepository::new();
        catalogue.expect_find_priced_set().return_once(|_| Ok(None));
        let mut source = MockPriceSource::new();
        source.expect_fetch_prices().times(0);

        let err = service(source, catalogue)
            .sync_prices(request(SetScope::One("nope".to_owned()), false, false))
            .await
            .expect_err("missing set");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
