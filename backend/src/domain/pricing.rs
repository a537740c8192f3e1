//! Catalogue price synchronisation types.
//!
//! Market prices are published per TCGplayer group (one group per set) as a
//! flat list of entries, several per product (one per printing variant such
//! as "Normal" or "Holofoil"). The sync groups entries by product and writes
//! the whole variant list onto the matching catalogue record, then appends a
//! dated row per variant to the price history.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

/// Records refreshed within this window are skipped unless forced.
pub const PRICE_FRESHNESS_HOURS: i64 = 24;

/// A catalogue set linked to a TCGplayer group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedSet {
    /// Catalogue set id, e.g. `sv10`.
    pub id: String,
    /// Set name.
    pub name: String,
    /// TCGplayer group id.
    pub group_id: i64,
}

/// One price entry from the price feed.
///
/// `payload` is the entry object exactly as published; it is stored
/// verbatim in the catalogue's `price_data` column.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEntry {
    /// TCGplayer product id, when present.
    pub product_id: Option<i64>,
    /// Entry as published.
    pub payload: Value,
}

/// Catalogue table holding a priced record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatalogueTable {
    /// Sealed products (`pokemon_products`).
    Products,
    /// Single cards (`pokemon_cards`).
    Cards,
}

impl CatalogueTable {
    /// Database table name.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Products => "pokemon_products",
            Self::Cards => "pokemon_cards",
        }
    }
}

impl fmt::Display for CatalogueTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A catalogue row matched to a TCGplayer product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueRecord {
    /// Table the row lives in.
    pub table: CatalogueTable,
    /// Row id.
    pub id: String,
    /// Last time prices were written.
    pub price_last_updated: Option<DateTime<Utc>>,
}

impl CatalogueRecord {
    /// Whether prices were written within the freshness window before `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let cutoff = now - Duration::hours(PRICE_FRESHNESS_HOURS);
        self.price_last_updated
            .is_some_and(|updated| updated > cutoff)
    }
}

/// Which sets to synchronise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetScope {
    /// Every set with a TCGplayer group id.
    All,
    /// A single set by id.
    One(String),
}

/// Options for one synchronisation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSyncRequest {
    /// Sets to process.
    pub scope: SetScope,
    /// Read everything, write nothing.
    pub dry_run: bool,
    /// Ignore the freshness window.
    pub force: bool,
}

/// Counters for one set or a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceSyncStats {
    /// Cards whose prices were written.
    pub cards_updated: u64,
    /// Products whose prices were written.
    pub products_updated: u64,
    /// Cards skipped as recently updated.
    pub cards_skipped: u64,
    /// Products skipped as recently updated.
    pub products_skipped: u64,
    /// Product ids matching no catalogue record.
    pub unknown_products: u64,
    /// Price history rows recorded for the day.
    pub history_rows: u64,
    /// Failed fetches, lookups or writes.
    pub errors: u64,
}

impl PriceSyncStats {
    /// Count an update against the right table.
    pub fn record_updated(&mut self, table: CatalogueTable) {
        match table {
            CatalogueTable::Cards => self.cards_updated += 1,
            CatalogueTable::Products => self.products_updated += 1,
        }
    }

    /// Count a freshness skip against the right table.
    pub fn record_skipped(&mut self, table: CatalogueTable) {
        match table {
            CatalogueTable::Cards => self.cards_skipped += 1,
            CatalogueTable::Products => self.products_skipped += 1,
        }
    }
}

impl AddAssign for PriceSyncStats {
    fn add_assign(&mut self, rhs: Self) {
        self.cards_updated += rhs.cards_updated;
        self.products_updated += rhs.products_updated;
        self.cards_skipped += rhs.cards_skipped;
        self.products_skipped += rhs.products_skipped;
        self.unknown_products += rhs.unknown_products;
        self.history_rows += rhs.history_rows;
        self.errors += rhs.errors;
    }
}

/// Product id that matched nothing, with its entries for investigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownProduct {
    /// TCGplayer product id.
    pub product_id: i64,
    /// Entries published for it.
    pub variants: Vec<Value>,
}

/// Unknown products for one set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnknownSetProducts {
    /// Set name.
    pub set_name: String,
    /// Unmatched products.
    pub product_ids: Vec<UnknownProduct>,
}

/// Outcome of a synchronisation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSyncReport {
    /// Sets attempted.
    pub sets_processed: u64,
    /// Totals across all sets.
    pub totals: PriceSyncStats,
    /// Per-set counters keyed by set id.
    pub per_set: BTreeMap<String, PriceSyncStats>,
    /// Unmatched product ids keyed by set id.
    pub unknown: BTreeMap<String, UnknownSetProducts>,
    /// Whether writes were suppressed.
    pub dry_run: bool,
}

/// Group entries by product id, keeping feed order within each product.
/// Entries without a product id are dropped.
#[must_use]
pub fn group_by_product(entries: Vec<PriceEntry>) -> BTreeMap<i64, Vec<Value>> {
    let mut grouped: BTreeMap<i64, Vec<Value>> = BTreeMap::new();
    for entry in entries {
        if let Some(product_id) = entry.product_id {
            grouped.entry(product_id).or_default().push(entry.payload);
        }
    }
    grouped
}

/// Read a price that the feed may publish as a number or a numeric string.
fn price_field(entry: &Value, key: &str) -> Option<f64> {
    match entry.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn sub_type(entry: &Value) -> String {
    entry
        .get("subTypeName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Prices of one printing variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantPrice {
    /// Variant name such as `Holofoil`; empty when the feed omits it.
    pub sub_type: String,
    /// Market price.
    pub market_price: Option<f64>,
    /// Lowest listing.
    pub low_price: Option<f64>,
    /// Median listing.
    pub mid_price: Option<f64>,
    /// Highest listing.
    pub high_price: Option<f64>,
}

impl VariantPrice {
    /// Lift the prices out of a feed entry.
    #[must_use]
    pub fn from_entry(entry: &Value) -> Self {
        Self {
            sub_type: sub_type(entry),
            market_price: price_field(entry, "marketPrice"),
            low_price: price_field(entry, "lowPrice"),
            mid_price: price_field(entry, "midPrice"),
            high_price: price_field(entry, "highPrice"),
        }
    }
}

/// One day's prices for one variant of a catalogue record.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    /// TCGplayer product id.
    pub product_id: i64,
    /// Variant prices.
    pub prices: VariantPrice,
    /// Day the prices were observed.
    pub price_date: NaiveDate,
}

/// History rows for a product's entries on `price_date`.
///
/// There is one row per variant; when the feed repeats a variant the last
/// entry wins, matching the daily uniqueness of the history table.
#[must_use]
pub fn daily_snapshots(
    product_id: i64,
    entries: &[Value],
    price_date: NaiveDate,
) -> Vec<PriceSnapshot> {
    let mut by_variant: BTreeMap<String, VariantPrice> = BTreeMap::new();
    for entry in entries {
        let prices = VariantPrice::from_entry(entry);
        by_variant.insert(prices.sub_type.clone(), prices);
    }
    by_variant
        .into_values()
        .map(|prices| PriceSnapshot {
            product_id,
            prices,
            price_date,
        })
        .collect()
}

/// Price coverage of one catalogue table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TablePriceCoverage {
    /// Rows in the table.
    pub total: u64,
    /// Rows linked to a TCGplayer product.
    pub with_tcgplayer_id: u64,
    /// Rows carrying price data.
    pub with_prices: u64,
    /// Rows whose prices were written within the freshness window.
    pub updated_recently: u64,
}

impl TablePriceCoverage {
    /// `count` as a percentage of `total`, zero for an empty table.
    #[must_use]
    pub fn percent(&self, count: u64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[expect(clippy::cast_precision_loss, reason = "catalogue row counts are small")]
        let ratio = count as f64 / self.total as f64;
        ratio * 100.0
    }
}

/// Price coverage across the catalogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CataloguePriceCoverage {
    /// Single cards.
    pub cards: TablePriceCoverage,
    /// Sealed products.
    pub products: TablePriceCoverage,
}

/// Which priced records to sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSampleRequest {
    /// Restrict to one set.
    pub set_id: Option<String>,
    /// Maximum records per table.
    pub limit: u32,
}

/// A priced catalogue record, for eyeballing stored price data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedRecordSample {
    /// Table the row lives in.
    #[serde(skip)]
    pub table: CatalogueTable,
    /// Row id.
    pub id: String,
    /// Card or product name.
    pub name: String,
    /// Last time prices were written.
    pub price_last_updated: Option<DateTime<Utc>>,
    /// Stored variants in feed order.
    pub variants: Vec<VariantPrice>,
}
