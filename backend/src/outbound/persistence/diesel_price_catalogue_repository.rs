//! PostgreSQL-backed `PriceCatalogueRepository` implementation.
//!
//! Product ids are resolved against sealed products first and single cards
//! second, always within the set the price group belongs to. History rows
//! are upserted on `(tcgplayer_product_id, sub_type_name, price_date)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use serde_json::Value;

use crate::domain::ports::{PriceCatalogueRepository, PriceCatalogueRepositoryError};
use crate::domain::{
    CataloguePriceCoverage, CatalogueRecord, CatalogueTable, PriceSampleRequest, PriceSnapshot,
    PricedRecordSample, PricedSet, TablePriceCoverage, VariantPrice,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CataloguePriceRow, NewPriceHistoryRow, PricedSetRow, ProductPriceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{pokemon_cards, pokemon_products, pokemon_sets, product_price_history};

/// `id, name, price_data, price_last_updated` of a priced row.
type PricedRow = (String, String, Option<Value>, Option<DateTime<Utc>>);

/// Four counts for one catalogue table. Both tables share the column names
/// the counts filter on.
macro_rules! table_coverage {
    ($conn:expr, $table:ident, $since:expr) => {{
        let total: i64 = $table::table
            .count()
            .get_result($conn)
            .await
            .map_err(map_diesel_error("count catalogue rows"))?;
        let with_tcgplayer_id: i64 = $table::table
            .filter($table::tcgplayer_product_id.is_not_null())
            .count()
            .get_result($conn)
            .await
            .map_err(map_diesel_error("count linked catalogue rows"))?;
        let with_prices: i64 = $table::table
            .filter($table::price_data.is_not_null())
            .count()
            .get_result($conn)
            .await
            .map_err(map_diesel_error("count priced catalogue rows"))?;
        let updated_recently: i64 = $table::table
            .filter($table::price_last_updated.ge($since))
            .count()
            .get_result($conn)
            .await
            .map_err(map_diesel_error("count recently priced catalogue rows"))?;
        TablePriceCoverage {
            total: to_count(total),
            with_tcgplayer_id: to_count(with_tcgplayer_id),
            with_prices: to_count(with_prices),
            updated_recently: to_count(updated_recently),
        }
    }};
}

/// Diesel-backed implementation of the `PriceCatalogueRepository` port.
#[derive(Clone)]
pub struct DieselPriceCatalogueRepository {
    pool: DbPool,
}

impl DieselPriceCatalogueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PriceCatalogueRepositoryError {
    map_basic_pool_error(error, PriceCatalogueRepositoryError::connection)
}

fn map_diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> PriceCatalogueRepositoryError {
    move |error| {
        map_basic_diesel_error(
            error,
            operation,
            PriceCatalogueRepositoryError::query,
            PriceCatalogueRepositoryError::connection,
        )
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

fn row_to_sample(table: CatalogueTable, row: PricedRow) -> PricedRecordSample {
    let (id, name, price_data, price_last_updated) = row;
    let variants = match price_data {
        Some(Value::Array(entries)) => entries.iter().map(VariantPrice::from_entry).collect(),
        _ => Vec::new(),
    };
    PricedRecordSample {
        table,
        id,
        name,
        price_last_updated,
        variants,
    }
}

fn history_rows<'a>(
    record: &'a CatalogueRecord,
    snapshots: &'a [PriceSnapshot],
) -> Vec<NewPriceHistoryRow<'a>> {
    snapshots
        .iter()
        .map(|snapshot| NewPriceHistoryRow {
            tcgplayer_product_id: snapshot.product_id,
            catalogue_table: record.table.table_name(),
            catalogue_id: &record.id,
            sub_type_name: &snapshot.prices.sub_type,
            market_price: snapshot.prices.market_price,
            low_price: snapshot.prices.low_price,
            mid_price: snapshot.prices.mid_price,
            high_price: snapshot.prices.high_price,
            price_date: snapshot.price_date,
        })
        .collect()
}

fn row_to_set(row: PricedSetRow) -> Option<PricedSet> {
    Some(PricedSet {
        group_id: row.tcgplayer_group_id?,
        id: row.id,
        name: row.name,
    })
}

#[async_trait]
impl PriceCatalogueRepository for DieselPriceCatalogueRepository {
    async fn list_priced_sets(&self) -> Result<Vec<PricedSet>, PriceCatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PricedSetRow> = pokemon_sets::table
            .filter(pokemon_sets::tcgplayer_group_id.is_not_null())
            .select(PricedSetRow::as_select())
            .order_by(pokemon_sets::name)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list priced sets"))?;
        Ok(rows.into_iter().filter_map(row_to_set).collect())
    }

    async fn find_priced_set(
        &self,
        set_id: &str,
    ) -> Result<Option<PricedSet>, PriceCatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PricedSetRow> = pokemon_sets::table
            .filter(pokemon_sets::id.eq(set_id))
            .select(PricedSetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find priced set"))?;
        Ok(row.and_then(row_to_set))
    }

    async fn find_record(
        &self,
        product_id: i64,
        set_id: &str,
    ) -> Result<Option<CatalogueRecord>, PriceCatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let product: Option<ProductPriceRow> = pokemon_products::table
            .filter(pokemon_products::tcgplayer_product_id.eq(product_id))
            .filter(pokemon_products::pokemon_set_id.eq(set_id))
            .select(ProductPriceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find catalogue product"))?;
        if let Some(row) = product {
            return Ok(Some(CatalogueRecord {
                table: CatalogueTable::Products,
                id: row.id,
                price_last_updated: row.price_last_updated,
            }));
        }

        let card: Option<CataloguePriceRow> = pokemon_cards::table
            .filter(pokemon_cards::tcgplayer_product_id.eq(product_id))
            .filter(pokemon_cards::set_id.eq(set_id))
            .select(CataloguePriceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find catalogue card"))?;
        Ok(card.map(|row| CatalogueRecord {
            table: CatalogueTable::Cards,
            id: row.id,
            price_last_updated: row.price_last_updated,
        }))
    }

    async fn write_prices(
        &self,
        record: &CatalogueRecord,
        price_data: &[Value],
        updated_at: DateTime<Utc>,
    ) -> Result<bool, PriceCatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let payload = Value::Array(price_data.to_vec());
        let updated = match record.table {
            CatalogueTable::Products => {
                diesel::update(pokemon_products::table.find(&record.id))
                    .set((
                        pokemon_products::price_data.eq(&payload),
                        pokemon_products::price_last_updated.eq(updated_at),
                        pokemon_products::updated_at.eq(updated_at),
                    ))
                    .execute(&mut conn)
                    .await
            }
            CatalogueTable::Cards => {
                diesel::update(pokemon_cards::table.find(&record.id))
                    .set((
                        pokemon_cards::price_data.eq(&payload),
                        pokemon_cards::price_last_updated.eq(updated_at),
                        pokemon_cards::updated_at.eq(updated_at),
                    ))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error("write catalogue prices"))?;
        Ok(updated > 0)
    }

    async fn record_price_history(
        &self,
        record: &CatalogueRecord,
        snapshots: &[PriceSnapshot],
    ) -> Result<u64, PriceCatalogueRepositoryError> {
        let rows = history_rows(record, snapshots);
        if rows.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let written = diesel::insert_into(product_price_history::table)
            .values(&rows)
            .on_conflict((
                product_price_history::tcgplayer_product_id,
                product_price_history::sub_type_name,
                product_price_history::price_date,
            ))
            .do_update()
            .set((
                product_price_history::catalogue_table
                    .eq(excluded(product_price_history::catalogue_table)),
                product_price_history::catalogue_id
                    .eq(excluded(product_price_history::catalogue_id)),
                product_price_history::market_price
                    .eq(excluded(product_price_history::market_price)),
                product_price_history::low_price.eq(excluded(product_price_history::low_price)),
                product_price_history::mid_price.eq(excluded(product_price_history::mid_price)),
                product_price_history::high_price
                    .eq(excluded(product_price_history::high_price)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("record price history"))?;
        Ok(written as u64)
    }

    async fn price_coverage(
        &self,
        updated_since: DateTime<Utc>,
    ) -> Result<CataloguePriceCoverage, PriceCatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let cards = table_coverage!(&mut conn, pokemon_cards, updated_since);
        let products = table_coverage!(&mut conn, pokemon_products, updated_since);
        Ok(CataloguePriceCoverage { cards, products })
    }

    async fn sample_priced_records(
        &self,
        request: &PriceSampleRequest,
    ) -> Result<Vec<PricedRecordSample>, PriceCatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::from(request.limit);

        let mut cards_query = pokemon_cards::table
            .filter(pokemon_cards::price_data.is_not_null())
            .select((
                pokemon_cards::id,
                pokemon_cards::name,
                pokemon_cards::price_data,
                pokemon_cards::price_last_updated,
            ))
            .order_by(pokemon_cards::id)
            .limit(limit)
            .into_boxed();
        if let Some(set_id) = request.set_id.as_deref() {
            cards_query = cards_query.filter(pokemon_cards::set_id.eq(set_id));
        }
        let cards: Vec<PricedRow> = cards_query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("sample priced cards"))?;

        let mut products_query = pokemon_products::table
            .filter(pokemon_products::price_data.is_not_null())
            .select((
                pokemon_products::id,
                pokemon_products::name,
                pokemon_products::price_data,
                pokemon_products::price_last_updated,
            ))
            .order_by(pokemon_products::id)
            .limit(limit)
            .into_boxed();
        if let Some(set_id) = request.set_id.as_deref() {
            products_query = products_query.filter(pokemon_products::pokemon_set_id.eq(set_id));
        }
        let products: Vec<PricedRow> = products_query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("sample priced products"))?;

        Ok(cards
            .into_iter()
            .map(|row| row_to_sample(CatalogueTable::Cards, row))
            .chain(
                products
                    .into_iter()
                    .map(|row| row_to_sample(CatalogueTable::Products, row)),
            )
            .collect())
    }
}
