//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Bool, Int4, Nullable, Text};
use uuid::Uuid;

use super::schema::{
    cards, grading_records, pokemon_cards, pokemon_products, pokemon_sets, product_price_history,
};

// ---------------------------------------------------------------------------
// Collection models
// ---------------------------------------------------------------------------

/// Row struct for reading from the cards table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CardRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub catalogue_card_id: Option<String>,
    pub front_image_path: Option<String>,
    pub back_image_path: Option<String>,
    pub front_full_overlay_url: Option<String>,
    pub front_exact_overlay_url: Option<String>,
    pub back_full_overlay_url: Option<String>,
    pub back_exact_overlay_url: Option<String>,
    pub final_grade: Option<f64>,
    pub grade_confidence: Option<f64>,
    pub graded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating card records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cards)]
pub(crate) struct NewCardRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub set_name: Option<&'a str>,
    pub card_number: Option<&'a str>,
    pub catalogue_card_id: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset mirroring a grading onto its card.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cards)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CardGradeUpdate<'a> {
    pub front_full_overlay_url: Option<&'a str>,
    pub front_exact_overlay_url: Option<&'a str>,
    pub back_full_overlay_url: Option<&'a str>,
    pub back_exact_overlay_url: Option<&'a str>,
    pub final_grade: Option<f64>,
    pub grade_confidence: Option<f64>,
    pub graded_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading and writing grading records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = grading_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GradingRecordRow {
    pub id: Uuid,
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub corners: f64,
    pub edges: f64,
    pub surface: f64,
    pub centering: f64,
    pub final_grade: f64,
    pub condition: Option<String>,
    pub front_centering_left_right: Option<String>,
    pub front_centering_top_bottom: Option<String>,
    pub back_centering_left_right: Option<String>,
    pub back_centering_top_bottom: Option<String>,
    pub confidence: Option<f64>,
    pub front_full_overlay_url: Option<String>,
    pub front_exact_overlay_url: Option<String>,
    pub back_full_overlay_url: Option<String>,
    pub back_exact_overlay_url: Option<String>,
    pub raw_response: serde_json::Value,
    pub graded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Stored procedure results
// ---------------------------------------------------------------------------

/// Result of `deduct_user_credit` / `refund_user_credit`.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct CreditBalanceResult {
    #[diesel(sql_type = Nullable<Int4>)]
    pub credits: Option<i32>,
}

/// Result of `check_username_available`.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct UsernameAvailableResult {
    #[diesel(sql_type = Bool)]
    pub available: bool,
}

/// Result of `create_user_profile`.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct CreateProfileResult {
    #[diesel(sql_type = Text)]
    pub outcome: String,
}

// ---------------------------------------------------------------------------
// Catalogue models
// ---------------------------------------------------------------------------

/// Row struct for reading priced sets.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pokemon_sets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PricedSetRow {
    pub id: String,
    pub name: String,
    pub tcgplayer_group_id: Option<i64>,
}

/// Price freshness of a sealed product.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pokemon_products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductPriceRow {
    pub id: String,
    pub price_last_updated: Option<DateTime<Utc>>,
}

/// Price freshness of a single card.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pokemon_cards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CataloguePriceRow {
    pub id: String,
    pub price_last_updated: Option<DateTime<Utc>>,
}

/// Row struct for upserting one day's price for one variant.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = product_price_history)]
pub(crate) struct NewPriceHistoryRow<'a> {
    pub tcgplayer_product_id: i64,
    pub catalogue_table: &'a str,
    pub catalogue_id: &'a str,
    pub sub_type_name: &'a str,
    pub market_price: Option<f64>,
    pub low_price: Option<f64>,
    pub mid_price: Option<f64>,
    pub high_price: Option<f64>,
    pub price_date: NaiveDate,
}
