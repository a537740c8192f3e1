//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Cards in user collections.
    ///
    /// Photo paths point into object storage; overlay URLs and the grade
    /// summary mirror the latest grading record.
    cards (id) {
        id -> Uuid,
        /// Owning account.
        user_id -> Uuid,
        name -> Varchar,
        set_name -> Nullable<Varchar>,
        card_number -> Nullable<Varchar>,
        catalogue_card_id -> Nullable<Varchar>,
        front_image_path -> Nullable<Text>,
        back_image_path -> Nullable<Text>,
        front_full_overlay_url -> Nullable<Text>,
        front_exact_overlay_url -> Nullable<Text>,
        back_full_overlay_url -> Nullable<Text>,
        back_exact_overlay_url -> Nullable<Text>,
        final_grade -> Nullable<Float8>,
        grade_confidence -> Nullable<Float8>,
        graded_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Completed grading attempts. At most one row per card.
    grading_records (id) {
        id -> Uuid,
        /// Graded card; rows cascade with the card.
        card_id -> Uuid,
        user_id -> Uuid,
        corners -> Float8,
        edges -> Float8,
        surface -> Float8,
        centering -> Float8,
        final_grade -> Float8,
        condition -> Nullable<Text>,
        front_centering_left_right -> Nullable<Text>,
        front_centering_top_bottom -> Nullable<Text>,
        back_centering_left_right -> Nullable<Text>,
        back_centering_top_bottom -> Nullable<Text>,
        confidence -> Nullable<Float8>,
        front_full_overlay_url -> Nullable<Text>,
        front_exact_overlay_url -> Nullable<Text>,
        back_full_overlay_url -> Nullable<Text>,
        back_exact_overlay_url -> Nullable<Text>,
        /// Grading service response body, verbatim.
        raw_response -> Jsonb,
        graded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Credit balances. Mutated only through `deduct_user_credit` and
    /// `refund_user_credit`.
    user_credits (user_id) {
        user_id -> Uuid,
        credits -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ledger movements written by the credit procedures.
    credit_transactions (id) {
        id -> Int8,
        user_id -> Uuid,
        delta -> Int4,
        operation -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Public profiles keyed by account.
    profiles (user_id) {
        user_id -> Uuid,
        username -> Varchar,
        display_name -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pre-launch signups.
    waitlist (email) {
        email -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue sets.
    pokemon_sets (id) {
        id -> Text,
        name -> Text,
        /// TCGplayer group id; sets without one are not priced.
        tcgplayer_group_id -> Nullable<Int8>,
        release_date -> Nullable<Date>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sealed catalogue products.
    pokemon_products (id) {
        id -> Text,
        pokemon_set_id -> Text,
        name -> Text,
        tcgplayer_product_id -> Nullable<Int8>,
        price_data -> Nullable<Jsonb>,
        price_last_updated -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single catalogue cards.
    pokemon_cards (id) {
        id -> Text,
        set_id -> Text,
        name -> Text,
        number -> Nullable<Text>,
        tcgplayer_product_id -> Nullable<Int8>,
        price_data -> Nullable<Jsonb>,
        price_last_updated -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Daily price observations, one row per product, variant and day.
    product_price_history (id) {
        id -> Int8,
        tcgplayer_product_id -> Int8,
        /// `pokemon_products` or `pokemon_cards`.
        catalogue_table -> Text,
        catalogue_id -> Text,
        /// Printing variant; empty when the feed omits it.
        sub_type_name -> Text,
        market_price -> Nullable<Float8>,
        low_price -> Nullable<Float8>,
        mid_price -> Nullable<Float8>,
        high_price -> Nullable<Float8>,
        price_date -> Date,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(grading_records -> cards (card_id));
diesel::joinable!(pokemon_products -> pokemon_sets (pokemon_set_id));
diesel::joinable!(pokemon_cards -> pokemon_sets (set_id));

diesel::allow_tables_to_appear_in_same_query!(
    cards,
    grading_records,
    user_credits,
    credit_transactions,
    profiles,
    waitlist,
    pokemon_sets,
    pokemon_products,
    pokemon_cards,
    product_price_history,
);
