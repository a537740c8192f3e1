//! PostgreSQL-backed `CardRepository` implementation using Diesel ORM.
//!
//! Every query filters on both the card id and the owning user id, so a card
//! belonging to someone else is indistinguishable from a missing one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CardRepository, CardRepositoryError};
use crate::domain::{
    Card, CardGradeSummary, CardId, CardSide, NewCard, OverlayUrls, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CardGradeUpdate, CardRow, NewCardRow};
use super::pool::{DbPool, PoolError};
use super::schema::cards;

/// Diesel-backed implementation of the `CardRepository` port.
#[derive(Clone)]
pub struct DieselCardRepository {
    pool: DbPool,
}

impl DieselCardRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CardRepositoryError {
    map_basic_pool_error(error, CardRepositoryError::connection)
}

fn map_diesel_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> CardRepositoryError {
    move |error| {
        map_basic_diesel_error(
            error,
            operation,
            CardRepositoryError::query,
            CardRepositoryError::connection,
        )
    }
}

/// Convert a database row to a domain card.
fn row_to_card(row: CardRow) -> Card {
    let grade = match (row.final_grade, row.graded_at) {
        (Some(final_grade), Some(graded_at)) => Some(CardGradeSummary {
            final_grade,
            confidence: row.grade_confidence,
            graded_at,
        }),
        _ => None,
    };
    Card {
        id: CardId::from_uuid(row.id),
        owner: UserId::from_uuid(row.user_id),
        name: row.name,
        set_name: row.set_name,
        card_number: row.card_number,
        catalogue_card_id: row.catalogue_card_id,
        front_image_path: row.front_image_path,
        back_image_path: row.back_image_path,
        overlays: OverlayUrls {
            front_full: row.front_full_overlay_url,
            front_exact: row.front_exact_overlay_url,
            back_full: row.back_full_overlay_url,
            back_exact: row.back_exact_overlay_url,
        },
        grade,
        created_at: row.created_at,
    }
}

#[async_trait]
impl CardRepository for DieselCardRepository {
    async fn create(
        &self,
        owner: &UserId,
        card: &NewCard,
        created_at: DateTime<Utc>,
    ) -> Result<Card, CardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewCardRow {
            id: *CardId::random().as_uuid(),
            user_id: *owner.as_uuid(),
            name: card.name(),
            set_name: card.set_name(),
            card_number: card.card_number(),
            catalogue_card_id: card.catalogue_card_id(),
            created_at,
            updated_at: created_at,
        };

        let row: CardRow = diesel::insert_into(cards::table)
            .values(&new_row)
            .returning(CardRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error("insert card"))?;
        Ok(row_to_card(row))
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Card>, CardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CardRow> = cards::table
            .filter(cards::user_id.eq(owner.as_uuid()))
            .select(CardRow::as_select())
            .order_by((cards::created_at.desc(), cards::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list cards"))?;
        Ok(rows.into_iter().map(row_to_card).collect())
    }

    async fn find_owned(
        &self,
        owner: &UserId,
        card_id: &CardId,
    ) -> Result<Option<Card>, CardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CardRow> = cards::table
            .filter(cards::id.eq(card_id.as_uuid()))
            .filter(cards::user_id.eq(owner.as_uuid()))
            .select(CardRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find card"))?;
        Ok(row.map(row_to_card))
    }

    async fn set_image_path(
        &self,
        owner: &UserId,
        card_id: &CardId,
        side: CardSide,
        path: &str,
    ) -> Result<bool, CardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = cards::table
            .filter(cards::id.eq(card_id.as_uuid()))
            .filter(cards::user_id.eq(owner.as_uuid()));
        let now = Utc::now();
        let updated = match side {
            CardSide::Front => {
                diesel::update(target)
                    .set((cards::front_image_path.eq(path), cards::updated_at.eq(now)))
                    .execute(&mut conn)
                    .await
            }
            CardSide::Back => {
                diesel::update(target)
                    .set((cards::back_image_path.eq(path), cards::updated_at.eq(now)))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error("set card image"))?;
        Ok(updated > 0)
    }

    async fn record_grade(
        &self,
        owner: &UserId,
        card_id: &CardId,
        summary: &CardGradeSummary,
        overlays: &OverlayUrls,
    ) -> Result<(), CardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = CardGradeUpdate {
            front_full_overlay_url: overlays.front_full.as_deref(),
            front_exact_overlay_url: overlays.front_exact.as_deref(),
            back_full_overlay_url: overlays.back_full.as_deref(),
            back_exact_overlay_url: overlays.back_exact.as_deref(),
            final_grade: Some(summary.final_grade),
            grade_confidence: summary.confidence,
            graded_at: Some(summary.graded_at),
            updated_at: summary.graded_at,
        };
        diesel::update(
            cards::table
                .filter(cards::id.eq(card_id.as_uuid()))
                .filter(cards::user_id.eq(owner.as_uuid())),
        )
        .set(&changeset)
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error("record card grade"))
    }

    async fn delete_owned(
        &self,
        owner: &UserId,
        card_id: &CardId,
    ) -> Result<bool, CardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            cards::table
                .filter(cards::id.eq(card_id.as_uuid()))
                .filter(cards::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error("delete card"))?;
        Ok(deleted > 0)
    }
}
