//! PostgreSQL-backed `GradingRecordRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GradingRecordRepository, GradingRecordRepositoryError};
use crate::domain::{CardId, CenteringRatios, GradingRecord, OverlayUrls, SubGrades, UserId};

use super::diesel_basic_error_mapping::{
    affected_rows, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::GradingRecordRow;
use super::pool::{DbPool, PoolError};
use super::schema::grading_records;

/// Diesel-backed implementation of the `GradingRecordRepository` port.
#[derive(Clone)]
pub struct DieselGradingRecordRepository {
    pool: DbPool,
}

impl DieselGradingRecordRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GradingRecordRepositoryError {
    map_basic_pool_error(error, GradingRecordRepositoryError::connection)
}

fn map_diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> GradingRecordRepositoryError {
    move |error| {
        map_basic_diesel_error(
            error,
            operation,
            GradingRecordRepositoryError::query,
            GradingRecordRepositoryError::connection,
        )
    }
}

fn row_to_record(row: GradingRecordRow) -> GradingRecord {
    GradingRecord {
        id: row.id,
        card_id: CardId::from_uuid(row.card_id),
        user_id: UserId::from_uuid(row.user_id),
        grades: SubGrades {
            corners: row.corners,
            edges: row.edges,
            surface: row.surface,
            centering: row.centering,
            final_grade: row.final_grade,
            condition: row.condition,
        },
        front_centering: CenteringRatios {
            left_right: row.front_centering_left_right,
            top_bottom: row.front_centering_top_bottom,
        },
        back_centering: CenteringRatios {
            left_right: row.back_centering_left_right,
            top_bottom: row.back_centering_top_bottom,
        },
        confidence: row.confidence,
        overlays: OverlayUrls {
            front_full: row.front_full_overlay_url,
            front_exact: row.front_exact_overlay_url,
            back_full: row.back_full_overlay_url,
            back_exact: row.back_exact_overlay_url,
        },
        raw_response: row.raw_response,
        graded_at: row.graded_at,
    }
}

fn record_to_row(record: &GradingRecord) -> GradingRecordRow {
    GradingRecordRow {
        id: record.id,
        card_id: *record.card_id.as_uuid(),
        user_id: *record.user_id.as_uuid(),
        corners: record.grades.corners,
        edges: record.grades.edges,
        surface: record.grades.surface,
        centering: record.grades.centering,
        final_grade: record.grades.final_grade,
        condition: record.grades.condition.clone(),
        front_centering_left_right: record.front_centering.left_right.clone(),
        front_centering_top_bottom: record.front_centering.top_bottom.clone(),
        back_centering_left_right: record.back_centering.left_right.clone(),
        back_centering_top_bottom: record.back_centering.top_bottom.clone(),
        confidence: record.confidence,
        front_full_overlay_url: record.overlays.front_full.clone(),
        front_exact_overlay_url: record.overlays.front_exact.clone(),
        back_full_overlay_url: record.overlays.back_full.clone(),
        back_exact_overlay_url: record.overlays.back_exact.clone(),
        raw_response: record.raw_response.clone(),
        graded_at: record.graded_at,
    }
}

#[async_trait]
impl GradingRecordRepository for DieselGradingRecordRepository {
    async fn find_for_card(
        &self,
        owner: &UserId,
        card_id: &CardId,
    ) -> Result<Option<GradingRecord>, GradingRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GradingRecordRow> = grading_records::table
            .filter(grading_records::card_id.eq(card_id.as_uuid()))
            .filter(grading_records::user_id.eq(owner.as_uuid()))
            .select(GradingRecordRow::as_select())
            .order_by(grading_records::graded_at.desc())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find grading record"))?;
        Ok(row.map(row_to_record))
    }

    async fn delete_for_card(
        &self,
        owner: &UserId,
        card_id: &CardId,
    ) -> Result<u64, GradingRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            grading_records::table
                .filter(grading_records::card_id.eq(card_id.as_uuid()))
                .filter(grading_records::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error("delete grading records"))?;
        Ok(affected_rows(deleted))
    }

    async fn insert(&self, record: &GradingRecord) -> Result<(), GradingRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(grading_records::table)
            .values(&record_to_row(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error("insert grading record"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn rows_and_records_carry_the_same_values() {
        let record = GradingRecord {
            id: Uuid::new_v4(),
            card_id: CardId::random(),
            user_id: UserId::random(),
            grades: SubGrades {
                corners: 8.5,
                edges: 9.0,
                surface: 9.0,
                centering: 9.5,
                final_grade: 9.0,
                condition: Some("Mint".to_owned()),
            },
            front_centering: CenteringRatios {
                left_right: Some("52/48".to_owned()),
                top_bottom: None,
            },
            back_centering: CenteringRatios::default(),
            confidence: Some(0.9),
            overlays: OverlayUrls {
                front_full: Some("https://cdn.test/front_full.jpg".to_owned()),
                ..OverlayUrls::default()
            },
            raw_response: json!({ "grades": { "final": 9.0 } }),
            graded_at: Utc
                .with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
                .single()
                .expect("valid timestamp"),
        };

        assert_eq!(row_to_record(record_to_row(&record)), record);
    }
}
