//! Condition grading results.
//!
//! The external grading service scores each card on four sub-grades plus a
//! final grade, all on a 0–10 scale, and reports centering ratios per face.
//! It also returns annotated overlay images; those are copied into our own
//! storage and referenced through [`OverlayUrls`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{CardId, UserId};

/// Upper bound of the grading scale.
pub const GRADE_MAX: f64 = 10.0;

/// Reasons a grading payload cannot be turned into [`SubGrades`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradeValidationError {
    /// A required sub-grade was absent.
    #[error("grading response is missing '{0}'")]
    Missing(&'static str),
    /// A sub-grade was not a finite number within 0–10.
    #[error("grading response field '{0}' is out of range")]
    OutOfRange(&'static str),
}

fn checked_grade(field: &'static str, value: Option<f64>) -> Result<f64, GradeValidationError> {
    let grade = value.ok_or(GradeValidationError::Missing(field))?;
    if grade.is_finite() && (0.0..=GRADE_MAX).contains(&grade) {
        Ok(grade)
    } else {
        Err(GradeValidationError::OutOfRange(field))
    }
}

/// Validated sub-grades for one grading attempt.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SubGrades {
    /// Corner wear.
    pub corners: f64,
    /// Edge wear.
    pub edges: f64,
    /// Surface condition.
    pub surface: f64,
    /// Print centering.
    pub centering: f64,
    /// Overall grade.
    #[serde(rename = "final")]
    pub final_grade: f64,
    /// Provider's condition label, e.g. "Near Mint".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Raw sub-grade values as read from a provider payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSubGrades {
    /// Corner wear.
    pub corners: Option<f64>,
    /// Edge wear.
    pub edges: Option<f64>,
    /// Surface condition.
    pub surface: Option<f64>,
    /// Print centering.
    pub centering: Option<f64>,
    /// Overall grade.
    pub final_grade: Option<f64>,
    /// Condition label.
    pub condition: Option<String>,
}

impl SubGrades {
    /// Validate that every required grade is present and on the 0–10 scale.
    ///
    /// # Examples
    /// ```
    /// use tcg_backend::domain::{RawSubGrades, SubGrades};
    ///
    /// let grades = SubGrades::try_from_raw(RawSubGrades {
    ///     corners: Some(8.5),
    ///     edges: Some(9.0),
    ///     surface: Some(9.0),
    ///     centering: Some(9.5),
    ///     final_grade: Some(9.0),
    ///     condition: None,
    /// })
    /// .expect("valid grades");
    /// assert_eq!(grades.final_grade, 9.0);
    /// ```
    pub fn try_from_raw(raw: RawSubGrades) -> Result<Self, GradeValidationError> {
        Ok(Self {
            corners: checked_grade("corners", raw.corners)?,
            edges: checked_grade("edges", raw.edges)?,
            surface: checked_grade("surface", raw.surface)?,
            centering: checked_grade("centering", raw.centering)?,
            final_grade: checked_grade("final", raw.final_grade)?,
            condition: raw.condition.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// Centering ratios for one face, e.g. `"55/45"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CenteringRatios {
    /// Left/right split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_right: Option<String>,
    /// Top/bottom split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_bottom: Option<String>,
}

/// Annotated overlay images produced by the grading service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Whole-photo overlay of the front.
    FrontFull,
    /// Cropped card overlay of the front.
    FrontExact,
    /// Whole-photo overlay of the back.
    BackFull,
    /// Cropped card overlay of the back.
    BackExact,
}

impl OverlayKind {
    /// Every overlay kind, in storage order.
    pub const ALL: [Self; 4] = [
        Self::FrontFull,
        Self::FrontExact,
        Self::BackFull,
        Self::BackExact,
    ];

    /// File stem used when storing the overlay.
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::FrontFull => "front_full",
            Self::FrontExact => "front_exact",
            Self::BackFull => "back_full",
            Self::BackExact => "back_exact",
        }
    }
}

/// One URL slot per [`OverlayKind`]. `None` means unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct OverlayUrls {
    /// Front, whole photo.
    pub front_full: Option<String>,
    /// Front, cropped card.
    pub front_exact: Option<String>,
    /// Back, whole photo.
    pub back_full: Option<String>,
    /// Back, cropped card.
    pub back_exact: Option<String>,
}

impl OverlayUrls {
    /// URL stored for `kind`.
    #[must_use]
    pub fn get(&self, kind: OverlayKind) -> Option<&str> {
        match kind {
            OverlayKind::FrontFull => self.front_full.as_deref(),
            OverlayKind::FrontExact => self.front_exact.as_deref(),
            OverlayKind::BackFull => self.back_full.as_deref(),
            OverlayKind::BackExact => self.back_exact.as_deref(),
        }
    }

    /// Replace the URL for `kind`.
    pub fn set(&mut self, kind: OverlayKind, url: Option<String>) {
        let slot = match kind {
            OverlayKind::FrontFull => &mut self.front_full,
            OverlayKind::FrontExact => &mut self.front_exact,
            OverlayKind::BackFull => &mut self.back_full,
            OverlayKind::BackExact => &mut self.back_exact,
        };
        *slot = url;
    }
}

/// Validated outcome of one call to the grading service.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingReport {
    /// Sub-grades.
    pub grades: SubGrades,
    /// Front centering ratios.
    pub front_centering: CenteringRatios,
    /// Back centering ratios.
    pub back_centering: CenteringRatios,
    /// Provider confidence in 0–1, when reported.
    pub confidence: Option<f64>,
    /// Provider-hosted overlay URLs, before copying into our storage.
    pub overlay_sources: OverlayUrls,
    /// Response body exactly as received.
    pub raw_response: Value,
}

/// Persisted grading record. At most one exists per card.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GradingRecord {
    /// Record identifier.
    #[schema(value_type = String)]
    pub id: Uuid,
    /// Graded card.
    #[schema(value_type = String)]
    pub card_id: CardId,
    /// Owning account.
    #[schema(value_type = String)]
    pub user_id: UserId,
    /// Sub-grades.
    pub grades: SubGrades,
    /// Front centering ratios.
    pub front_centering: CenteringRatios,
    /// Back centering ratios.
    pub back_centering: CenteringRatios,
    /// Provider confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Overlay URLs in our storage; `null` where storing failed.
    pub overlays: OverlayUrls,
    /// Response body from the grading service.
    #[serde(skip)]
    pub raw_response: Value,
    /// Completion time.
    pub graded_at: DateTime<Utc>,
}

impl GradingRecord {
    /// Build the record for a validated report.
    #[must_use]
    pub fn from_report(
        card_id: CardId,
        user_id: UserId,
        report: GradingReport,
        overlays: OverlayUrls,
        graded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            user_id,
            grades: report.grades,
            front_centering: report.front_centering,
            back_centering: report.back_centering,
            confidence: report.confidence,
            overlays,
            raw_response: report.raw_response,
            graded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn raw() -> RawSubGrades {
        RawSubGrades {
            corners: Some(8.5),
            edges: Some(9.0),
            surface: Some(9.0),
            centering: Some(9.5),
            final_grade: Some(9.0),
            condition: Some("Mint".to_owned()),
        }
    }

    #[rstest]
    fn accepts_complete_grades() {
        let grades = SubGrades::try_from_raw(raw()).expect("valid");
        assert_eq!(grades.corners, 8.5);
        assert_eq!(grades.condition.as_deref(), Some("Mint"));
    }

    #[rstest]
    fn reports_first_missing_field() {
        let mut input = raw();
        input.surface = None;
        assert_eq!(
            SubGrades::try_from_raw(input),
            Err(GradeValidationError::Missing("surface"))
        );
    }

    #[rstest]
    #[case(-0.5)]
    #[case(10.5)]
    #[case(f64::NAN)]
    fn rejects_out_of_range_final_grade(#[case] value: f64) {
        let mut input = raw();
        input.final_grade = Some(value);
        assert_eq!(
            SubGrades::try_from_raw(input),
            Err(GradeValidationError::OutOfRange("final"))
        );
    }

    #[rstest]
    fn overlay_slots_are_independent() {
        let mut urls = OverlayUrls::default();
        urls.set(OverlayKind::BackExact, Some("https://cdn/x.png".to_owned()));
        assert_eq!(urls.get(OverlayKind::BackExact), Some("https://cdn/x.png"));
        assert_eq!(urls.get(OverlayKind::FrontFull), None);
    }

    #[rstest]
    fn sub_grades_serialise_final_field_name() {
        let grades = SubGrades::try_from_raw(raw()).expect("valid");
        let value = serde_json::to_value(grades).expect("serialise");
        assert_eq!(value.get("final"), Some(&serde_json::json!(9.0)));
    }
}
