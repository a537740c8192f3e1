//! Wire types for the grading and identification API.
//!
//! Responses are decoded into these DTOs first and mapped into domain values
//! in one pass. Numeric fields are accepted either as JSON numbers or as
//! numeric strings, since the service emits both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    CardSide, CenteringRatios, GradingReport, IdentificationMatch, OverlayUrls, RawSubGrades,
    SubGrades,
};

#[derive(Debug, Serialize)]
pub(super) struct RecordsRequestDto<'a> {
    pub(super) records: Vec<ImageRecordDto<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct ImageRecordDto<'a> {
    #[serde(rename = "_base64")]
    pub(super) base64: &'a str,
}

impl<'a> RecordsRequestDto<'a> {
    pub(super) fn from_images(images: &[&'a str]) -> Self {
        Self {
            records: images
                .iter()
                .map(|&base64| ImageRecordDto { base64 })
                .collect(),
        }
    }
}

/// Number or numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn number(field: Option<&LenientNumber>) -> Option<f64> {
    field.and_then(LenientNumber::value)
}

#[derive(Debug, Deserialize)]
pub(super) struct GradeResponseDto {
    #[serde(default)]
    grades: Option<GradesDto>,
    #[serde(default)]
    records: Vec<GradeRecordDto>,
    #[serde(default)]
    confidence: Option<LenientNumber>,
}

#[derive(Debug, Deserialize)]
struct GradesDto {
    corners: Option<LenientNumber>,
    edges: Option<LenientNumber>,
    surface: Option<LenientNumber>,
    centering: Option<LenientNumber>,
    #[serde(rename = "final")]
    final_grade: Option<LenientNumber>,
    condition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GradeRecordDto {
    side: Option<String>,
    card: Option<GradedCardDto>,
    #[serde(rename = "_full_url_card")]
    full_url: Option<String>,
    #[serde(rename = "_exact_url_card")]
    exact_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GradedCardDto {
    centering: Option<CenteringDto>,
}

#[derive(Debug, Deserialize)]
struct CenteringDto {
    #[serde(rename = "left/right")]
    left_right: Option<String>,
    #[serde(rename = "top/bottom")]
    top_bottom: Option<String>,
}

impl GradeRecordDto {
    /// `None` when untagged, `Some(None)` for an unknown tag.
    fn tagged_side(&self) -> Option<Option<CardSide>> {
        self.side
            .as_deref()
            .map(|side| side.parse::<CardSide>().ok())
    }

    fn centering(&self) -> CenteringRatios {
        self.card
            .as_ref()
            .and_then(|card| card.centering.as_ref())
            .map(|c| CenteringRatios {
                left_right: c.left_right.clone(),
                top_bottom: c.top_bottom.clone(),
            })
            .unwrap_or_default()
    }
}

/// Side of each record. Tagged records keep their tag; untagged ones take
/// the side matching their position, or the other side if that one is
/// already claimed. A side is never assigned twice.
fn resolve_sides(records: &[GradeRecordDto]) -> Vec<Option<CardSide>> {
    let mut claimed: Vec<CardSide> = records
        .iter()
        .filter_map(|record| record.tagged_side().flatten())
        .collect();
    records
        .iter()
        .enumerate()
        .map(|(index, record)| match record.tagged_side() {
            Some(side) => side,
            None => {
                let preferred = match index {
                    0 => [CardSide::Front, CardSide::Back],
                    _ => [CardSide::Back, CardSide::Front],
                };
                let side = preferred.into_iter().find(|side| !claimed.contains(side))?;
                claimed.push(side);
                Some(side)
            }
        })
        .collect()
}

/// Decode a grading response, keeping the body verbatim on the report.
pub(super) fn decode_grade_response(raw: Value) -> Result<GradingReport, String> {
    let dto: GradeResponseDto = serde_json::from_value(raw.clone())
        .map_err(|err| format!("unexpected grading payload: {err}"))?;
    let grades = dto
        .grades
        .ok_or_else(|| "response has no grades".to_owned())?;
    let grades = SubGrades::try_from_raw(RawSubGrades {
        corners: number(grades.corners.as_ref()),
        edges: number(grades.edges.as_ref()),
        surface: number(grades.surface.as_ref()),
        centering: number(grades.centering.as_ref()),
        final_grade: number(grades.final_grade.as_ref()),
        condition: grades.condition,
    })
    .map_err(|err| err.to_string())?;

    let mut front_centering = CenteringRatios::default();
    let mut back_centering = CenteringRatios::default();
    let mut overlay_sources = OverlayUrls::default();
    let sides = resolve_sides(&dto.records);
    for (record, side) in dto.records.iter().zip(sides) {
        match side {
            Some(CardSide::Front) => {
                front_centering = record.centering();
                overlay_sources.front_full = record.full_url.clone();
                overlay_sources.front_exact = record.exact_url.clone();
            }
            Some(CardSide::Back) => {
                back_centering = record.centering();
                overlay_sources.back_full = record.full_url.clone();
                overlay_sources.back_exact = record.exact_url.clone();
            }
            None => {}
        }
    }

    let confidence = number(dto.confidence.as_ref())
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0));

    Ok(GradingReport {
        grades,
        front_centering,
        back_centering,
        confidence,
        overlay_sources,
        raw_response: raw,
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct IdentifyResponseDto {
    #[serde(default)]
    records: Vec<IdentifyRecordDto>,
}

#[derive(Debug, Deserialize)]
struct IdentifyRecordDto {
    #[serde(rename = "_objects", default)]
    objects: Vec<DetectedObjectDto>,
}

#[derive(Debug, Deserialize)]
struct DetectedObjectDto {
    #[serde(rename = "_identification")]
    identification: Option<IdentificationDto>,
}

#[derive(Debug, Deserialize)]
struct IdentificationDto {
    best_match: Option<MatchDto>,
    #[serde(default)]
    alternatives: Vec<MatchDto>,
}

#[derive(Debug, Deserialize)]
struct MatchDto {
    #[serde(default)]
    name: String,
    #[serde(alias = "set")]
    set_name: Option<String>,
    card_number: Option<String>,
    #[serde(alias = "id")]
    catalogue_id: Option<String>,
    confidence: Option<LenientNumber>,
}

impl From<MatchDto> for IdentificationMatch {
    fn from(dto: MatchDto) -> Self {
        Self {
            confidence: number(dto.confidence.as_ref()),
            name: dto.name,
            set_name: dto.set_name,
            card_number: dto.card_number,
            catalogue_id: dto.catalogue_id,
        }
    }
}

/// Decode an identification response: each detected object's best match
/// followed by its alternatives.
pub(super) fn decode_identify_response(body: &[u8]) -> Result<Vec<IdentificationMatch>, String> {
    let dto: IdentifyResponseDto = serde_json::from_slice(body)
        .map_err(|err| format!("unexpected identification payload: {err}"))?;
    Ok(dto
        .records
        .into_iter()
        .flat_map(|record| record.objects)
        .filter_map(|object| object.identification)
        .flat_map(|ident| ident.best_match.into_iter().chain(ident.alternatives))
        .map(IdentificationMatch::from)
        .collect())
}
