//! Card identification candidates.

use std::cmp::Ordering;

use serde::Serialize;
use utoipa::ToSchema;

/// One catalogue card the identification service considers a match.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IdentificationCandidate {
    /// 1-based position after ranking.
    pub rank: u32,
    /// Card name.
    pub name: String,
    /// Set name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    /// Collector number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    /// Catalogue identifier of the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalogue_id: Option<String>,
    /// Confidence in 0–1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Unranked match as reported by the provider, best match first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentificationMatch {
    /// Card name.
    pub name: String,
    /// Set name.
    pub set_name: Option<String>,
    /// Collector number.
    pub card_number: Option<String>,
    /// Catalogue identifier.
    pub catalogue_id: Option<String>,
    /// Confidence in 0–1.
    pub confidence: Option<f64>,
}

/// Order matches by confidence (highest first) and assign ranks.
///
/// Matches without a confidence sort after scored ones. Ties keep the
/// provider's order. Non-finite confidences are dropped, and finite ones are
/// clamped to 0–1.
///
/// # Examples
/// ```
/// use tcg_backend::domain::{rank_matches, IdentificationMatch};
///
/// let ranked = rank_matches(vec![
///     IdentificationMatch { name: "Eevee".into(), confidence: Some(0.4), ..Default::default() },
///     IdentificationMatch { name: "Vaporeon".into(), confidence: Some(0.9), ..Default::default() },
/// ]);
/// assert_eq!(ranked[0].name, "Vaporeon");
/// assert_eq!(ranked[1].rank, 2);
/// ```
#[must_use]
pub fn rank_matches(matches: Vec<IdentificationMatch>) -> Vec<IdentificationCandidate> {
    let mut scored: Vec<IdentificationMatch> = matches
        .into_iter()
        .filter(|m| !m.name.trim().is_empty())
        .map(|mut m| {
            m.confidence = m
                .confidence
                .filter(|c| c.is_finite())
                .map(|c| c.clamp(0.0, 1.0));
            m
        })
        .collect();
    scored.sort_by(|a, b| match (a.confidence, b.confidence) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    scored
        .into_iter()
        .zip(1_u32..)
        .map(|(m, rank)| IdentificationCandidate {
            rank,
            name: m.name,
            set_name: m.set_name,
            card_number: m.card_number,
            catalogue_id: m.catalogue_id,
            confidence: m.confidence,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn named(name: &str, confidence: Option<f64>) -> IdentificationMatch {
        IdentificationMatch {
            name: name.to_owned(),
            confidence,
            ..IdentificationMatch::default()
        }
    }

    #[rstest]
    fn unscored_matches_follow_scored_ones() {
        let ranked = rank_matches(vec![
            named("Ditto", None),
            named("Mew", Some(0.2)),
            named("Mewtwo", Some(0.8)),
        ]);
        let names: Vec<_> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Mewtwo", "Mew", "Ditto"]);
        let ranks: Vec<_> = ranked.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, [1, 2, 3]);
    }

    #[rstest]
    fn ties_keep_provider_order() {
        let ranked = rank_matches(vec![named("First", Some(0.5)), named("Second", Some(0.5))]);
        assert_eq!(ranked[0].name, "First");
    }

    #[rstest]
    fn clamps_and_drops_odd_confidences() {
        let ranked = rank_matches(vec![
            named("High", Some(1.7)),
            named("Nan", Some(f64::NAN)),
            named("   ", Some(0.9)),
        ]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].confidence, Some(1.0));
        assert_eq!(ranked[1].confidence, None);
    }
}
