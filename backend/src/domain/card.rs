//! User-owned collection cards.
//!
//! A [`Card`] is one physical card in a user's collection. Images are
//! uploaded against it one side at a time, and a successful grading writes
//! its summary (final grade, confidence, overlay URLs) back onto the card.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{OverlayUrls, UserId};

/// Maximum length accepted for a card name.
pub const CARD_NAME_MAX: usize = 200;
/// Maximum length accepted for optional descriptive fields.
pub const CARD_FIELD_MAX: usize = 100;

/// Identifier of a collection card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CardId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Face of a physical card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardSide {
    /// Front face.
    Front,
    /// Back face.
    Back,
}

impl CardSide {
    /// Lowercase name used in URLs and storage paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

impl FromStr for CardSide {
    type Err = CardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            other => Err(CardValidationError::UnknownSide(other.to_owned())),
        }
    }
}

/// Image formats accepted for card photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageContentType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
}

impl ImageContentType {
    /// Parse a MIME type, ignoring parameters such as `; charset=`.
    pub fn from_mime(mime: &str) -> Result<Self, CardValidationError> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::Webp),
            _ => Err(CardValidationError::UnsupportedImageType(mime.to_owned())),
        }
    }

    /// Canonical MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used for stored objects.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Validation failures for card input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardValidationError {
    /// Name was blank.
    #[error("card name must not be empty")]
    EmptyName,
    /// Name exceeded [`CARD_NAME_MAX`].
    #[error("card name must be at most {max} characters")]
    NameTooLong {
        /// Allowed maximum.
        max: usize,
    },
    /// An optional field exceeded [`CARD_FIELD_MAX`].
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Offending field.
        field: &'static str,
        /// Allowed maximum.
        max: usize,
    },
    /// The side segment was neither `front` nor `back`.
    #[error("unknown card side '{0}'; expected front or back")]
    UnknownSide(String),
    /// The upload was not a supported image format.
    #[error("unsupported image type '{0}'; expected image/jpeg, image/png or image/webp")]
    UnsupportedImageType(String),
}

/// Validated input for adding a card to a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    name: String,
    set_name: Option<String>,
    card_number: Option<String>,
    catalogue_card_id: Option<String>,
}

impl NewCard {
    /// Validate raw input. Optional fields are trimmed and dropped when blank.
    ///
    /// # Examples
    /// ```
    /// use tcg_backend::domain::NewCard;
    ///
    /// let card = NewCard::try_new("Charizard", Some("Base Set"), Some(" 4/102 "), None)
    ///     .expect("valid card");
    /// assert_eq!(card.card_number(), Some("4/102"));
    /// ```
    pub fn try_new(
        name: &str,
        set_name: Option<&str>,
        card_number: Option<&str>,
        catalogue_card_id: Option<&str>,
    ) -> Result<Self, CardValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CardValidationError::EmptyName);
        }
        if name.chars().count() > CARD_NAME_MAX {
            return Err(CardValidationError::NameTooLong { max: CARD_NAME_MAX });
        }
        Ok(Self {
            name: name.to_owned(),
            set_name: optional_field("set_name", set_name)?,
            card_number: optional_field("card_number", card_number)?,
            catalogue_card_id: optional_field("catalogue_card_id", catalogue_card_id)?,
        })
    }

    /// Display name of the card.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expansion/set name.
    pub fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    /// Collector number within the set.
    pub fn card_number(&self) -> Option<&str> {
        self.card_number.as_deref()
    }

    /// Reference catalogue id when the card was picked from the catalogue.
    pub fn catalogue_card_id(&self) -> Option<&str> {
        self.catalogue_card_id.as_deref()
    }
}

fn optional_field(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, CardValidationError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > CARD_FIELD_MAX {
        return Err(CardValidationError::FieldTooLong {
            field,
            max: CARD_FIELD_MAX,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Grade summary mirrored onto the card after a successful grading.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CardGradeSummary {
    /// Final grade on the 1–10 scale.
    pub final_grade: f64,
    /// Provider confidence, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// When the grading completed.
    pub graded_at: DateTime<Utc>,
}

/// A card in a user's collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Card identifier.
    pub id: CardId,
    /// Owning account.
    pub owner: UserId,
    /// Display name.
    pub name: String,
    /// Expansion/set name.
    pub set_name: Option<String>,
    /// Collector number within the set.
    pub card_number: Option<String>,
    /// Reference catalogue id.
    pub catalogue_card_id: Option<String>,
    /// Storage path of the front photo.
    pub front_image_path: Option<String>,
    /// Storage path of the back photo.
    pub back_image_path: Option<String>,
    /// Annotated overlay image URLs from the latest grading.
    pub overlays: OverlayUrls,
    /// Latest grading summary.
    pub grade: Option<CardGradeSummary>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Storage path of the photo for `side`, if uploaded.
    #[must_use]
    pub fn image_path(&self, side: CardSide) -> Option<&str> {
        match side {
            CardSide::Front => self.front_image_path.as_deref(),
            CardSide::Back => self.back_image_path.as_deref(),
        }
    }

    /// Both photo paths, or `None` unless front and back are present.
    #[must_use]
    pub fn grading_images(&self) -> Option<CardImagePaths<'_>> {
        Some(CardImagePaths {
            front: self.front_image_path.as_deref()?,
            back: self.back_image_path.as_deref()?,
        })
    }

    /// Storage prefix holding every object for this card.
    #[must_use]
    pub fn storage_prefix(&self) -> String {
        card_storage_prefix(&self.owner, &self.id)
    }
}

/// Front and back photo paths of a card ready for grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardImagePaths<'a> {
    /// Front photo path.
    pub front: &'a str,
    /// Back photo path.
    pub back: &'a str,
}

/// Storage prefix for objects belonging to `card_id`.
#[must_use]
pub fn card_storage_prefix(owner: &UserId, card_id: &CardId) -> String {
    format!("{}/{card_id}", owner.storage_prefix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn card(front: Option<&str>, back: Option<&str>) -> Card {
        Card {
            id: CardId::random(),
            owner: UserId::random(),
            name: "Pikachu".to_owned(),
            set_name: None,
            card_number: None,
            catalogue_card_id: None,
            front_image_path: front.map(str::to_owned),
            back_image_path: back.map(str::to_owned),
            overlays: OverlayUrls::default(),
            grade: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(Some("u/c/front.jpg"), Some("u/c/back.jpg"), true)]
    #[case(Some("u/c/front.jpg"), None, false)]
    #[case(None, Some("u/c/back.jpg"), false)]
    #[case(None, None, false)]
    fn grading_images_require_both_faces(
        #[case] front: Option<&str>,
        #[case] back: Option<&str>,
        #[case] ready: bool,
    ) {
        assert_eq!(card(front, back).grading_images().is_some(), ready);
    }

    #[rstest]
    #[case("", CardValidationError::EmptyName)]
    #[case("   ", CardValidationError::EmptyName)]
    fn rejects_blank_names(#[case] name: &str, #[case] expected: CardValidationError) {
        assert_eq!(NewCard::try_new(name, None, None, None), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_set_name() {
        let long = "x".repeat(CARD_FIELD_MAX + 1);
        let err = NewCard::try_new("Mew", Some(&long), None, None).expect_err("too long");
        assert_eq!(
            err,
            CardValidationError::FieldTooLong {
                field: "set_name",
                max: CARD_FIELD_MAX
            }
        );
    }

    #[rstest]
    fn blank_optional_fields_are_dropped() {
        let card = NewCard::try_new("Mew", Some("  "), None, Some("")).expect("valid");
        assert_eq!(card.set_name(), None);
        assert_eq!(card.catalogue_card_id(), None);
    }

    #[rstest]
    #[case("image/jpeg", ImageContentType::Jpeg)]
    #[case("IMAGE/PNG", ImageContentType::Png)]
    #[case("image/webp; q=0.9", ImageContentType::Webp)]
    fn parses_supported_mime_types(#[case] mime: &str, #[case] expected: ImageContentType) {
        assert_eq!(ImageContentType::from_mime(mime), Ok(expected));
    }

    #[rstest]
    fn rejects_unsupported_mime_types() {
        assert!(matches!(
            ImageContentType::from_mime("application/pdf"),
            Err(CardValidationError::UnsupportedImageType(_))
        ));
    }

    #[rstest]
    fn side_parses_lowercase_names() {
        assert_eq!("back".parse::<CardSide>(), Ok(CardSide::Back));
        assert!("left".parse::<CardSide>().is_err());
    }
}
