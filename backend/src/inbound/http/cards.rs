//! Card collection handlers.
//!
//! ```text
//! POST   /api/v1/cards {"name":"Charizard","set_name":"Base Set"}
//! GET    /api/v1/cards
//! GET    /api/v1/cards/{id}
//! DELETE /api/v1/cards/{id}
//! PUT    /api/v1/cards/{id}/images/{side}   (raw image body)
//! ```

use actix_web::{HttpRequest, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::CardImageUpload;
use crate::domain::{Card, CardGradeSummary, GradingRecord, NewCard, OverlayUrls};
use crate::inbound::http::ApiResult;
use crate::inbound::http::body::{image_content_type, read_limited};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::SuccessResponse;
use crate::inbound::http::validation::{map_card_validation_error, parse_card_id, parse_side};

/// Request body for `POST /api/v1/cards`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddCardRequest {
    #[schema(example = "Charizard")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Base Set")]
    pub set_name: Option<String>,
    #[serde(default)]
    #[schema(example = "4/102")]
    pub card_number: Option<String>,
    #[serde(default)]
    pub catalogue_card_id: Option<String>,
}

/// Card as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct CardView {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub name: String,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub catalogue_card_id: Option<String>,
    pub front_image_path: Option<String>,
    pub back_image_path: Option<String>,
    /// Annotated overlays from the latest grading.
    pub overlays: OverlayUrls,
    /// Latest grade summary, `null` until graded.
    pub grade: Option<CardGradeSummary>,
    pub created_at: DateTime<Utc>,
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        Self {
            id: card.id.to_string(),
            overlays: card.overlays,
            grade: card.grade,
            name: card.name,
            set_name: card.set_name,
            card_number: card.card_number,
            catalogue_card_id: card.catalogue_card_id,
            front_image_path: card.front_image_path,
            back_image_path: card.back_image_path,
            created_at: card.created_at,
        }
    }
}

/// Body for endpoints returning one card.
#[derive(Debug, Serialize, ToSchema)]
pub struct CardResponse {
    pub success: bool,
    pub card: CardView,
}

/// Body for `GET /api/v1/cards`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CardListResponse {
    pub success: bool,
    pub cards: Vec<CardView>,
}

/// Body for `GET /api/v1/cards/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CardDetailsResponse {
    pub success: bool,
    pub card: CardView,
    /// Latest grading, `null` when the card was never graded.
    pub grading: Option<GradingRecord>,
}

/// Add a card to the caller's collection.
#[utoipa::path(
    post,
    path = "/api/v1/cards",
    request_body = AddCardRequest,
    responses(
        (status = 200, description = "Card added", body = CardResponse),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["cards"],
    operation_id = "addCard"
)]
#[post("/cards")]
pub async fn add_card(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddCardRequest>,
) -> ApiResult<web::Json<CardResponse>> {
    let user_id = session.require_user_id()?;
    let AddCardRequest {
        name,
        set_name,
        card_number,
        catalogue_card_id,
    } = payload.into_inner();
    let new_card = NewCard::try_new(
        &name,
        set_name.as_deref(),
        card_number.as_deref(),
        catalogue_card_id.as_deref(),
    )
    .map_err(map_card_validation_error)?;
    let card = state.collection.add_card(&user_id, new_card).await?;
    Ok(web::Json(CardResponse {
        success: true,
        card: card.into(),
    }))
}

/// List the caller's cards, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/cards",
    responses(
        (status = 200, description = "Cards", body = CardListResponse),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["cards"],
    operation_id = "listCards"
)]
#[get("/cards")]
pub async fn list_cards(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CardListResponse>> {
    let user_id = session.require_user_id()?;
    let cards = state.collection_query.list_cards(&user_id).await?;
    Ok(web::Json(CardListResponse {
        success: true,
        cards: cards.into_iter().map(CardView::from).collect(),
    }))
}

/// One card with its grading record.
#[utoipa::path(
    get,
    path = "/api/v1/cards/{id}",
    params(("id" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "Card", body = CardDetailsResponse),
        (status = 400, description = "Malformed card id", body = ErrorEnvelope),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 404, description = "Card not found", body = ErrorEnvelope)
    ),
    tags = ["cards"],
    operation_id = "getCard"
)]
#[get("/cards/{id}")]
pub async fn get_card(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CardDetailsResponse>> {
    let user_id = session.require_user_id()?;
    let card_id = parse_card_id(&path.into_inner())?;
    let details = state
        .collection_query
        .card_details(&user_id, &card_id)
        .await?;
    Ok(web::Json(CardDetailsResponse {
        success: true,
        card: details.card.into(),
        grading: details.grading,
    }))
}

/// Delete a card, its grading record and its stored photos.
#[utoipa::path(
    delete,
    path = "/api/v1/cards/{id}",
    params(("id" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "Card deleted", body = SuccessResponse),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 404, description = "Card not found", body = ErrorEnvelope)
    ),
    tags = ["cards"],
    operation_id = "deleteCard"
)]
#[delete("/cards/{id}")]
pub async fn delete_card(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let user_id = session.require_user_id()?;
    let card_id = parse_card_id(&path.into_inner())?;
    state.collection.delete_card(&user_id, &card_id).await?;
    info!(user_id = %user_id, card_id = %card_id, "card deleted");
    Ok(web::Json(SuccessResponse::ok()))
}

/// Upload the photo of one face as the raw request body.
#[utoipa::path(
    put,
    path = "/api/v1/cards/{id}/images/{side}",
    params(
        ("id" = String, Path, description = "Card id"),
        ("side" = String, Path, description = "`front` or `back`")
    ),
    request_body(content = Vec<u8>, content_type = "image/jpeg"),
    responses(
        (status = 200, description = "Photo stored", body = CardResponse),
        (status = 400, description = "Empty body or unsupported type", body = ErrorEnvelope),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 404, description = "Card not found", body = ErrorEnvelope),
        (status = 413, description = "Image too large", body = ErrorEnvelope)
    ),
    tags = ["cards"],
    operation_id = "uploadCardImage"
)]
#[put("/cards/{id}/images/{side}")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Payload,
) -> ApiResult<web::Json<CardResponse>> {
    let user_id = session.require_user_id()?;
    let (raw_id, raw_side) = path.into_inner();
    let card_id = parse_card_id(&raw_id)?;
    let side = parse_side(&raw_side)?;
    let content_type = image_content_type(request.headers())?;
    let bytes = read_limited(body, state.max_upload_bytes).await?;
    let card = state
        .collection
        .upload_image(
            &user_id,
            &card_id,
            CardImageUpload {
                side,
                content_type,
                bytes,
            },
        )
        .await?;
    Ok(web::Json(CardResponse {
        success: true,
        card: card.into(),
    }))
}
