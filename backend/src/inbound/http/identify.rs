//! Card identification handler.
//!
//! ```text
//! POST /api/v1/identify   (raw image body)
//! ```

use actix_web::{HttpRequest, post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::IdentificationCandidate;
use crate::domain::ports::IdentificationImage;
use crate::inbound::http::ApiResult;
use crate::inbound::http::body::{image_content_type, read_limited};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Ranked matches for an identification photo.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdentifyResponse {
    pub success: bool,
    /// Best match first; empty when nothing matched.
    pub candidates: Vec<IdentificationCandidate>,
}

/// Identify a card from a single photo.
#[utoipa::path(
    post,
    path = "/api/v1/identify",
    request_body(content = Vec<u8>, content_type = "image/jpeg"),
    responses(
        (status = 200, description = "Candidate matches", body = IdentifyResponse),
        (status = 400, description = "Empty or unsupported image", body = ErrorEnvelope),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 402, description = "Insufficient credits when identification is charged", body = ErrorEnvelope),
        (status = 413, description = "Image too large", body = ErrorEnvelope),
        (status = 500, description = "Identification failed", body = ErrorEnvelope)
    ),
    tags = ["identification"],
    operation_id = "identifyCard"
)]
#[post("/identify")]
pub async fn identify_card(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    body: web::Payload,
) -> ApiResult<web::Json<IdentifyResponse>> {
    let user_id = session.require_user_id()?;
    image_content_type(request.headers())?;
    let bytes = read_limited(body, state.max_upload_bytes).await?;
    let candidates = state
        .identification
        .identify_card(&user_id, IdentificationImage { bytes })
        .await?;
    info!(user_id = %user_id, matches = candidates.len(), "card identified");
    Ok(web::Json(IdentifyResponse {
        success: true,
        candidates,
    }))
}
