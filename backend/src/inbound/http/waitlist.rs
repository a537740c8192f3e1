//! Waitlist signup handler.
//!
//! ```text
//! POST /api/v1/waitlist {"email":"oak@pallet.town"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{WaitlistEmail, WaitlistSignup};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_email_error;

/// Request body for `POST /api/v1/waitlist`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct JoinWaitlistRequest {
    #[schema(example = "oak@pallet.town")]
    pub email: String,
}

/// Signup outcome. Repeat signups succeed with `already_registered` set.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinWaitlistResponse {
    pub success: bool,
    pub already_registered: bool,
}

/// Join the waitlist. No session required.
#[utoipa::path(
    post,
    path = "/api/v1/waitlist",
    request_body = JoinWaitlistRequest,
    responses(
        (status = 200, description = "Signup recorded", body = JoinWaitlistResponse),
        (status = 400, description = "Invalid email", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["waitlist"],
    operation_id = "joinWaitlist",
    security([])
)]
#[post("/waitlist")]
pub async fn join_waitlist(
    state: web::Data<HttpState>,
    payload: web::Json<JoinWaitlistRequest>,
) -> ApiResult<web::Json<JoinWaitlistResponse>> {
    let email = WaitlistEmail::new(&payload.email).map_err(map_email_error)?;
    let signup = state.waitlist.join(email).await?;
    let already_registered = matches!(signup, WaitlistSignup::AlreadyRegistered);
    info!(already_registered, "waitlist signup");
    Ok(web::Json(JoinWaitlistResponse {
        success: true,
        already_registered,
    }))
}
