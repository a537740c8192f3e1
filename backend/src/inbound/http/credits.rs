//! Credit balance handler.
//!
//! ```text
//! GET /api/v1/credits
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::CreditBalance;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Current balance. Informational only; paid operations deduct atomically.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreditsResponse {
    pub success: bool,
    #[schema(value_type = u32, example = 3)]
    pub credits: CreditBalance,
}

/// Read the caller's credit balance.
#[utoipa::path(
    get,
    path = "/api/v1/credits",
    responses(
        (status = 200, description = "Balance", body = CreditsResponse),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["credits"],
    operation_id = "getCredits"
)]
#[get("/credits")]
pub async fn get_credits(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CreditsResponse>> {
    let user_id = session.require_user_id()?;
    let credits = state.credits.balance(&user_id).await?;
    Ok(web::Json(CreditsResponse {
        success: true,
        credits,
    }))
}
