//! Account deletion handler.
//!
//! ```text
//! DELETE /api/v1/account
//! ```

use actix_web::{delete, web};
use tracing::info;

use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::SuccessResponse;

/// Delete everything the caller owns, then end the session.
#[utoipa::path(
    delete,
    path = "/api/v1/account",
    responses(
        (status = 200, description = "Account data deleted", body = SuccessResponse),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 500, description = "Deletion failed", body = ErrorEnvelope)
    ),
    tags = ["account"],
    operation_id = "deleteAccount"
)]
#[delete("/account")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SuccessResponse>> {
    let user_id = session.require_user_id()?;
    state.accounts.delete_account(&user_id).await?;
    session.purge();
    info!(user_id = %user_id, "account deleted");
    Ok(web::Json(SuccessResponse::ok()))
}
