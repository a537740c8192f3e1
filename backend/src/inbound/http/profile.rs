//! Profile handlers.
//!
//! ```text
//! GET  /api/v1/profile/username-available?username=ash_k
//! POST /api/v1/profile {"username":"ash_k","display_name":"Ash"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{NewProfile, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::SuccessResponse;
use crate::inbound::http::validation::map_profile_validation_error;

/// Query for `GET /api/v1/profile/username-available`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UsernameQuery {
    /// Candidate username; lowercased before checking.
    pub username: String,
}

/// Availability answer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsernameAvailableResponse {
    pub success: bool,
    pub available: bool,
}

/// Request body for `POST /api/v1/profile`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProfileRequest {
    #[schema(example = "ash_k")]
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Check whether a username is free.
#[utoipa::path(
    get,
    path = "/api/v1/profile/username-available",
    params(UsernameQuery),
    responses(
        (status = 200, description = "Availability", body = UsernameAvailableResponse),
        (status = 400, description = "Malformed username", body = ErrorEnvelope)
    ),
    tags = ["profile"],
    operation_id = "usernameAvailable",
    security([])
)]
#[get("/profile/username-available")]
pub async fn username_available(
    state: web::Data<HttpState>,
    query: web::Query<UsernameQuery>,
) -> ApiResult<web::Json<UsernameAvailableResponse>> {
    let username = Username::new(&query.username).map_err(map_profile_validation_error)?;
    let available = state.profiles.username_available(&username).await?;
    Ok(web::Json(UsernameAvailableResponse {
        success: true,
        available,
    }))
}

/// Create the caller's profile.
#[utoipa::path(
    post,
    path = "/api/v1/profile",
    request_body = CreateProfileRequest,
    responses(
        (status = 200, description = "Profile created", body = SuccessResponse),
        (status = 400, description = "Invalid username", body = ErrorEnvelope),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 409, description = "Username taken or profile exists", body = ErrorEnvelope)
    ),
    tags = ["profile"],
    operation_id = "createProfile"
)]
#[post("/profile")]
pub async fn create_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProfileRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let user_id = session.require_user_id()?;
    let CreateProfileRequest {
        username,
        display_name,
    } = payload.into_inner();
    let profile = NewProfile::try_new(&username, display_name.as_deref())
        .map_err(map_profile_validation_error)?;
    let username = profile.username.clone();
    state.profiles.create_profile(&user_id, profile).await?;
    info!(user_id = %user_id, username = %username.as_str(), "profile created");
    Ok(web::Json(SuccessResponse::ok()))
}
