//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api/v1` handler and the health probes, the
//! request and response envelopes, and the session cookie security scheme.
//! Swagger UI serves it in debug builds; `openapi-dump` prints it.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    CardGradeSummary, CardSide, CenteringRatios, ErrorCode, GradingRecord,
    IdentificationCandidate, OverlayUrls, SubGrades,
};
use crate::inbound::http::cards::{
    AddCardRequest, CardDetailsResponse, CardListResponse, CardResponse, CardView,
};
use crate::inbound::http::credits::CreditsResponse;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::grading::GradeResponse;
use crate::inbound::http::identify::IdentifyResponse;
use crate::inbound::http::profile::{CreateProfileRequest, UsernameAvailableResponse};
use crate::inbound::http::users::{LoginRequest, LoginResponse, SuccessResponse};
use crate::inbound::http::waitlist::{JoinWaitlistRequest, JoinWaitlistResponse};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Card grading backend API",
        description = "Card collection, paid grading, identification and account endpoints."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::cards::add_card,
        crate::inbound::http::cards::list_cards,
        crate::inbound::http::cards::get_card,
        crate::inbound::http::cards::delete_card,
        crate::inbound::http::cards::upload_image,
        crate::inbound::http::grading::grade_card,
        crate::inbound::http::identify::identify_card,
        crate::inbound::http::credits::get_credits,
        crate::inbound::http::profile::username_available,
        crate::inbound::http::profile::create_profile,
        crate::inbound::http::waitlist::join_waitlist,
        crate::inbound::http::account::delete_account,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorEnvelope,
        ErrorCode,
        LoginRequest,
        LoginResponse,
        SuccessResponse,
        AddCardRequest,
        CardView,
        CardResponse,
        CardListResponse,
        CardDetailsResponse,
        CardSide,
        CardGradeSummary,
        GradeResponse,
        GradingRecord,
        SubGrades,
        CenteringRatios,
        OverlayUrls,
        IdentifyResponse,
        IdentificationCandidate,
        CreditsResponse,
        UsernameAvailableResponse,
        CreateProfileRequest,
        JoinWaitlistRequest,
        JoinWaitlistResponse,
    )),
    tags(
        (name = "users", description = "Session login and logout"),
        (name = "cards", description = "The caller's card collection"),
        (name = "grading", description = "Paid condition grading"),
        (name = "identification", description = "Card identification from a photo"),
        (name = "credits", description = "Paid operation balance"),
        (name = "profile", description = "Public profile setup"),
        (name = "waitlist", description = "Pre-launch waitlist"),
        (name = "account", description = "Account data deletion"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
