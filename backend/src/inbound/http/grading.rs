//! Card grading handler.
//!
//! ```text
//! POST /api/v1/cards/{id}/grade
//! ```
//!
//! Grading costs one credit. The handler only resolves the session user and
//! the card id; ordering of checks, charging and refunds live in the domain
//! service behind [`crate::domain::ports::CardGradingCommand`].

use actix_web::{post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::GradingRecord;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_card_id;

/// Body returned by a successful grading.
#[derive(Debug, Serialize, ToSchema)]
pub struct GradeResponse {
    /// Always `true`; failures use the error envelope.
    #[schema(example = true)]
    pub success: bool,
    /// The record that now replaces any earlier grading of the card.
    pub grading: GradingRecord,
}

/// Grade a card from its front and back photos.
#[utoipa::path(
    post,
    path = "/api/v1/cards/{id}/grade",
    params(("id" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "Card graded", body = GradeResponse),
        (status = 400, description = "Both front and back images are required", body = ErrorEnvelope),
        (status = 401, description = "Login required", body = ErrorEnvelope),
        (status = 402, description = "Insufficient credits", body = ErrorEnvelope),
        (status = 404, description = "Card not found", body = ErrorEnvelope),
        (status = 500, description = "Grading failed; the credit was refunded", body = ErrorEnvelope)
    ),
    tags = ["grading"],
    operation_id = "gradeCard"
)]
#[post("/cards/{id}/grade")]
pub async fn grade_card(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<GradeResponse>> {
    let user_id = session.require_user_id()?;
    let card_id = parse_card_id(&path.into_inner())?;
    let grading = state.grading.grade_card(&user_id, &card_id).await?;
    info!(
        user_id = %user_id,
        card_id = %card_id,
        final_grade = grading.grades.final_grade,
        "card graded"
    );
    Ok(web::Json(GradeResponse {
        success: true,
        grading,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::domain::ports::{FIXTURE_USER_ID, MockCardGradingCommand};
    use crate::domain::{
        BOTH_IMAGES_REQUIRED, CardId, CenteringRatios, Error, OverlayUrls, SubGrades, UserId,
    };
    use crate::inbound::http::state::{HttpState, HttpStatePorts};
    use crate::inbound::http::test_utils::{login_cookie, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;

    const CARD_ID: &str = "9b2e6c52-4c1e-4d55-9a0e-1d2d3c4b5a69";

    fn record() -> GradingRecord {
        GradingRecord {
            id: Uuid::nil(),
            card_id: CARD_ID.parse().expect("card id"),
            user_id: UserId::new(FIXTURE_USER_ID).expect("user id"),
            grades: SubGrades {
                corners: 9.0,
                edges: 8.5,
                surface: 9.5,
                centering: 9.0,
                final_grade: 9.0,
                condition: Some("Mint".to_owned()),
            },
            front_centering: CenteringRatios::default(),
            back_centering: CenteringRatios::default(),
            confidence: Some(0.93),
            overlays: OverlayUrls::default(),
            raw_response: json!({}),
            graded_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn state_with(command: MockCardGradingCommand) -> HttpState {
        HttpState::new(HttpStatePorts {
            grading: Arc::new(command),
            ..HttpStatePorts::default()
        })
    }

    async fn post_grade(command: MockCardGradingCommand) -> (StatusCode, Value) {
        let app = actix_test::init_service(test_app(state_with(command))).await;
        let cookie = login_cookie(&app).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/cards/{CARD_ID}/grade"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let status = response.status();
        (status, actix_test::read_body_json(response).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn successful_grading_returns_the_record() {
        let mut command = MockCardGradingCommand::new();
        command
            .expect_grade_card()
            .withf(|user, card| {
                user.to_string() == FIXTURE_USER_ID
                    && *card == CARD_ID.parse::<CardId>().expect("id")
            })
            .times(1)
            .return_once(|_, _| Ok(record()));

        let (status, body) = post_grade(command).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["grading"]["grades"]["final"], json!(9.0));
        assert_eq!(body["grading"]["overlays"]["front_full"], Value::Null);
        assert!(body["grading"].get("raw_response").is_none());
    }

    #[rstest]
    #[case(Error::invalid_request(BOTH_IMAGES_REQUIRED), StatusCode::BAD_REQUEST, "invalid_request")]
    #[case(Error::payment_required("Insufficient credits"), StatusCode::PAYMENT_REQUIRED, "payment_required")]
    #[case(Error::not_found("card not found"), StatusCode::NOT_FOUND, "not_found")]
    #[case(Error::internal("grading api: malformed"), StatusCode::INTERNAL_SERVER_ERROR, "internal_error")]
    #[actix_web::test]
    async fn domain_failures_use_the_envelope(
        #[case] error: Error,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let mut command = MockCardGradingCommand::new();
        command.expect_grade_card().return_once(move |_, _| Err(error));

        let (actual, body) = post_grade(command).await;
        assert_eq!(actual, status);
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["error_code"], code);
    }

    #[rstest]
    #[actix_web::test]
    async fn unauthenticated_callers_never_reach_the_service() {
        let mut command = MockCardGradingCommand::new();
        command.expect_grade_card().never();
        let app = actix_test::init_service(test_app(state_with(command))).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/cards/{CARD_ID}/grade"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
