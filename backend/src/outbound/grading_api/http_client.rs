//! Reqwest-backed grading provider adapter.
//!
//! This adapter owns transport details only: request serialisation, the
//! token header, timeout and HTTP error mapping, and decoding into domain
//! reports and matches.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use super::dto::{RecordsRequestDto, decode_grade_response, decode_identify_response};
use crate::domain::ports::{GradingImages, GradingProvider, GradingProviderError, OverlayImage};
use crate::domain::{GradingReport, IdentificationMatch};
use crate::outbound::http_support::{StatusClass, classify_status, status_message};

const GRADE_PATH: &str = "card-grader/v2/grade";
const IDENTIFY_PATH: &str = "collectibles/v2/tcg_id";
const DEFAULT_OVERLAY_CONTENT_TYPE: &str = "image/jpeg";

/// Grading provider adapter for one API base URL.
pub struct GradingApiHttpClient {
    client: Client,
    grade_url: Url,
    identify_url: Url,
    token: String,
}

impl GradingApiHttpClient {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoints cannot be derived from `base_url`
    /// or the reqwest client cannot be constructed.
    pub fn new(
        base_url: &Url,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GradingProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GradingProviderError::transport(err.to_string()))?;
        Ok(Self {
            client,
            grade_url: endpoint(base_url, GRADE_PATH)?,
            identify_url: endpoint(base_url, IDENTIFY_PATH)?,
            token: token.into(),
        })
    }

    async fn post_records(&self, url: &Url, images: &[&str]) -> Result<Vec<u8>, GradingProviderError> {
        let response = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .json(&RecordsRequestDto::from_images(images))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url, GradingProviderError> {
    let joined = format!("{}/{path}", base_url.as_str().trim_end_matches('/'));
    Url::parse(&joined).map_err(|err| {
        GradingProviderError::invalid_request(format!("invalid grading endpoint {joined}: {err}"))
    })
}

#[async_trait]
impl GradingProvider for GradingApiHttpClient {
    async fn grade(&self, images: &GradingImages) -> Result<GradingReport, GradingProviderError> {
        let body = self
            .post_records(
                &self.grade_url,
                &[images.front_base64.as_str(), images.back_base64.as_str()],
            )
            .await?;
        parse_grade(&body)
    }

    async fn identify(
        &self,
        image_base64: &str,
    ) -> Result<Vec<IdentificationMatch>, GradingProviderError> {
        let body = self
            .post_records(&self.identify_url, &[image_base64])
            .await?;
        decode_identify_response(&body).map_err(GradingProviderError::malformed_response)
    }

    async fn fetch_overlay(&self, url: &str) -> Result<OverlayImage, GradingProviderError> {
        let url = Url::parse(url).map_err(|err| {
            GradingProviderError::invalid_request(format!("invalid overlay url: {err}"))
        })?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_OVERLAY_CONTENT_TYPE)
            .to_owned();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(OverlayImage {
            bytes: body.to_vec(),
            content_type,
        })
    }
}

fn parse_grade(body: &[u8]) -> Result<GradingReport, GradingProviderError> {
    let raw: Value = serde_json::from_slice(body).map_err(|err| {
        GradingProviderError::malformed_response(format!("invalid grading JSON payload: {err}"))
    })?;
    decode_grade_response(raw).map_err(GradingProviderError::malformed_response)
}

fn map_transport_error(error: reqwest::Error) -> GradingProviderError {
    if error.is_timeout() {
        GradingProviderError::timeout(error.to_string())
    } else {
        GradingProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GradingProviderError {
    let message = status_message(status, body);
    match classify_status(status) {
        StatusClass::RateLimited => GradingProviderError::rate_limited(message),
        StatusClass::Timeout => GradingProviderError::timeout(message),
        StatusClass::Client if rejects_the_image(status) => {
            GradingProviderError::invalid_request(message)
        }
        // Credentials, routing and anything else on our side of the call.
        StatusClass::NotFound | StatusClass::Client | StatusClass::Server => {
            GradingProviderError::transport(message)
        }
    }
}

fn rejects_the_image(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNPROCESSABLE_ENTITY
    )
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "InvalidRequest")]
    #[case::too_large(StatusCode::PAYLOAD_TOO_LARGE, "InvalidRequest")]
    #[case::unprocessable(StatusCode::UNPROCESSABLE_ENTITY, "InvalidRequest")]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, "Transport")]
    #[case::forbidden(StatusCode::FORBIDDEN, "Transport")]
    #[case::wrong_endpoint(StatusCode::NOT_FOUND, "Transport")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Transport")]
    fn maps_http_statuses_to_expected_domain_errors(
        #[case] status: StatusCode,
        #[case] expected: &str,
    ) {
        let error = map_status_error(status, b"{\"status\":{\"text\":\"failed\"}}");
        let matched = match expected {
            "RateLimited" => matches!(error, GradingProviderError::RateLimited { .. }),
            "Timeout" => matches!(error, GradingProviderError::Timeout { .. }),
            "InvalidRequest" => matches!(error, GradingProviderError::InvalidRequest { .. }),
            "Transport" => matches!(error, GradingProviderError::Transport { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}, got {error:?}");
    }

    #[rstest]
    fn rejected_token_is_a_transport_failure() {
        let error = map_status_error(
            StatusCode::UNAUTHORIZED,
            br#"{"detail":"Invalid token sk_live_abc"}"#,
        );

        let GradingProviderError::Transport { message } = &error else {
            panic!("401 should be a transport failure, got {error:?}");
        };
        assert!(message.starts_with("status 401"));
    }

    #[test]
    fn endpoints_are_joined_under_the_base_path() {
        let base = Url::parse("https://api.grader.test/v1/").expect("valid url");
        let url = endpoint(&base, GRADE_PATH).expect("endpoint");
        assert_eq!(url.as_str(), "https://api.grader.test/v1/card-grader/v2/grade");
    }

    #[test]
    fn non_json_grade_body_is_malformed() {
        let error = parse_grade(b"<html>gateway</html>").expect_err("not json");
        assert!(matches!(
            error,
            GradingProviderError::MalformedResponse { .. }
        ));
    }

    #[test]
    fn grade_body_without_grades_is_malformed() {
        let error = parse_grade(br#"{"records":[]}"#).expect_err("no grades");
        assert!(matches!(
            error,
            GradingProviderError::MalformedResponse { .. }
        ));
    }
}
