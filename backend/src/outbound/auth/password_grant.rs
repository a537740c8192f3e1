//! Password-grant login against the managed auth service.
//!
//! The auth service owns user accounts; this adapter only exchanges an
//! email/password pair for the user's id. Tokens returned alongside are
//! discarded because the API keeps its own cookie session.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ports::LoginService;
use crate::domain::{Error, LoginCredentials, UserId};
use crate::outbound::http_support::{StatusClass, classify_status, status_message};

/// Login adapter for `POST {auth_url}/token?grant_type=password`.
pub struct PasswordGrantLoginService {
    client: Client,
    token_url: Url,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct PasswordGrantResponse {
    user: Option<AuthUser>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

impl PasswordGrantLoginService {
    /// Build the adapter for an auth service root such as
    /// `https://project.supabase.co/auth/v1`.
    ///
    /// # Errors
    ///
    /// Returns an internal [`Error`] when the token URL cannot be derived or
    /// the client cannot be constructed.
    pub fn new(auth_url: &Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::internal(format!("auth client: {err}")))?;
        let raw = format!(
            "{}/token?grant_type=password",
            auth_url.as_str().trim_end_matches('/')
        );
        let token_url =
            Url::parse(&raw).map_err(|err| Error::internal(format!("auth url {raw}: {err}")))?;
        Ok(Self {
            client,
            token_url,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl LoginService for PasswordGrantLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let response = self
            .client
            .post(self.token_url.clone())
            .header("apikey", &self.api_key)
            .json(&PasswordGrantRequest {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "auth service unreachable");
                Error::service_unavailable("authentication service unavailable")
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            warn!(error = %err, "auth response body unreadable");
            Error::service_unavailable("authentication service unavailable")
        })?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_user_id(body.as_ref())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> Error {
    match classify_status(status) {
        StatusClass::Client | StatusClass::NotFound => {
            debug!(status = status.as_u16(), "credentials rejected");
            Error::unauthorized("invalid credentials")
        }
        StatusClass::RateLimited | StatusClass::Timeout | StatusClass::Server => {
            warn!(detail = %status_message(status, body), "auth service failed");
            Error::service_unavailable("authentication service unavailable")
        }
    }
}

fn parse_user_id(body: &[u8]) -> Result<UserId, Error> {
    let parsed: PasswordGrantResponse = serde_json::from_slice(body)
        .map_err(|err| Error::internal(format!("unexpected auth payload: {err}")))?;
    let user = parsed
        .user
        .ok_or_else(|| Error::internal("auth payload has no user"))?;
    UserId::new(&user.id).map_err(|err| Error::internal(format!("auth returned bad user id: {err}")))
}
