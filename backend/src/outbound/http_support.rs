//! Shared helpers for reqwest-backed adapters.
//!
//! Adapters keep their own port error enums; these helpers only classify
//! HTTP statuses and render short, log-safe descriptions of failures.

use reqwest::StatusCode;

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Coarse classification of a non-success status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    /// 429.
    RateLimited,
    /// 408 or 504.
    Timeout,
    /// 404.
    NotFound,
    /// Any other 4xx.
    Client,
    /// 5xx and anything unexpected.
    Server,
}

pub(crate) fn classify_status(status: StatusCode) -> StatusClass {
    match status {
        StatusCode::TOO_MANY_REQUESTS => StatusClass::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StatusClass::Timeout,
        StatusCode::NOT_FOUND => StatusClass::NotFound,
        _ if status.is_client_error() => StatusClass::Client,
        _ => StatusClass::Server,
    }
}

/// `status 503: <preview>` or just `status 503` for empty bodies.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

/// Whitespace-collapsed prefix of a response body.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
