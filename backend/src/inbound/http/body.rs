//! Bounded reads of raw request bodies.
//!
//! Image uploads arrive as raw bodies rather than JSON. The body is streamed
//! and rejected with `413` as soon as it passes the configured limit, so an
//! oversized upload is never buffered in full.

use actix_web::http::header::{CONTENT_TYPE, HeaderMap};
use actix_web::web;
use futures_util::StreamExt as _;
use serde_json::json;

use crate::domain::{Error, ImageContentType};

/// Collect `payload` into memory, failing once it exceeds `limit` bytes.
pub(crate) async fn read_limited(
    mut payload: web::Payload,
    limit: usize,
) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|err| Error::invalid_request(format!("failed to read body: {err}")))?;
        if body.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }
    if body.is_empty() {
        return Err(Error::invalid_request("image body must not be empty")
            .with_details(json!({ "field": "body", "code": "empty_body" })));
    }
    Ok(body)
}

/// The `Content-Type` of an image upload, defaulting to JPEG when absent.
pub(crate) fn image_content_type(headers: &HeaderMap) -> Result<ImageContentType, Error> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(ImageContentType::Jpeg);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::invalid_request("content type must be ASCII"))?;
    ImageContentType::from_mime(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "content_type", "code": "unsupported_image_type" }))
    })
}

fn too_large(limit: usize) -> Error {
    Error::payload_too_large(format!("image exceeds {limit} bytes"))
        .with_details(json!({ "limit": limit }))
}
