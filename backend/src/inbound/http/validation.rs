//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every client input error carries `details` of the form
//! `{"field": .., "code": ..}` so clients can highlight the offending input.

use serde_json::json;

use crate::domain::{
    CardId, CardSide, CardValidationError, Error, ProfileValidationError, WaitlistEmailError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidValue,
    TooLong,
    Empty,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::TooLong => "too_long",
            ErrorCode::Empty => "empty",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) const CARD_ID: FieldName = FieldName::new("card_id");
pub(crate) const SIDE: FieldName = FieldName::new("side");

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn parse_card_id(value: &str) -> Result<CardId, Error> {
    value
        .parse::<CardId>()
        .map_err(|_| invalid_uuid_error(CARD_ID, value))
}

pub(crate) fn parse_side(value: &str) -> Result<CardSide, Error> {
    value
        .parse::<CardSide>()
        .map_err(|err| field_error(SIDE.as_str(), ErrorCode::InvalidValue, err.to_string()))
}

pub(crate) fn map_card_validation_error(err: CardValidationError) -> Error {
    let message = err.to_string();
    match err {
        CardValidationError::EmptyName => field_error("name", ErrorCode::Empty, message),
        CardValidationError::NameTooLong { .. } => {
            field_error("name", ErrorCode::TooLong, message)
        }
        CardValidationError::FieldTooLong { field, .. } => {
            field_error(field, ErrorCode::TooLong, message)
        }
        CardValidationError::UnknownSide(_) => {
            field_error(SIDE.as_str(), ErrorCode::InvalidValue, message)
        }
        CardValidationError::UnsupportedImageType(_) => {
            field_error("content_type", ErrorCode::InvalidValue, message)
        }
    }
}

pub(crate) fn map_profile_validation_error(err: ProfileValidationError) -> Error {
    let field = match err {
        ProfileValidationError::DisplayNameTooLong { .. } => "display_name",
        _ => "username",
    };
    field_error(field, ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn map_email_error(err: WaitlistEmailError) -> Error {
    let code = match err {
        WaitlistEmailError::Empty => ErrorCode::Empty,
        _ => ErrorCode::InvalidValue,
    };
    field_error("email", code, err.to_string())
}
