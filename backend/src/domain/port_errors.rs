//! Mapping from driven-port failures to API errors.
//!
//! Several services talk to the same driven ports, so the translation lives
//! here rather than being repeated per service.

use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{
    CardRepositoryError, CreditLedgerError, GradingProviderError, ImageStorageError,
    PriceCatalogueRepositoryError,
};

pub(crate) fn map_card_repository_error(error: CardRepositoryError) -> Error {
    match error {
        CardRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("card repository unavailable: {message}"))
        }
        CardRepositoryError::Query { message } => {
            Error::internal(format!("card repository error: {message}"))
        }
    }
}

/// Deduction failures. Only an empty balance is the caller's problem.
pub(crate) fn map_deduct_error(error: CreditLedgerError) -> Error {
    match error {
        CreditLedgerError::InsufficientCredits => Error::payment_required("Insufficient credits"),
        CreditLedgerError::Connection { message } | CreditLedgerError::Query { message } => {
            Error::internal(format!("credit deduction failed: {message}"))
        }
    }
}

pub(crate) fn map_ledger_error(error: CreditLedgerError) -> Error {
    match error {
        CreditLedgerError::InsufficientCredits => Error::payment_required("Insufficient credits"),
        CreditLedgerError::Connection { message } => {
            Error::service_unavailable(format!("credit ledger unavailable: {message}"))
        }
        CreditLedgerError::Query { message } => {
            Error::internal(format!("credit ledger error: {message}"))
        }
    }
}

pub(crate) fn map_storage_error(error: ImageStorageError) -> Error {
    match error {
        ImageStorageError::NotFound { path } => {
            Error::internal(format!("stored image missing: {path}"))
        }
        ImageStorageError::Rejected { message } => {
            Error::internal(format!("image storage rejected the request: {message}"))
        }
        ImageStorageError::Timeout { message } => {
            Error::service_unavailable(format!("image storage timed out: {message}"))
        }
        ImageStorageError::Transport { message } => {
            Error::internal(format!("image storage unavailable: {message}"))
        }
    }
}

pub(crate) fn map_provider_error(error: GradingProviderError) -> Error {
    match error {
        GradingProviderError::InvalidRequest { message } => {
            warn!(upstream = %message, "recognition service rejected the image");
            Error::invalid_request("recognition service rejected the image")
        }
        GradingProviderError::RateLimited { message } => {
            Error::internal(format!("recognition service is busy: {message}"))
        }
        GradingProviderError::Timeout { message } => {
            Error::internal(format!("recognition service timed out: {message}"))
        }
        GradingProviderError::Transport { message } => {
            Error::internal(format!("recognition service unavailable: {message}"))
        }
        GradingProviderError::MalformedResponse { message } => Error::internal(format!(
            "recognition service returned an unexpected response: {message}"
        )),
    }
}

pub(crate) fn map_catalogue_error(error: PriceCatalogueRepositoryError) -> Error {
    match error {
        PriceCatalogueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalogue unavailable: {message}"))
        }
        PriceCatalogueRepositoryError::Query { message } => {
            Error::internal(format!("catalogue query failed: {message}"))
        }
    }
}
