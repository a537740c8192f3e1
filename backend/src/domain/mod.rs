//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, and the services that implement the driving ports. Types keep
//! their invariants in constructors and document serialisation contracts in
//! their Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable error identifier.
//! - UserId, CardId, Card, GradingRecord: identities and aggregates.
//! - Card*Service, CollectionService and friends: driving port
//!   implementations over the driven ports in [`ports`].

pub mod ports;

mod account_service;
mod auth;
mod card;
mod card_grading_service;
mod card_identification_service;
mod collection_service;
mod credits;
mod credits_service;
mod error;
mod grading;
mod identification;
mod paid_work;
mod port_errors;
mod price_catalogue_service;
mod price_sync_service;
mod pricing;
mod profile;
mod profile_service;
mod trace_id;
mod user;
mod waitlist;
mod waitlist_service;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::card::{
    CARD_FIELD_MAX, CARD_NAME_MAX, Card, CardGradeSummary, CardId, CardImagePaths, CardSide,
    CardValidationError, ImageContentType, NewCard, card_storage_prefix,
};
pub use self::card_grading_service::{
    BOTH_IMAGES_REQUIRED, CardGradingPorts, CardGradingService,
};
pub use self::card_identification_service::{CardIdentificationService, IdentificationCharging};
pub use self::collection_service::{CollectionService, DEFAULT_MAX_UPLOAD_BYTES};
pub use self::credits::{CreditBalance, PaidOperation};
pub use self::credits_service::CreditsService;
pub use self::error::{Error, ErrorCode};
pub use self::grading::{
    CenteringRatios, GRADE_MAX, GradeValidationError, GradingRecord, GradingReport, OverlayKind,
    OverlayUrls, RawSubGrades, SubGrades,
};
pub use self::identification::{IdentificationCandidate, IdentificationMatch, rank_matches};
pub use self::price_catalogue_service::{PRICE_SAMPLE_MAX, PriceCatalogueService};
pub use self::price_sync_service::PriceSyncService;
pub use self::pricing::{
    CatalogueRecord, CatalogueTable, CataloguePriceCoverage, PRICE_FRESHNESS_HOURS, PriceEntry,
    PriceSampleRequest, PriceSnapshot, PriceSyncReport, PriceSyncRequest, PriceSyncStats,
    PricedRecordSample, PricedSet, SetScope, TablePriceCoverage, UnknownProduct,
    UnknownSetProducts, VariantPrice, daily_snapshots, group_by_product,
};
pub use self::profile::{
    DISPLAY_NAME_MAX, NewProfile, ProfileValidationError, USERNAME_MAX, USERNAME_MIN, Username,
};
pub use self::profile_service::ProfileService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserId, UserIdValidationError};
pub use self::waitlist::{EMAIL_MAX, WaitlistEmail, WaitlistEmailError, WaitlistSignup};
pub use self::waitlist_service::WaitlistService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use tcg_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("card not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
