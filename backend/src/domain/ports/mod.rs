//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the credit ledger, object storage, the
//! grading provider and the price feed) describe what the domain needs from
//! the outside world. Driving ports (commands and queries) describe what the
//! HTTP adapter and command-line tools may ask of the domain.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_repository;
mod card_grading_command;
mod card_identification_query;
mod card_repository;
mod collection_command;
mod collection_query;
mod credit_ledger;
mod credits_query;
mod grading_provider;
mod grading_record_repository;
mod image_storage;
mod login_service;
mod price_catalogue_query;
mod price_catalogue_repository;
mod price_source;
mod price_sync_command;
mod profile_command;
mod profile_repository;
mod waitlist_command;
mod waitlist_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, FixtureAccountCommand};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError, DeletedAccountData};
#[cfg(test)]
pub use card_grading_command::MockCardGradingCommand;
pub use card_grading_command::{CardGradingCommand, FixtureCardGradingCommand};
#[cfg(test)]
pub use card_identification_query::MockCardIdentificationQuery;
pub use card_identification_query::{
    CardIdentificationQuery, FixtureCardIdentificationQuery, IdentificationImage,
};
#[cfg(test)]
pub use card_repository::MockCardRepository;
pub use card_repository::{CardRepository, CardRepositoryError};
#[cfg(test)]
pub use collection_command::MockCollectionCommand;
pub use collection_command::{CardImageUpload, CollectionCommand, FixtureCollectionCommand};
#[cfg(test)]
pub use collection_query::MockCollectionQuery;
pub use collection_query::{CardDetails, CollectionQuery, FixtureCollectionQuery};
#[cfg(test)]
pub use credit_ledger::MockCreditLedger;
pub use credit_ledger::{CreditLedger, CreditLedgerError};
#[cfg(test)]
pub use credits_query::MockCreditsQuery;
pub use credits_query::{CreditsQuery, FixtureCreditsQuery};
#[cfg(test)]
pub use grading_provider::MockGradingProvider;
pub use grading_provider::{GradingImages, GradingProvider, GradingProviderError, OverlayImage};
#[cfg(test)]
pub use grading_record_repository::MockGradingRecordRepository;
pub use grading_record_repository::{GradingRecordRepository, GradingRecordRepositoryError};
#[cfg(test)]
pub use image_storage::MockImageStorage;
pub use image_storage::{ImageStorage, ImageStorageError, StoredObject};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{
    FIXTURE_LOGIN_EMAIL, FIXTURE_LOGIN_PASSWORD, FIXTURE_USER_ID, FixtureLoginService,
    LoginService,
};
#[cfg(test)]
pub use price_catalogue_query::MockPriceCatalogueQuery;
pub use price_catalogue_query::PriceCatalogueQuery;
#[cfg(test)]
pub use price_catalogue_repository::MockPriceCatalogueRepository;
pub use price_catalogue_repository::{PriceCatalogueRepository, PriceCatalogueRepositoryError};
#[cfg(test)]
pub use price_source::MockPriceSource;
pub use price_source::{PriceSource, PriceSourceError};
#[cfg(test)]
pub use price_sync_command::MockPriceSyncCommand;
pub use price_sync_command::PriceSyncCommand;
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::{FixtureProfileCommand, ProfileCommand};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use waitlist_command::MockWaitlistCommand;
pub use waitlist_command::{FixtureWaitlistCommand, WaitlistCommand};
#[cfg(test)]
pub use waitlist_repository::MockWaitlistRepository;
pub use waitlist_repository::{WaitlistRepository, WaitlistRepositoryError};
