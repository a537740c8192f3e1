//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Credit and profile writes go through the stored
//! procedures created by the embedded migrations.
//!
//! # Example
//!
//! ```ignore
//! use tcg_backend::outbound::persistence::{DbPool, DieselCardRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/cards")).await?;
//! let cards = DieselCardRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_basic_error_mapping;
mod diesel_card_repository;
mod diesel_credit_ledger;
mod diesel_grading_record_repository;
mod diesel_price_catalogue_repository;
mod diesel_profile_repository;
mod diesel_waitlist_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_card_repository::DieselCardRepository;
pub use diesel_credit_ledger::DieselCreditLedger;
pub use diesel_grading_record_repository::DieselGradingRecordRepository;
pub use diesel_price_catalogue_repository::DieselPriceCatalogueRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_waitlist_repository::DieselWaitlistRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
