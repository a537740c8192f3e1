//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories and the credit ledger (Diesel)
//! - **storage**: object storage for card photos and overlays (reqwest)
//! - **grading_api**: grading and identification service client (reqwest)
//! - **auth**: managed authentication service login (reqwest)
//! - **tcgcsv**: TCGplayer price feed for the price sync job (reqwest)
//!
//! Adapters are thin translators between domain types and wire or row
//! representations. They contain no business logic.

pub mod auth;
pub mod grading_api;
mod http_support;
pub mod persistence;
pub mod storage;
pub mod tcgcsv;
