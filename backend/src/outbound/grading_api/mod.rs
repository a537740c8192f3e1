//! Grading and identification API adapter.
//!
//! This module provides a thin HTTP implementation of the `GradingProvider`
//! port.

mod dto;
mod http_client;

pub use http_client::GradingApiHttpClient;
