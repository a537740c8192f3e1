//! Trading card grading backend.
//!
//! - [`domain`]: card, grading, credit and profile types plus the services
//!   implementing the driving ports.
//! - [`inbound`]: the Actix HTTP adapter.
//! - [`outbound`]: PostgreSQL, object storage, grading API, auth and price
//!   feed adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
