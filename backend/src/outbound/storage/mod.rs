//! Object storage adapter for card photos and grading overlays.

mod http_storage;

pub use http_storage::{HttpImageStorage, StorageConfig};
