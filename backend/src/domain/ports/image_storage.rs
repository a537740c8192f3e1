//! Driven port for object storage holding card photos and overlays.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by storage adapters.
    pub enum ImageStorageError {
        /// No object at the requested path.
        NotFound { path: String } => "stored object not found: {path}",
        /// The storage service refused the request.
        Rejected { message: String } => "storage request rejected: {message}",
        /// The request timed out.
        Timeout { message: String } => "storage request timed out: {message}",
        /// Network or server failure.
        Transport { message: String } => "storage transport failed: {message}",
    }
}

/// An object written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Path within the bucket.
    pub path: String,
    /// URL clients can load the object from.
    pub public_url: String,
}

/// Object storage keyed by bucket-relative paths such as
/// `{user}/{card}/front.jpg`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Write (or overwrite) an object.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, ImageStorageError>;

    /// Read an object's bytes.
    async fn download(&self, path: &str) -> Result<Vec<u8>, ImageStorageError>;

    /// Remove every object under `prefix`; returns how many were removed.
    async fn remove_prefix(&self, prefix: &str) -> Result<u64, ImageStorageError>;
}
