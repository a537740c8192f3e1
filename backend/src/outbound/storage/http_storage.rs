//! Reqwest-backed object storage adapter for a Supabase-style storage API.
//!
//! Objects live in one bucket; paths are bucket-relative. Removing a prefix
//! lists it recursively first because the delete endpoint only accepts exact
//! object names.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{ImageStorage, ImageStorageError, StoredObject};
use crate::outbound::http_support::{StatusClass, classify_status, status_message};

const LIST_PAGE_SIZE: usize = 1000;

/// Connection settings for [`HttpImageStorage`].
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage API root, e.g. `https://project.supabase.co/storage/v1`.
    pub base_url: Url,
    /// Bucket holding card photos and overlays.
    pub bucket: String,
    /// Service key sent as a bearer token.
    pub service_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Image storage adapter over HTTP.
pub struct HttpImageStorage {
    client: Client,
    base: String,
    bucket: String,
    service_key: String,
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
    /// `null` for folders.
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

impl HttpImageStorage {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStorageError::Transport`] when the client cannot be
    /// constructed.
    pub fn new(config: StorageConfig) -> Result<Self, ImageStorageError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ImageStorageError::transport(err.to_string()))?;
        Ok(Self {
            client,
            base: config.base_url.as_str().trim_end_matches('/').to_owned(),
            bucket: config.bucket,
            service_key: config.service_key,
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.base, self.bucket, path.trim_start_matches('/'))
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.base,
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {}", self.service_key))
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Vec<u8>, ImageStorageError> {
        let response = self
            .authorised(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref(), path));
        }
        Ok(body.to_vec())
    }

    async fn list_page(
        &self,
        prefix: &str,
        offset: usize,
    ) -> Result<Vec<ListedObject>, ImageStorageError> {
        let url = format!("{}/object/list/{}", self.base, self.bucket);
        let request = self.client.post(url).json(&ListRequest {
            prefix,
            limit: LIST_PAGE_SIZE,
            offset,
        });
        let body = self.send(request, prefix).await?;
        serde_json::from_slice(&body)
            .map_err(|err| ImageStorageError::transport(format!("invalid listing payload: {err}")))
    }

    /// Every object path under `prefix`, descending into folders.
    async fn collect_paths(&self, prefix: &str) -> Result<Vec<String>, ImageStorageError> {
        let mut pending = vec![prefix.trim_end_matches('/').to_owned()];
        let mut paths = Vec::new();
        while let Some(folder) = pending.pop() {
            let mut offset = 0;
            loop {
                let page = self.list_page(&folder, offset).await?;
                let fetched = page.len();
                for entry in page {
                    let full = format!("{folder}/{}", entry.name);
                    if entry.id.is_some() {
                        paths.push(full);
                    } else {
                        pending.push(full);
                    }
                }
                if fetched < LIST_PAGE_SIZE {
                    break;
                }
                offset += fetched;
            }
        }
        Ok(paths)
    }
}

#[async_trait]
impl ImageStorage for HttpImageStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, ImageStorageError> {
        let request = self
            .client
            .put(self.object_url(path))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes);
        self.send(request, path).await?;
        Ok(StoredObject {
            path: path.to_owned(),
            public_url: self.public_url(path),
        })
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, ImageStorageError> {
        self.send(self.client.get(self.object_url(path)), path).await
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<u64, ImageStorageError> {
        let paths = self.collect_paths(prefix).await?;
        if paths.is_empty() {
            return Ok(0);
        }
        let url = format!("{}/object/{}", self.base, self.bucket);
        let request = self
            .client
            .delete(url)
            .json(&RemoveRequest { prefixes: &paths });
        self.send(request, prefix).await?;
        debug!(prefix, removed = paths.len(), "removed stored objects");
        Ok(u64::try_from(paths.len()).unwrap_or(u64::MAX))
    }
}

fn map_transport_error(error: reqwest::Error) -> ImageStorageError {
    if error.is_timeout() {
        ImageStorageError::timeout(error.to_string())
    } else {
        ImageStorageError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8], path: &str) -> ImageStorageError {
    let message = status_message(status, body);
    match classify_status(status) {
        StatusClass::NotFound => ImageStorageError::not_found(path),
        StatusClass::Timeout => ImageStorageError::timeout(message),
        StatusClass::RateLimited | StatusClass::Client => ImageStorageError::rejected(message),
        StatusClass::Server => ImageStorageError::transport(message),
    }
}
