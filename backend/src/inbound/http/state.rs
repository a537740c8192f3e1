//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::DEFAULT_MAX_UPLOAD_BYTES;
use crate::domain::ports::{
    AccountCommand, CardGradingCommand, CardIdentificationQuery, CollectionCommand,
    CollectionQuery, CreditsQuery, FixtureAccountCommand, FixtureCardGradingCommand,
    FixtureCardIdentificationQuery, FixtureCollectionCommand, FixtureCollectionQuery,
    FixtureCreditsQuery, FixtureLoginService, FixtureProfileCommand, FixtureWaitlistCommand,
    LoginService, ProfileCommand, WaitlistCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub grading: Arc<dyn CardGradingCommand>,
    pub identification: Arc<dyn CardIdentificationQuery>,
    pub collection: Arc<dyn CollectionCommand>,
    pub collection_query: Arc<dyn CollectionQuery>,
    pub credits: Arc<dyn CreditsQuery>,
    pub profiles: Arc<dyn ProfileCommand>,
    pub waitlist: Arc<dyn WaitlistCommand>,
    pub accounts: Arc<dyn AccountCommand>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            grading: Arc::new(FixtureCardGradingCommand),
            identification: Arc::new(FixtureCardIdentificationQuery),
            collection: Arc::new(FixtureCollectionCommand),
            collection_query: Arc::new(FixtureCollectionQuery),
            credits: Arc::new(FixtureCreditsQuery),
            profiles: Arc::new(FixtureProfileCommand),
            waitlist: Arc::new(FixtureWaitlistCommand),
            accounts: Arc::new(FixtureAccountCommand),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub grading: Arc<dyn CardGradingCommand>,
    pub identification: Arc<dyn CardIdentificationQuery>,
    pub collection: Arc<dyn CollectionCommand>,
    pub collection_query: Arc<dyn CollectionQuery>,
    pub credits: Arc<dyn CreditsQuery>,
    pub profiles: Arc<dyn ProfileCommand>,
    pub waitlist: Arc<dyn WaitlistCommand>,
    pub accounts: Arc<dyn AccountCommand>,
    /// Largest image body accepted before answering `413`.
    pub max_upload_bytes: usize,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with the default upload limit.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use tcg_backend::domain::ports::FixtureCreditsQuery;
    /// use tcg_backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let ports = HttpStatePorts {
    ///     credits: Arc::new(FixtureCreditsQuery),
    ///     ..HttpStatePorts::default()
    /// };
    /// let state = HttpState::new(ports).with_upload_limit(1024);
    /// assert_eq!(state.max_upload_bytes, 1024);
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            grading,
            identification,
            collection,
            collection_query,
            credits,
            profiles,
            waitlist,
            accounts,
        } = ports;
        Self {
            login,
            grading,
            identification,
            collection,
            collection_query,
            credits,
            profiles,
            waitlist,
            accounts,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the accepted image body size.
    #[must_use]
    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
