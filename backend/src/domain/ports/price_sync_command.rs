//! Driving port for catalogue price synchronisation.

use async_trait::async_trait;

use crate::domain::{Error, PriceSyncReport, PriceSyncRequest};

/// Price synchronisation use-case, run from the `sync-prices` command.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSyncCommand: Send + Sync {
    /// Synchronise prices for the requested sets.
    ///
    /// Per-set and per-product failures are counted in the report; only a
    /// failure to enumerate sets is returned as an error.
    async fn sync_prices(&self, request: PriceSyncRequest) -> Result<PriceSyncReport, Error>;
}
