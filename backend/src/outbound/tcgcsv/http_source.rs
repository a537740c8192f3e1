//! Reqwest-backed TCGCSV price source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode, Url};

use super::dto::decode_prices;
use crate::domain::PriceEntry;
use crate::domain::ports::{PriceSource, PriceSourceError};
use crate::outbound::http_support::{StatusClass, classify_status, status_message};

/// TCGplayer category id for Pokémon.
const POKEMON_CATEGORY_ID: u32 = 3;
const DEFAULT_USER_AGENT: &str = "tcg-backend-price-sync/0.1";

/// Price source reading `{base}/tcgplayer/3/{group_id}/prices`.
pub struct TcgcsvHttpSource {
    client: Client,
    base: String,
}

impl TcgcsvHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    fn prices_url(&self, group_id: i64) -> String {
        format!(
            "{}/tcgplayer/{POKEMON_CATEGORY_ID}/{group_id}/prices",
            self.base
        )
    }
}

#[async_trait]
impl PriceSource for TcgcsvHttpSource {
    async fn fetch_prices(&self, group_id: i64) -> Result<Vec<PriceEntry>, PriceSourceError> {
        let response = self
            .client
            .get(self.prices_url(group_id))
            .header(USER_AGENT, DEFAULT_USER_AGENT)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode_prices(body.as_ref()).map_err(PriceSourceError::decode)
    }
}

fn map_transport_error(error: reqwest::Error) -> PriceSourceError {
    if error.is_timeout() {
        PriceSourceError::timeout(error.to_string())
    } else {
        PriceSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PriceSourceError {
    let message = status_message(status, body);
    match classify_status(status) {
        StatusClass::Timeout => PriceSourceError::timeout(message),
        StatusClass::NotFound | StatusClass::Client => PriceSourceError::invalid_request(message),
        StatusClass::RateLimited | StatusClass::Server => PriceSourceError::transport(message),
    }
}
