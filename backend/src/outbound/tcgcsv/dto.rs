//! DTOs for decoding TCGCSV price responses.
//!
//! The feed answers with a bare list of price entries or with the list
//! wrapped in `results` (or `data`). Entries are kept verbatim; only the
//! product id is lifted out.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::PriceEntry;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum PriceResponseDto {
    List(Vec<Value>),
    Results { results: Vec<Value> },
    Data { data: Vec<Value> },
}

impl PriceResponseDto {
    pub(super) fn into_entries(self) -> Vec<PriceEntry> {
        let entries = match self {
            Self::List(entries) | Self::Results { results: entries } | Self::Data { data: entries } => {
                entries
            }
        };
        entries
            .into_iter()
            .map(|payload| PriceEntry {
                product_id: payload.get("productId").and_then(product_id),
                payload,
            })
            .collect()
    }
}

/// Integer id, or a string holding one. Zero counts as absent.
fn product_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id != 0)
}

pub(super) fn decode_prices(body: &[u8]) -> Result<Vec<PriceEntry>, String> {
    serde_json::from_slice::<PriceResponseDto>(body)
        .map(PriceResponseDto::into_entries)
        .map_err(|_| "expected a list or an object with results/data".to_owned())
}
