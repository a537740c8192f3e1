//! TCGCSV price feed adapter used by the price synchronisation job.

mod dto;
mod http_source;

pub use http_source::TcgcsvHttpSource;
