pub mod arr;
pub mod poster;
pub mod provider;
mod wire;

pub use arr::{ArrClient, ArrEndpoint, build_http_client};
pub use poster::PosterResolver;
pub use provider::CatalogProvider;

use sommelierr_core::CatalogKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{} returned {status}", .kind.upstream())]
    Upstream { kind: CatalogKind, status: u16 },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("tag lookup failed: {0}")]
    TagLookup(String),
    #[error("no available {0} found")]
    NoItemsAvailable(CatalogKind),
    #[error("image request rejected: {0}")]
    ImagePathRejected(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Transport-level failure. The URL is dropped from the message so
    /// upstream hosts and credentials never reach the caller.
    pub fn network(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Network("upstream request timed out".to_string());
        }
        Self::Network(err.without_url().to_string())
    }
}
