//! Poster relay for proxy references emitted by the poster resolver.
//!
//! Only media-cover poster paths are forwarded; anything else is rejected
//! before an upstream request is made. Credentials are attached here and
//! never leave the server.

use std::sync::LazyLock;

use axum::body::Body;
use axum::http::HeaderMap;
use axum::http::header::{self, HeaderName};
use axum::response::Response;
use regex::Regex;
use sommelierr_catalog::{ArrEndpoint, CatalogError};
use sommelierr_core::CatalogKind;
use tracing::debug;

static MEDIA_COVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/MediaCover/[0-9]+/poster\.jpg$").unwrap());

/// Headers that describe a single connection and must not be relayed.
fn hop_by_hop() -> [HeaderName; 7] {
    [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ]
}

/// Request headers the browser uses for revalidation and partial fetches.
fn forwarded() -> [HeaderName; 5] {
    [
        header::IF_NONE_MATCH,
        header::IF_MODIFIED_SINCE,
        header::IF_MATCH,
        header::IF_RANGE,
        header::RANGE,
    ]
}

/// Copy the forwardable subset of the caller's headers.
pub fn forwarded_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in forwarded() {
        for value in incoming.get_all(&name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

pub struct ImageProxy {
    client: reqwest::Client,
    movies: ArrEndpoint,
    series: ArrEndpoint,
}

impl ImageProxy {
    pub fn new(client: reqwest::Client, movies: ArrEndpoint, series: ArrEndpoint) -> Self {
        Self {
            client,
            movies,
            series,
        }
    }

    /// Check the redirect target and path against the allow-list.
    pub fn validate(redirect_to: &str, path: &str) -> Result<CatalogKind, CatalogError> {
        let kind = CatalogKind::from_upstream(redirect_to).ok_or_else(|| {
            CatalogError::ImagePathRejected(format!("invalid redirectTo '{redirect_to}'"))
        })?;
        if !MEDIA_COVER_RE.is_match(path) {
            return Err(CatalogError::ImagePathRejected(format!(
                "invalid path '{path}'"
            )));
        }
        Ok(kind)
    }

    fn endpoint(&self, kind: CatalogKind) -> &ArrEndpoint {
        match kind {
            CatalogKind::Movie => &self.movies,
            CatalogKind::Series => &self.series,
        }
    }

    /// Validate and forward the request to the matching upstream host,
    /// carrying the caller's conditional and range headers.
    pub async fn fetch(
        &self,
        redirect_to: &str,
        path: &str,
        incoming: &HeaderMap,
    ) -> Result<reqwest::Response, CatalogError> {
        let kind = Self::validate(redirect_to, path)?;
        let resp = self
            .endpoint(kind)
            .get(&self.client, path)?
            .headers(forwarded_headers(incoming))
            .send()
            .await
            .map_err(CatalogError::network)?;
        debug!(upstream = kind.upstream(), status = %resp.status(), "image relayed");
        Ok(resp)
    }
}

/// Convert an upstream response into a streamed response, keeping status and
/// end-to-end headers.
pub fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    for name in hop_by_hop() {
        headers.remove(&name);
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
