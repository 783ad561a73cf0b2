//! Client for the Radarr/Sonarr family of media managers. Both expose the same
//! v3 JSON API shape, so one client type serves either catalog kind.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use sommelierr_core::eligibility::find_tag_id;
use sommelierr_core::poster::{cover_file_name, data_uri};
use sommelierr_core::types::API_VERSION;
use sommelierr_core::{CatalogItem, CatalogKind, EligibilityFilter, Tag};
use tracing::{debug, warn};
use url::Url;

use crate::provider::CatalogProvider;
use crate::wire::WireRecord;
use crate::CatalogError;

pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Build the shared HTTP client with a fixed per-request budget.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, CatalogError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(CatalogError::network)
}

/// Base URL and credentials for one upstream manager.
#[derive(Clone)]
pub struct ArrEndpoint {
    kind: CatalogKind,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for ArrEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrEndpoint")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ArrEndpoint {
    pub fn new(kind: CatalogKind, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an absolute upstream path against the base URL. Paths start at
    /// the host root, so a base path such as `/radarr/` is not kept here,
    /// unlike [`ArrEndpoint::source_url`] which appends to it.
    pub fn url(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Authenticated GET request for `path`.
    pub fn get(
        &self,
        client: &reqwest::Client,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, CatalogError> {
        let url = self.url(path)?;
        debug!(upstream = self.kind.upstream(), url = %url, "upstream request");
        Ok(client.get(url).header(API_KEY_HEADER, &self.api_key))
    }

    /// Link to the record's page in the upstream web UI.
    pub fn source_url(&self, slug: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(self.kind.as_str()).push(slug);
        }
        url.to_string()
    }
}

/// Catalog client for one upstream manager.
pub struct ArrClient {
    endpoint: ArrEndpoint,
    exclude_label: String,
    client: reqwest::Client,
}

impl ArrClient {
    pub fn new(
        endpoint: ArrEndpoint,
        exclude_label: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        Ok(Self::with_client(
            endpoint,
            exclude_label,
            build_http_client(timeout)?,
        ))
    }

    pub fn with_client(
        endpoint: ArrEndpoint,
        exclude_label: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            endpoint,
            exclude_label: exclude_label.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &ArrEndpoint {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let resp = self
            .endpoint
            .get(&self.client, path)?
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(CatalogError::network)?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            return Err(CatalogError::Upstream {
                kind: self.endpoint.kind,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(CatalogError::network)?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Decode(format!("{path}: {e}")))
    }

    async fn fetch_tags(&self) -> Result<Vec<Tag>, CatalogError> {
        self.get_json(&format!("/api/{API_VERSION}/tag"))
            .await
            .map_err(|e| CatalogError::TagLookup(e.to_string()))
    }

    /// Resolve the configured exclusion label to a tag id. Any failure turns
    /// the exclusion off instead of failing the listing.
    async fn excluded_tag_id(&self) -> Option<i64> {
        if self.exclude_label.is_empty() {
            return None;
        }

        match self.fetch_tags().await {
            Ok(tags) => {
                let id = find_tag_id(&tags, &self.exclude_label);
                if id.is_none() {
                    warn!(
                        upstream = self.endpoint.kind.upstream(),
                        label = %self.exclude_label,
                        "exclusion tag not found; exclusion disabled"
                    );
                }
                id
            }
            Err(e) => {
                warn!(
                    upstream = self.endpoint.kind.upstream(),
                    error = %e,
                    "exclusion disabled"
                );
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for ArrClient {
    fn kind(&self) -> CatalogKind {
        self.endpoint.kind
    }

    async fn list_available(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        let records: Vec<WireRecord> = self.get_json(&self.endpoint.kind.catalog_path()).await?;
        let total = records.len();

        let filter = EligibilityFilter::excluding(self.excluded_tag_id().await);
        let items: Vec<CatalogItem> = records
            .into_iter()
            .map(|record| record.normalize(&self.endpoint))
            .filter(|item| filter.admits(item))
            .collect();

        debug!(
            upstream = self.endpoint.kind.upstream(),
            total,
            eligible = items.len(),
            excluded_tag = ?filter.excluded_tag(),
            "catalog listed"
        );
        Ok(items)
    }

    async fn fetch_poster(&self, item_id: i64, local_path: &str) -> Result<String, CatalogError> {
        let path = format!(
            "/api/{API_VERSION}/mediacover/{item_id}/{}",
            cover_file_name(local_path)
        );
        let resp = self
            .endpoint
            .get(&self.client, &path)?
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(CatalogError::network)?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            return Err(CatalogError::Upstream {
                kind: self.endpoint.kind,
                status: status.as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await.map_err(CatalogError::network)?;

        Ok(data_uri(&content_type, &STANDARD.encode(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_resolves_absolute_paths() {
        let endpoint = ArrEndpoint::new(
            CatalogKind::Movie,
            Url::parse("http://radarr:7878/").unwrap(),
            "k",
        );
        assert_eq!(
            endpoint.url("/api/v3/movie").unwrap().as_str(),
            "http://radarr:7878/api/v3/movie"
        );
    }

    #[test]
    fn api_paths_ignore_base_path_but_source_links_keep_it() {
        let endpoint = ArrEndpoint::new(
            CatalogKind::Movie,
            Url::parse("http://host/radarr/").unwrap(),
            "k",
        );
        assert_eq!(
            endpoint.url("/api/v3/movie").unwrap().as_str(),
            "http://host/api/v3/movie"
        );
        assert_eq!(endpoint.source_url("x"), "http://host/radarr/movie/x");
    }

    #[test]
    fn source_url_escapes_slug() {
        let endpoint = ArrEndpoint::new(
            CatalogKind::Series,
            Url::parse("http://sonarr:8989").unwrap(),
            "k",
        );
        assert_eq!(
            endpoint.source_url("the office (us)"),
            "http://sonarr:8989/series/the%20office%20(us)"
        );
    }

    #[test]
    fn debug_output_hides_api_key() {
        let endpoint = ArrEndpoint::new(
            CatalogKind::Movie,
            Url::parse("http://radarr:7878").unwrap(),
            "super-secret",
        );
        let rendered = format!("{endpoint:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
