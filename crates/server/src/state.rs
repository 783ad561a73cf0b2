use std::sync::Arc;

use sommelierr_catalog::{ArrClient, ArrEndpoint, CatalogError, PosterResolver, build_http_client};
use sommelierr_core::CatalogKind;

use crate::config::AppConfig;
use crate::image_proxy::ImageProxy;
use crate::selector::RandomPick;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<RandomPick>,
    pub series: Arc<RandomPick>,
    pub images: Arc<ImageProxy>,
}

impl AppState {
    /// Wire one catalog client per upstream plus the image proxy. All of them
    /// share a single connection pool and timeout.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let client = build_http_client(config.upstream_timeout)?;
        let posters = PosterResolver::new(config.poster_policy);

        let endpoint = |kind: CatalogKind| {
            let upstream = config.upstream(kind);
            ArrEndpoint::new(kind, upstream.base_url.clone(), upstream.api_key.clone())
        };
        let picker = |kind: CatalogKind| {
            let provider = ArrClient::with_client(
                endpoint(kind),
                config.upstream(kind).exclude_label.clone(),
                client.clone(),
            );
            Arc::new(RandomPick::new(Arc::new(provider), posters))
        };

        Ok(Self {
            movies: picker(CatalogKind::Movie),
            series: picker(CatalogKind::Series),
            images: Arc::new(ImageProxy::new(
                client.clone(),
                endpoint(CatalogKind::Movie),
                endpoint(CatalogKind::Series),
            )),
        })
    }

    pub fn picker(&self, kind: CatalogKind) -> &RandomPick {
        match kind {
            CatalogKind::Movie => &self.movies,
            CatalogKind::Series => &self.series,
        }
    }
}
