use sommelierr_core::poster::proxy_reference;
use sommelierr_core::{CatalogItem, PosterPolicy, PosterRef, PosterSource};

use crate::CatalogError;
use crate::provider::CatalogProvider;

/// Turns a record's poster source into the public reference, following the
/// deployment-wide [`PosterPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PosterResolver {
    policy: PosterPolicy,
}

impl PosterResolver {
    pub fn new(policy: PosterPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PosterPolicy {
        self.policy
    }

    pub async fn resolve(
        &self,
        provider: &dyn CatalogProvider,
        item: &CatalogItem,
    ) -> Result<PosterRef, CatalogError> {
        let Some(source) = &item.poster_source else {
            return Ok(PosterRef::None);
        };

        match (source, self.policy) {
            (PosterSource::Remote(url), _) => Ok(PosterRef::Remote(url.clone())),
            (PosterSource::Local(path), PosterPolicy::Proxy) => {
                Ok(PosterRef::Proxy(proxy_reference(item.kind, path)))
            }
            (PosterSource::Local(path), PosterPolicy::Inline) => provider
                .fetch_poster(item.id, path)
                .await
                .map(PosterRef::Inline),
        }
    }
}
