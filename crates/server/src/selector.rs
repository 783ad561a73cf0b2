//! Random pick use case: list the eligible catalog, choose one record
//! uniformly, then resolve its poster.

use std::sync::Arc;

use rand::Rng;
use sommelierr_catalog::{CatalogError, CatalogProvider, PosterResolver};
use sommelierr_core::{CatalogItem, CatalogKind};
use tracing::{debug, info};

/// Source of uniformly distributed indices.
pub trait IndexSource: Send + Sync {
    /// Return an index in `0..len`. Callers guarantee `len >= 1`.
    fn pick_index(&self, len: usize) -> usize;
}

/// Process-wide thread-local RNG. Not cryptographically secure.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

pub struct RandomPick {
    provider: Arc<dyn CatalogProvider>,
    posters: PosterResolver,
    indices: Arc<dyn IndexSource>,
}

impl RandomPick {
    pub fn new(provider: Arc<dyn CatalogProvider>, posters: PosterResolver) -> Self {
        Self {
            provider,
            posters,
            indices: Arc::new(ThreadRngSource),
        }
    }

    pub fn with_index_source(mut self, indices: Arc<dyn IndexSource>) -> Self {
        self.indices = indices;
        self
    }

    pub fn kind(&self) -> CatalogKind {
        self.provider.kind()
    }

    pub async fn pick(&self) -> Result<CatalogItem, CatalogError> {
        let kind = self.provider.kind();
        let mut items = self.provider.list_available().await?;
        if items.is_empty() {
            debug!(kind = %kind, "no eligible items");
            return Err(CatalogError::NoItemsAvailable(kind));
        }

        let index = self.indices.pick_index(items.len()).min(items.len() - 1);
        let mut item = items.swap_remove(index);
        item.poster = self.posters.resolve(self.provider.as_ref(), &item).await?;

        info!(
            kind = %kind,
            id = item.id,
            title = %item.title,
            eligible = items.len() + 1,
            "picked"
        );
        Ok(item)
    }
}
