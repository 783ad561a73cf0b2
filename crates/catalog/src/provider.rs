use sommelierr_core::{CatalogItem, CatalogKind};

use crate::CatalogError;

/// An upstream catalog that can list its selectable records.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    fn kind(&self) -> CatalogKind;

    /// List records that pass the eligibility filter. Ineligible records are
    /// never returned.
    async fn list_available(&self) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Fetch a poster from the upstream media-cover endpoint and return it as
    /// a `data:` URI.
    async fn fetch_poster(&self, item_id: i64, local_path: &str) -> Result<String, CatalogError>;
}
