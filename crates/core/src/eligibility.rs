//! Eligibility predicates applied to every normalized record before it may be
//! selected.

use crate::types::{CatalogItem, Tag};

/// Combined availability and exclusion-tag predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EligibilityFilter {
    excluded_tag: Option<i64>,
}

impl EligibilityFilter {
    /// Filter that only checks availability.
    pub fn availability_only() -> Self {
        Self::default()
    }

    pub fn excluding(tag_id: Option<i64>) -> Self {
        Self {
            excluded_tag: tag_id,
        }
    }

    pub fn excluded_tag(&self) -> Option<i64> {
        self.excluded_tag
    }

    pub fn admits(&self, item: &CatalogItem) -> bool {
        if !item.availability.is_available() {
            return false;
        }
        match self.excluded_tag {
            Some(tag_id) => !item.has_tag(tag_id),
            None => true,
        }
    }

    pub fn apply(&self, items: Vec<CatalogItem>) -> Vec<CatalogItem> {
        items.into_iter().filter(|item| self.admits(item)).collect()
    }
}

/// Find the id of the tag whose label matches exactly.
pub fn find_tag_id(tags: &[Tag], label: &str) -> Option<i64> {
    if label.is_empty() {
        return None;
    }
    tags.iter().find(|tag| tag.label == label).map(|tag| tag.id)
}
