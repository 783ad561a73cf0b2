use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::poster::{PosterRef, PosterSource};

/// Upstream API version shared by both media managers.
pub const API_VERSION: &str = "v3";

/// The two parallel upstream catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Movie,
    Series,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 2] = [CatalogKind::Movie, CatalogKind::Series];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }

    /// Name of the media manager serving this catalog. Doubles as the
    /// `redirectTo` value understood by the image proxy.
    pub fn upstream(self) -> &'static str {
        match self {
            Self::Movie => "radarr",
            Self::Series => "sonarr",
        }
    }

    pub fn from_upstream(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.upstream() == name)
    }

    /// Relative path of the catalog listing endpoint.
    pub fn catalog_path(self) -> String {
        format!("/api/{API_VERSION}/{}", self.as_str())
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability signal reported by the upstream for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Availability {
    /// Movies: whether a file is stored on disk.
    HasFile(bool),
    /// Series: percentage of episodes present; `0` means none.
    EpisodePercent(f64),
}

impl Availability {
    pub fn is_available(self) -> bool {
        match self {
            Self::HasFile(has_file) => has_file,
            Self::EpisodePercent(percent) => percent > 0.0,
        }
    }
}

/// One artwork entry attached to a catalog record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub cover_type: String,
    pub local_path: Option<String>,
    pub remote_url: Option<String>,
}

/// Upstream tag: id plus human label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    #[serde(default)]
    pub label: String,
}

/// Normalized movie or series record.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: i64,
    pub kind: CatalogKind,
    pub title: String,
    pub original_title: Option<String>,
    pub year: i32,
    pub overview: Option<String>,
    pub tags: Vec<i64>,
    pub availability: Availability,
    pub images: Vec<ImageDescriptor>,
    /// Zero (Unix epoch) when the upstream value did not parse.
    pub added: DateTime<Utc>,
    pub source_url: String,
    /// First poster descriptor, picked during normalization.
    pub poster_source: Option<PosterSource>,
    /// Public poster reference, filled in by the poster resolver.
    pub poster: PosterRef,
}

impl CatalogItem {
    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tags.contains(&tag_id)
    }
}
