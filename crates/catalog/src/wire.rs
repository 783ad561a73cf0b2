//! Permissive decode of upstream catalog records. Every field is optional so
//! that shape drift between upstream versions degrades to defaults.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sommelierr_core::poster::select_poster;
use sommelierr_core::{Availability, CatalogItem, CatalogKind, ImageDescriptor, PosterRef};

use crate::arr::ArrEndpoint;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct WireRecord {
    id: Option<i64>,
    title: Option<String>,
    original_title: Option<String>,
    title_slug: Option<String>,
    year: Option<i32>,
    overview: Option<String>,
    tags: Option<Vec<i64>>,
    images: Option<Vec<WireImage>>,
    added: Option<String>,
    has_file: Option<bool>,
    statistics: Option<WireStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireImage {
    cover_type: Option<String>,
    url: Option<String>,
    remote_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireStatistics {
    percent_of_episodes: Option<f64>,
}

impl WireRecord {
    pub(crate) fn normalize(self, endpoint: &ArrEndpoint) -> CatalogItem {
        let kind = endpoint.kind();
        let availability = match kind {
            CatalogKind::Movie => Availability::HasFile(self.has_file.unwrap_or(false)),
            CatalogKind::Series => Availability::EpisodePercent(
                self.statistics
                    .and_then(|s| s.percent_of_episodes)
                    .unwrap_or(0.0),
            ),
        };

        let images: Vec<ImageDescriptor> = self
            .images
            .unwrap_or_default()
            .into_iter()
            .map(|img| ImageDescriptor {
                cover_type: img.cover_type.unwrap_or_default(),
                local_path: img.url,
                remote_url: img.remote_url,
            })
            .collect();

        CatalogItem {
            id: self.id.unwrap_or(0),
            kind,
            title: self.title.unwrap_or_default(),
            original_title: self.original_title.filter(|t| !t.is_empty()),
            year: self.year.unwrap_or(0),
            overview: self.overview.filter(|o| !o.is_empty()),
            tags: self.tags.unwrap_or_default(),
            availability,
            added: parse_added(self.added.as_deref()),
            source_url: endpoint.source_url(self.title_slug.as_deref().unwrap_or_default()),
            poster_source: select_poster(&images),
            images,
            poster: PosterRef::None,
        }
    }
}

fn parse_added(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sommelierr_core::PosterSource;
    use url::Url;

    fn endpoint(kind: CatalogKind, base: &str) -> ArrEndpoint {
        ArrEndpoint::new(kind, Url::parse(base).unwrap(), "secret")
    }

    #[test]
    fn normalizes_movie_record() {
        let json = serde_json::json!({
            "id": 12,
            "title": "The Matrix",
            "originalTitle": "The Matrix",
            "titleSlug": "the-matrix-603",
            "year": 1999,
            "overview": "Neo learns the truth.",
            "tags": [1, 4],
            "hasFile": true,
            "added": "2023-05-01T10:20:30Z",
            "images": [
                { "coverType": "fanart", "url": "/MediaCover/12/fanart.jpg" },
                { "coverType": "poster", "url": "/MediaCover/12/poster.jpg?lastWrite=1", "remoteUrl": "https://image.tmdb.org/p.jpg" }
            ],
            "qualityProfileId": 4,
            "monitored": true
        });
        let record: WireRecord = serde_json::from_value(json).unwrap();
        let item = record.normalize(&endpoint(CatalogKind::Movie, "http://radarr:7878"));

        assert_eq!(item.id, 12);
        assert_eq!(item.kind, CatalogKind::Movie);
        assert_eq!(item.title, "The Matrix");
        assert_eq!(item.original_title.as_deref(), Some("The Matrix"));
        assert_eq!(item.year, 1999);
        assert_eq!(item.tags, vec![1, 4]);
        assert_eq!(item.availability, Availability::HasFile(true));
        assert_eq!(item.added.to_rfc3339(), "2023-05-01T10:20:30+00:00");
        assert_eq!(item.source_url, "http://radarr:7878/movie/the-matrix-603");
        assert_eq!(item.images.len(), 2);
        assert_eq!(
            item.poster_source,
            Some(PosterSource::Local("/MediaCover/12/poster.jpg?lastWrite=1".into()))
        );
    }

    #[test]
    fn normalizes_series_record() {
        let json = serde_json::json!({
            "id": 3,
            "title": "Severance",
            "titleSlug": "severance",
            "year": 2022,
            "statistics": { "percentOfEpisodes": 42.5, "episodeCount": 9 },
            "images": [
                { "coverType": "poster", "remoteUrl": "https://artworks.thetvdb.com/s.jpg" }
            ]
        });
        let record: WireRecord = serde_json::from_value(json).unwrap();
        let item = record.normalize(&endpoint(CatalogKind::Series, "http://sonarr:8989/sonarr/"));

        assert_eq!(item.availability, Availability::EpisodePercent(42.5));
        assert_eq!(item.source_url, "http://sonarr:8989/sonarr/series/severance");
        assert_eq!(item.overview, None);
        assert_eq!(
            item.poster_source,
            Some(PosterSource::Remote("https://artworks.thetvdb.com/s.jpg".into()))
        );
    }

    #[test]
    fn missing_and_null_fields_default() {
        let json = serde_json::json!({
            "id": 5,
            "title": null,
            "overview": "",
            "tags": null,
            "images": null,
            "added": "not a date"
        });
        let record: WireRecord = serde_json::from_value(json).unwrap();
        let item = record.normalize(&endpoint(CatalogKind::Series, "http://sonarr:8989"));

        assert_eq!(item.title, "");
        assert_eq!(item.overview, None);
        assert!(item.tags.is_empty());
        assert!(item.images.is_empty());
        assert_eq!(item.added, DateTime::<Utc>::default());
        assert_eq!(item.availability, Availability::EpisodePercent(0.0));
        assert_eq!(item.poster_source, None);
    }

    #[test]
    fn movie_without_has_file_is_unavailable() {
        let record: WireRecord = serde_json::from_value(serde_json::json!({ "id": 1 })).unwrap();
        let item = record.normalize(&endpoint(CatalogKind::Movie, "http://radarr:7878"));
        assert!(!item.availability.is_available());
    }
}
