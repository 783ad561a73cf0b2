//! Poster descriptor selection and public reference rewriting.
//!
//! Selection and proxy rewriting are pure; fetching bytes for inline data URIs
//! happens in the catalog client.

use std::str::FromStr;

use thiserror::Error;

use crate::types::{CatalogKind, ImageDescriptor};

/// Cover type consumed by the resolver. Other artwork kinds are ignored.
pub const POSTER_COVER_TYPE: &str = "poster";

/// Route served by the image proxy.
pub const PROXY_ROUTE: &str = "/image";

/// Where the poster bytes for a record live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosterSource {
    /// Path on the upstream host, e.g. `/MediaCover/12/poster.jpg?lastWrite=1`.
    Local(String),
    /// Absolute, publicly reachable URL.
    Remote(String),
}

/// Public poster reference handed to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PosterRef {
    #[default]
    None,
    Remote(String),
    Proxy(String),
    Inline(String),
}

impl PosterRef {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Remote(s) | Self::Proxy(s) | Self::Inline(s) => Some(s),
        }
    }

    /// Reference usable as an `<img src>` URL (remote or proxied).
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Remote(s) | Self::Proxy(s) => Some(s),
            _ => None,
        }
    }

    /// Inline `data:` URI, if the poster was embedded.
    pub fn data_uri(&self) -> Option<&str> {
        match self {
            Self::Inline(s) => Some(s),
            _ => None,
        }
    }
}

/// How local poster paths are turned into public references. Remote URLs are
/// passed through under every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PosterPolicy {
    /// Rewrite into an `/image?redirectTo=..&path=..` proxy reference.
    #[default]
    Proxy,
    /// Fetch the bytes at selection time and embed them as a data URI.
    Inline,
}

impl PosterPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::Inline => "inline",
        }
    }
}

impl std::fmt::Display for PosterPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown poster policy '{0}', expected 'proxy' or 'inline'")]
pub struct UnknownPosterPolicy(pub String);

impl FromStr for PosterPolicy {
    type Err = UnknownPosterPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proxy" => Ok(Self::Proxy),
            "inline" => Ok(Self::Inline),
            _ => Err(UnknownPosterPolicy(s.to_string())),
        }
    }
}

/// Pick the first poster descriptor. A local path takes precedence over a
/// remote URL on the same descriptor; later poster descriptors are ignored
/// even if the first one is empty.
pub fn select_poster(images: &[ImageDescriptor]) -> Option<PosterSource> {
    let image = images
        .iter()
        .find(|image| image.cover_type == POSTER_COVER_TYPE)?;

    non_empty(image.local_path.as_deref())
        .map(|path| PosterSource::Local(path.to_string()))
        .or_else(|| {
            non_empty(image.remote_url.as_deref()).map(|url| PosterSource::Remote(url.to_string()))
        })
}

/// Build the proxy reference for a local poster path.
pub fn proxy_reference(kind: CatalogKind, local_path: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("redirectTo", kind.upstream())
        .append_pair("path", strip_query(local_path))
        .finish();
    format!("{PROXY_ROUTE}?{query}")
}

/// Drop any `?query` or `#fragment` suffix from an upstream path.
pub fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// File name of a media cover, e.g. `poster.jpg` for
/// `/MediaCover/12/poster.jpg?lastWrite=1`.
pub fn cover_file_name(local_path: &str) -> &str {
    let path = strip_query(local_path);
    path.rsplit('/').next().unwrap_or(path)
}

/// Encode image bytes as a `data:` URI.
pub fn data_uri(content_type: &str, base64_payload: &str) -> String {
    format!("data:{content_type};base64,{base64_payload}")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(cover_type: &str, local: Option<&str>, remote: Option<&str>) -> ImageDescriptor {
        ImageDescriptor {
            cover_type: cover_type.to_string(),
            local_path: local.map(str::to_string),
            remote_url: remote.map(str::to_string),
        }
    }

    #[test]
    fn first_poster_wins() {
        let images = vec![
            image("fanart", Some("/MediaCover/1/fanart.jpg"), None),
            image("poster", None, Some("https://img.example/a.jpg")),
            image("poster", Some("/MediaCover/1/poster.jpg"), None),
        ];
        assert_eq!(
            select_poster(&images),
            Some(PosterSource::Remote("https://img.example/a.jpg".into()))
        );
    }

    #[test]
    fn local_path_preferred_over_remote() {
        let images = vec![image(
            "poster",
            Some("/MediaCover/3/poster.jpg"),
            Some("https://img.example/b.jpg"),
        )];
        assert_eq!(
            select_poster(&images),
            Some(PosterSource::Local("/MediaCover/3/poster.jpg".into()))
        );
    }

    #[test]
    fn empty_descriptor_stops_scan() {
        let images = vec![
            image("poster", Some(""), None),
            image("poster", Some("/MediaCover/1/poster.jpg"), None),
        ];
        assert_eq!(select_poster(&images), None);
    }

    #[test]
    fn no_poster_descriptor() {
        let images = vec![image("banner", Some("/MediaCover/1/banner.jpg"), None)];
        assert_eq!(select_poster(&images), None);
        assert_eq!(select_poster(&[]), None);
    }

    #[test]
    fn proxy_reference_escapes_and_strips_query() {
        let reference = proxy_reference(
            CatalogKind::Movie,
            "/MediaCover/12/poster.jpg?lastWrite=638000000000000000",
        );
        assert_eq!(
            reference,
            "/image?redirectTo=radarr&path=%2FMediaCover%2F12%2Fposter.jpg"
        );
        assert!(proxy_reference(CatalogKind::Series, "/MediaCover/4/poster.jpg")
            .contains("redirectTo=sonarr"));
    }

    #[test]
    fn cover_file_names() {
        assert_eq!(cover_file_name("/MediaCover/12/poster.jpg?lastWrite=1"), "poster.jpg");
        assert_eq!(cover_file_name("poster-500.jpg"), "poster-500.jpg");
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("proxy".parse::<PosterPolicy>(), Ok(PosterPolicy::Proxy));
        assert_eq!(" Inline ".parse::<PosterPolicy>(), Ok(PosterPolicy::Inline));
        assert!("base64".parse::<PosterPolicy>().is_err());
        assert_eq!(PosterPolicy::default(), PosterPolicy::Proxy);
    }

    #[test]
    fn poster_ref_accessors() {
        assert_eq!(PosterRef::None.as_str(), None);
        assert_eq!(PosterRef::Proxy("/image".into()).url(), Some("/image"));
        assert_eq!(PosterRef::Inline("data:x".into()).url(), None);
        assert_eq!(PosterRef::Inline("data:x".into()).data_uri(), Some("data:x"));
    }
}
