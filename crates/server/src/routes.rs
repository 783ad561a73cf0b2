use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sommelierr_catalog::CatalogError;
use sommelierr_core::error::ApiError;
use sommelierr_core::{CatalogItem, CatalogKind};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::AppError;
use crate::image_proxy::relay;
use crate::state::AppState;

static INDEX_HTML: &str = include_str!("../ui/index.html");

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/movie", get(random_movie))
        .route("/series", get(random_series))
        .route("/image", get(image))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Health / UI
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ---------------------------------------------------------------------------
// Random picks
// ---------------------------------------------------------------------------

/// Public shape of a picked movie or series.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub title: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_b64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl From<CatalogItem> for MediaResponse {
    fn from(item: CatalogItem) -> Self {
        Self {
            poster_url: item.poster.url().map(str::to_string),
            poster_b64: item.poster.data_uri().map(str::to_string),
            source_url: Some(item.source_url).filter(|url| !url.is_empty()),
            title: item.title,
            year: item.year,
            overview: item.overview,
        }
    }
}

async fn pick(state: &AppState, kind: CatalogKind) -> Result<Json<MediaResponse>, AppError> {
    let item = state.picker(kind).pick().await?;
    Ok(Json(item.into()))
}

async fn random_movie(State(state): State<AppState>) -> Result<Json<MediaResponse>, AppError> {
    pick(&state, CatalogKind::Movie).await
}

async fn random_series(State(state): State<AppState>) -> Result<Json<MediaResponse>, AppError> {
    pick(&state, CatalogKind::Series).await
}

// ---------------------------------------------------------------------------
// Image proxy
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ImageQuery {
    #[serde(rename = "redirectTo", default)]
    redirect_to: String,
    #[serde(default)]
    path: String,
}

async fn image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ImageQuery>,
) -> Result<Response, AppError> {
    let upstream = state
        .images
        .fetch(&query.redirect_to, &query.path, &headers)
        .await
        .map_err(|e| match e {
            CatalogError::Network(msg) => {
                warn!(error = %msg, "image upstream unreachable");
                AppError(ApiError::BadGateway(msg))
            }
            other => other.into(),
        })?;
    Ok(relay(upstream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sommelierr_core::{Availability, PosterRef};

    fn item(poster: PosterRef, overview: Option<&str>) -> CatalogItem {
        CatalogItem {
            id: 1,
            kind: CatalogKind::Movie,
            title: "Arrival".into(),
            original_title: None,
            year: 2016,
            overview: overview.map(str::to_string),
            tags: Vec::new(),
            availability: Availability::HasFile(true),
            images: Vec::new(),
            added: Default::default(),
            source_url: "http://radarr:7878/movie/arrival-329865".into(),
            poster_source: None,
            poster,
        }
    }

    #[test]
    fn response_omits_absent_fields() {
        let json = serde_json::to_value(MediaResponse::from(item(PosterRef::None, None))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Arrival",
                "year": 2016,
                "sourceUrl": "http://radarr:7878/movie/arrival-329865"
            })
        );
    }

    #[test]
    fn poster_kinds_map_to_fields() {
        let proxied = MediaResponse::from(item(PosterRef::Proxy("/image?x".into()), Some("o")));
        assert_eq!(proxied.poster_url.as_deref(), Some("/image?x"));
        assert_eq!(proxied.poster_b64, None);
        assert_eq!(proxied.overview.as_deref(), Some("o"));

        let inline = MediaResponse::from(item(PosterRef::Inline("data:image/jpeg;base64,AA".into()), None));
        assert_eq!(inline.poster_url, None);
        assert_eq!(inline.poster_b64.as_deref(), Some("data:image/jpeg;base64,AA"));

        let remote = MediaResponse::from(item(PosterRef::Remote("https://img/p.jpg".into()), None));
        assert_eq!(remote.poster_url.as_deref(), Some("https://img/p.jpg"));
    }
}
