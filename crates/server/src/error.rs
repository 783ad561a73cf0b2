use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sommelierr_catalog::CatalogError;
use sommelierr_core::error::{ApiError, ErrorEnvelope};
use tracing::{debug, error};

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
#[derive(Debug)]
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

/// Empty catalogs are a normal outcome and map to 404; rejected proxy input
/// is the caller's fault. Everything else is a server-side failure.
impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        let api = match &e {
            CatalogError::NoItemsAvailable(_) => {
                debug!(error = %e, "nothing to pick");
                ApiError::NotFound(e.to_string())
            }
            CatalogError::ImagePathRejected(_) => {
                debug!(error = %e, "image request rejected");
                ApiError::BadRequest(e.to_string())
            }
            CatalogError::Upstream { .. }
            | CatalogError::Decode(_)
            | CatalogError::Network(_)
            | CatalogError::TagLookup(_)
            | CatalogError::InvalidUrl(_) => {
                error!(error = %e, "upstream failure");
                ApiError::Internal(e.to_string())
            }
        };
        Self(api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sommelierr_core::CatalogKind;

    fn status_of(e: CatalogError) -> u16 {
        AppError::from(e).0.status_code()
    }

    #[test]
    fn catalog_errors_map_to_statuses() {
        assert_eq!(status_of(CatalogError::NoItemsAvailable(CatalogKind::Series)), 404);
        assert_eq!(status_of(CatalogError::ImagePathRejected("x".into())), 400);
        assert_eq!(
            status_of(CatalogError::Upstream {
                kind: CatalogKind::Movie,
                status: 503
            }),
            500
        );
        assert_eq!(status_of(CatalogError::Decode("bad".into())), 500);
        assert_eq!(status_of(CatalogError::Network("timed out".into())), 500);
    }
}
