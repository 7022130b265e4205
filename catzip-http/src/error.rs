use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::response::{IntoResponse, Response};
use catzip_core::CatalogError;
use http::StatusCode;
use serde_json::json;
use tracing::error;

/// Request failure rendered as `{"detail": ...}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    /// Query string that does not deserialize into the handler's parameters.
    Query(QueryRejection),
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::Query(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let ApiError::Catalog(e) = self else {
            return StatusCode::UNPROCESSABLE_ENTITY;
        };
        match e {
            CatalogError::NotFound(_) | CatalogError::EmptyArchive => StatusCode::NOT_FOUND,
            CatalogError::InvalidLimit(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CatalogError::LimitExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            CatalogError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::Io(_)
            | CatalogError::Zip(_)
            | CatalogError::Cancelled
            | CatalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Catalog(CatalogError::EmptyArchive) => {
                "no files to download exist on disk".to_string()
            }
            ApiError::Catalog(e) => e.to_string(),
            ApiError::Query(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %detail, "request failed");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
