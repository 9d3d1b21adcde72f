//! Request-level error taxonomy.
//!
//! Each variant maps to one HTTP status and a JSON `{"error": ...}` body.
//! Validation errors never reach the data layer; driver errors are logged
//! in full and surfaced to clients as a generic internal error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::ConnectionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required fields.")]
    MissingFields,

    #[error("Missing id.")]
    MissingId,

    #[error("Missing payload.")]
    MissingPayload,

    #[error("No updatable fields in payload.")]
    NoUpdatableFields,

    #[error("Menu item not found.")]
    ItemNotFound,

    #[error("No menu items found. Documents exist but did not match expected item shapes.")]
    NoItems { collection: String },

    #[error("Failed to connect to the menu database.")]
    Unavailable { reason: String },

    #[error("No menu data source available (set MONGODB_URI or provide data/menu.json).")]
    NoDataSource,

    #[error("Internal server error")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal server error")]
    Encode(#[from] mongodb::bson::ser::Error),
}

impl From<ConnectionError> for ApiError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::NotConfigured => ApiError::NoDataSource,
            ConnectionError::Unavailable(reason) => ApiError::Unavailable { reason },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingFields
            | ApiError::MissingId
            | ApiError::MissingPayload
            | ApiError::NoUpdatableFields => StatusCode::BAD_REQUEST,
            ApiError::ItemNotFound | ApiError::NoItems { .. } => StatusCode::NOT_FOUND,
            ApiError::Unavailable { .. } => StatusCode::BAD_GATEWAY,
            ApiError::NoDataSource | ApiError::Database(_) | ApiError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            ApiError::NoItems { collection } => json!({
                "error": self.to_string(),
                "collection": collection,
                "hint": "Ensure your documents are either item documents or contain arrays: items/data/menu/categories[].items.",
            }),
            ApiError::Unavailable { reason } => json!({
                "error": self.to_string(),
                "reason": reason,
                "hint": "Verify MONGODB_URI in your environment and check database network access.",
            }),
            ApiError::NoDataSource => json!({
                "error": self.to_string(),
                "hint": "Set MONGODB_URI or provide a fallback menu file.",
            }),
            ApiError::Database(err) => {
                tracing::error!(error = %err, "Database operation failed");
                json!({ "error": self.to_string() })
            }
            ApiError::Encode(err) => {
                tracing::error!(error = %err, "Failed to encode document");
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_taxonomy() {
        assert_eq!(
            ApiError::MissingFields.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ItemNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unavailable { reason: "refused".into() }
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::NoDataSource.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
