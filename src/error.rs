use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by dashboard request handlers.
///
/// Invalid submissions are rejected before any mutation and the message is
/// shown to the user; everything else degrades to a generic server error
/// while the details go to the log.
#[derive(Debug)]
pub enum DashboardError {
    /// The submission failed validation; the store was not touched.
    Invalid(String),
    /// A store or serialization failure.
    Internal(anyhow::Error),
}

impl DashboardError {
    pub fn invalid(message: impl fmt::Display) -> Self {
        DashboardError::Invalid(message.to_string())
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Invalid(message) => write!(f, "{message}"),
            DashboardError::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Internal(err)
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        match self {
            DashboardError::Invalid(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "erro": message })),
            )
                .into_response(),
            DashboardError::Internal(err) => {
                tracing::error!("request failed: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "erro": "erro interno do servidor" })),
                )
                    .into_response()
            }
        }
    }
}
