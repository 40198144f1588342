use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ErrorResponse;

/// Message returned for every failure that is not the provider's own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to fetch geolocation data";

#[derive(Debug, Error)]
pub enum RelayError {
    /// The provider answered and rejected the lookup.
    #[error("{0}")]
    Upstream(String),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned a malformed body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("upstream reported a failure without an error description")]
    MissingErrorInfo,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Upstream(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            RelayError::Upstream(info) => {
                warn!(error = %info, "upstream provider rejected lookup");
                info
            }
            other => {
                error!(error = %other, "failed to fetch geolocation data");
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
