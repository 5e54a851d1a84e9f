use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use storefront_core::errors::{CatalogError, InterfaceError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

/// Handler error carrying the correlation id of the failed request.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    pub fn new(error: CatalogError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            InterfaceError::Internal { message, correlation_id } => error!(
                event_name = "api.request.failed",
                correlation_id = %correlation_id,
                error = %message,
                "request failed with internal error"
            ),
            InterfaceError::BadGateway { message, correlation_id } => warn!(
                event_name = "api.request.upstream_failed",
                correlation_id = %correlation_id,
                error = %message,
                "request failed because the external catalog is unavailable"
            ),
            InterfaceError::BadRequest { .. } | InterfaceError::NotFound { .. } => {}
        }

        let body = ErrorBody {
            error: self.0.client_message(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
