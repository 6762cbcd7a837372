use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gepn_auth::AuthError;
use serde::Serialize;
use tracing::error;

/// An [`AuthError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match &self.0 {
            AuthError::Malformed(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials(_) | AuthError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Inactive(_) | AuthError::PinNotConfigured | AuthError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(detail) = &self.0 {
            error!(target: "gepn::rpc", %detail, "request failed");
        }
        let body = ErrorBody {
            success: false,
            code: self.0.code(),
            error: self.0.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
