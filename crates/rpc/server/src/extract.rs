//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
};
use gepn_auth::{AuthError, Session, UnauthorizedReason};
use serde::de::DeserializeOwned;

use crate::{AppState, ApiError};

/// JSON body whose rejection is a `malformed_request` error.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AuthError::malformed(rejection.body_text()).into()),
        }
    }
}

/// A live, authenticated session of any identity variant.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Session);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = authorization(parts)?;
        Ok(Self(state.auth.authenticate(header).await?))
    }
}

/// A live, authenticated administrator session.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub Session);

impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = authorization(parts)?;
        Ok(Self(state.auth.authenticate_admin(header).await?))
    }
}

/// A header that is not visible ASCII cannot carry a token.
fn authorization(parts: &Parts) -> Result<Option<&str>, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| ApiError::from(AuthError::Unauthorized(UnauthorizedReason::Invalid)))
        })
        .transpose()
}
