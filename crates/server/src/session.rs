// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bearer token extraction for the server.
//!
//! This module provides the Axum extractor that authenticates the caller
//! of every order and payment endpoint.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};
use clean_aceh_api::{ApiError, AuthError, AuthenticatedActor};
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// Extractor for authenticated users.
///
/// This extractor validates the access token from the Authorization header
/// and returns the identity and role it carries.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     AuthenticatedUser(actor): AuthenticatedUser,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Authentication Flow
///
/// 1. Extract `Authorization: Bearer <token>` header
/// 2. Verify the token signature and expiry via `TokenVerifier::authenticate`
/// 3. Return the `AuthenticatedActor` named by the token claims
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if:
/// - Authorization header is missing
/// - Authorization header is not a bearer token
/// - The token signature or claims are invalid
/// - The token has expired
pub struct AuthenticatedUser(pub AuthenticatedActor);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header does not carry a bearer token");
                SessionError::InvalidAuthorizationHeader
            })?;

        let actor: AuthenticatedActor = state.verifier.authenticate(token).map_err(|e| {
            warn!(error = %e, "Access token rejected");
            SessionError::Rejected(e)
        })?;

        debug!(
            user_id = %actor.user_id,
            user_type = %actor.user_type,
            "Access token validated"
        );

        Ok(Self(actor))
    }
}

/// Token extraction errors.
///
/// Rendered with the same error envelope as every other failure.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header is not `Bearer <token>`.
    InvalidAuthorizationHeader,
    /// The token failed verification.
    Rejected(AuthError),
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MissingAuthorizationHeader => Self::MissingToken,
            SessionError::InvalidAuthorizationHeader => Self::InvalidToken,
            SessionError::Rejected(reason) => reason,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let api_error: ApiError = ApiError::from(AuthError::from(self));
        HttpError::from(api_error).into_response()
    }
}
