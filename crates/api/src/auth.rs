// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bearer token authentication.
//!
//! Access tokens are HS256 JWTs issued by the account service. The claims
//! name the user and their account type; nothing else is looked up per
//! request.

use clean_aceh_domain::{Requester, UserType};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// The user's account id.
    #[serde(alias = "user_id")]
    pub user_id: String,
    /// The user's email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `customer`, `cleaner` or `admin`.
    #[serde(alias = "user_type")]
    pub user_type: String,
    /// Expiry (unix timestamp seconds).
    pub exp: usize,
}

/// A user whose access token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's account id.
    pub user_id: Uuid,
    /// The user's email address, when the token carries one.
    pub email: Option<String>,
    /// The user's account type.
    pub user_type: UserType,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: Uuid, email: Option<String>, user_type: UserType) -> Self {
        Self {
            user_id,
            email,
            user_type,
        }
    }

    /// The lifecycle requester for this actor.
    #[must_use]
    pub const fn requester(&self) -> Requester {
        Requester::new(self.user_id, self.user_type)
    }
}

/// Verifies (and, for tooling and tests, issues) access tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Creates a verifier for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verifies a token and resolves the actor it names.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is expired, badly signed, malformed,
    /// or names an unknown account type.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedActor, AuthError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Access token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;
        let claims = data.claims;

        let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| AuthError::InvalidToken)?;
        let user_type = claims
            .user_type
            .parse::<UserType>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedActor::new(user_id, claims.email, user_type))
    }

    /// Signs a token for `actor` that expires at `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry is before the epoch or signing fails.
    pub fn issue(
        &self,
        actor: &AuthenticatedActor,
        expires_at: OffsetDateTime,
    ) -> Result<String, AuthError> {
        let exp = usize::try_from(expires_at.unix_timestamp()).map_err(|_| {
            AuthError::IssueFailed {
                reason: String::from("expiry is before the epoch"),
            }
        })?;
        let claims = TokenClaims {
            user_id: actor.user_id.to_string(),
            email: actor.email.clone(),
            user_type: actor.user_type.as_str().to_string(),
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |e| AuthError::IssueFailed {
                reason: e.to_string(),
            },
        )
    }
}
