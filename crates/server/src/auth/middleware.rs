//! # Authentication Middleware
//!
//! This module provides the JWT check guarding the private chat room. Tokens
//! are issued by the external identity provider; the server only validates
//! their HS256 signature and expiry against the configured `jwt_secret`.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::state::AppState;

/// Represents the claims we expect to find in the JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The subject of the token, as issued by the identity provider.
    pub sub: String,
    /// The expiration timestamp.
    pub exp: usize,
    /// The user's email, preferred over `sub` as the history key when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// The id chat history is stored under: the email if present, else the subject.
    pub fn user_id(&self) -> &str {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .unwrap_or(&self.sub)
    }
}

/// An Axum extractor that provides the currently authenticated user.
///
/// 1.  **No Token Present**: Rejects the request with `401 Unauthorized`.
/// 2.  **Valid Token Present**: Resolves to the user id from the claims.
/// 3.  **Invalid/Expired Token Present**: Rejects the request with `401 Unauthorized`.
///
/// Without a configured `jwt_secret` every request is rejected with
/// `503 Service Unavailable`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// A custom rejection type for authentication failures.
///
/// This allows the `FromRequestParts` implementation to return a specific
/// HTTP status code and error message, which Axum then turns into a response.
pub struct AuthError(StatusCode, String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(jwt_secret) = askpti::config::present(&state.config.jwt_secret) else {
            warn!("Private chat requested but no jwt_secret is configured.");
            return Err(AuthError(
                StatusCode::SERVICE_UNAVAILABLE,
                "Private chat is not configured.".to_string(),
            ));
        };

        // Attempt to extract the token from the `Authorization: Bearer <token>` header.
        let bearer_header =
            Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    warn!("Unexpected error during header extraction: {}", e);
                    AuthError(
                        StatusCode::BAD_REQUEST,
                        "Invalid Authorization header format.".to_string(),
                    )
                })?;

        let Some(TypedHeader(Authorization(bearer))) = bearer_header else {
            info!("No Authorization header found, rejecting private request.");
            return Err(AuthError(
                StatusCode::UNAUTHORIZED,
                "Missing authorization token.".to_string(),
            ));
        };

        // `Validation::default()` expects HS256 and checks `exp`.
        let token_data = decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_secret(jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            warn!("JWT validation failed: {}", e);
            AuthError(
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token.".to_string(),
            )
        })?;

        Ok(AuthenticatedUser {
            user_id: token_data.claims.user_id().to_string(),
        })
    }
}
