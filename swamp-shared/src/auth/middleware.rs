/// Bearer token authentication
///
/// Validates `Authorization: Bearer <token>` access tokens into an
/// [`AuthContext`]. Only the token is checked here; the API's middleware
/// inserts the context into request extensions and maps the auth subject
/// to a profile row.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use swamp_shared::auth::middleware::{authenticate, AuthError};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
///
/// assert!(matches!(authenticate(&headers, "secret"), Err(AuthError::InvalidFormat(_))));
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Hosted auth subject (`sub` claim)
    pub auth_id: Uuid,

    /// Email claim, when present
    pub email: Option<String>,

    /// The verified bearer token, kept for calls back to the auth service
    #[serde(skip_serializing)]
    pub access_token: String,
}

/// Error type for authentication middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header is not a bearer token
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token has expired
    TokenExpired,
}

impl AuthError {
    fn message(&self) -> String {
        match self {
            AuthError::MissingCredentials => "Missing credentials".to_string(),
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => msg.clone(),
            AuthError::TokenExpired => "Token expired".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "unauthorized",
            "message": self.message(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    Ok(token)
}

/// Validates the request's bearer token
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::TokenExpired,
        JwtError::InvalidAudience => AuthError::InvalidToken("Invalid audience".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    Ok(AuthContext {
        auth_id: claims.sub,
        email: claims.email,
        access_token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            authenticate(&HeaderMap::new(), SECRET).unwrap_err(),
            AuthError::MissingCredentials
        );
    }

    #[test]
    fn test_non_bearer_header() {
        let err = authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidFormat(_)));
    }

    #[test]
    fn test_valid_token_builds_context() {
        let auth_id = Uuid::new_v4();
        let token = create_token(&Claims::new(auth_id, Some("albert@ufl.edu".into())), SECRET).unwrap();

        let context = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(context.auth_id, auth_id);
        assert_eq!(context.email.as_deref(), Some("albert@ufl.edu"));
        assert_eq!(context.access_token, token);
    }

    #[test]
    fn test_expired_token() {
        let claims = Claims::with_expiration(Uuid::new_v4(), None, Duration::seconds(-60));
        let token = create_token(&claims, SECRET).unwrap();

        let err = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);
    }

    #[test]
    fn test_auth_error_into_response() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidFormat("test".to_string()),
            AuthError::InvalidToken("test".to_string()),
            AuthError::TokenExpired,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
