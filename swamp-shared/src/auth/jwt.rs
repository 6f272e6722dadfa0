/// Access-token verification
///
/// Sessions are issued by the hosted auth service. Its access tokens are
/// HS256 JWTs signed with the project's JWT secret, so they can be verified
/// locally without a round trip.
///
/// # Validation
///
/// - **Algorithm**: HS256
/// - **Audience**: `authenticated`
/// - **Expiry**: `exp` is enforced
///
/// # Example
///
/// ```
/// use swamp_shared::auth::jwt::{create_token, validate_access_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth_id = Uuid::new_v4();
/// let secret = "project-jwt-secret-at-least-32-bytes";
///
/// let token = create_token(&Claims::new(auth_id, Some("gator@ufl.edu".into())), secret)?;
/// let claims = validate_access_token(&token, secret)?;
/// assert_eq!(claims.sub, auth_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience claim carried by signed-in user tokens
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued for a different audience (e.g. the anon key)
    #[error("Invalid audience")]
    InvalidAudience,
}

/// Claims of a hosted-auth access token
///
/// Only the claims this service relies on are modelled; the rest of the
/// payload is ignored during decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - hosted auth user ID
    pub sub: Uuid,

    /// Audience - `authenticated` for signed-in users
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Email address on the auth account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Database role the token maps to
    #[serde(default)]
    pub role: String,

    /// Session ID, when the service includes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

impl Claims {
    /// Creates claims for a signed-in user valid for one hour
    pub fn new(auth_id: Uuid, email: Option<String>) -> Self {
        Self::with_expiration(auth_id, email, Duration::hours(1))
    }

    /// Creates claims with a custom lifetime
    pub fn with_expiration(auth_id: Uuid, email: Option<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: auth_id,
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
            email,
            role: AUTHENTICATED_AUDIENCE.to_string(),
            session_id: None,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with the project secret
///
/// The hosted service does this in production; the function exists for
/// tests and local tooling that need a valid session without it.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates an access token and extracts its claims
///
/// # Errors
///
/// - `JwtError::Expired` if `exp` has passed
/// - `JwtError::InvalidAudience` if the token is not a user session token
/// - `JwtError::ValidationError` for bad signatures or malformed tokens
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidAudience,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
