/// Hosted authentication client
///
/// Sign-up, password login, refresh and logout are delegated to the hosted
/// auth service over its REST protocol. [`AuthProvider`] is the seam the API
/// depends on; [`HostedAuthClient`] is the production implementation and
/// tests substitute their own.
///
/// # Example
///
/// ```no_run
/// use swamp_shared::auth::provider::{AuthProvider, HostedAuthClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HostedAuthClient::new("https://project.supabase.co", "anon-key")?;
/// let session = client.sign_in_with_password("albert@ufl.edu", "chomp1234").await?;
/// println!("Signed in {}", session.user.id);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Request timeout for calls to the auth service
const REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Error type for hosted auth operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthProviderError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("A user with this email already exists")]
    UserAlreadyExists,

    #[error("Password rejected: {0}")]
    WeakPassword(String),

    #[error("Email address has not been confirmed")]
    EmailNotConfirmed,

    #[error("Refresh token is invalid or has been used")]
    InvalidRefreshToken,

    #[error("Too many requests to the auth service")]
    RateLimited,

    /// Any other rejection, with the service's status and message
    #[error("Auth service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service could not be reached
    #[error("Auth service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something we could not parse
    #[error("Unexpected auth service response: {0}")]
    InvalidResponse(String),
}

/// Auth account as returned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,

    /// Free-form metadata supplied at sign-up
    #[serde(default)]
    pub user_metadata: JsonValue,
}

impl AuthUser {
    pub fn email_verified(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// A string field from the sign-up metadata
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        self.user_metadata
            .get(key)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    }
}

/// Signed-in session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    pub refresh_token: String,

    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Result of a sign-up
///
/// The service returns a session straight away unless the project requires
/// email confirmation, in which case only the account comes back.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    Session(AuthSession),
    ConfirmationRequired(AuthUser),
}

impl SignUpOutcome {
    pub fn user(&self) -> &AuthUser {
        match self {
            SignUpOutcome::Session(session) => &session.user,
            SignUpOutcome::ConfirmationRequired(user) => user,
        }
    }

    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            SignUpOutcome::Session(session) => Some(session),
            SignUpOutcome::ConfirmationRequired(_) => None,
        }
    }
}

/// Operations the API needs from the auth service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: JsonValue,
    ) -> Result<SignUpOutcome, AuthProviderError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthProviderError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthProviderError>;

    /// Revokes the session the access token belongs to
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthProviderError>;
}

/// Error body shapes used by the service across versions
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn text(&self) -> String {
        self.msg
            .as_ref()
            .or(self.error_description.as_ref())
            .or(self.message.as_ref())
            .or(self.error.as_ref())
            .cloned()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Maps an error response onto [`AuthProviderError`]
fn classify_error(status: StatusCode, body: &ErrorBody) -> AuthProviderError {
    let text = body.text();
    let lowered = text.to_lowercase();
    let code = body.error_code.as_deref().unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS || code == "over_request_rate_limit" {
        return AuthProviderError::RateLimited;
    }

    match code {
        "user_already_exists" | "email_exists" => return AuthProviderError::UserAlreadyExists,
        "weak_password" => return AuthProviderError::WeakPassword(text),
        "invalid_credentials" => return AuthProviderError::InvalidCredentials,
        "email_not_confirmed" => return AuthProviderError::EmailNotConfirmed,
        "refresh_token_not_found" | "refresh_token_already_used" => {
            return AuthProviderError::InvalidRefreshToken
        }
        _ => {}
    }

    // Older deployments only send free text
    if lowered.contains("already registered") {
        AuthProviderError::UserAlreadyExists
    } else if lowered.contains("invalid login credentials") {
        AuthProviderError::InvalidCredentials
    } else if lowered.contains("email not confirmed") {
        AuthProviderError::EmailNotConfirmed
    } else if lowered.contains("refresh token") {
        AuthProviderError::InvalidRefreshToken
    } else if lowered.starts_with("password should") {
        AuthProviderError::WeakPassword(text)
    } else {
        AuthProviderError::Rejected {
            status: status.as_u16(),
            message: text,
        }
    }
}

/// REST client for the hosted auth service
#[derive(Clone)]
pub struct HostedAuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HostedAuthClient {
    /// Creates a client for the project at `base_url` using its public API key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, AuthProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| AuthProviderError::Unavailable(format!("Failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &JsonValue,
        bearer: Option<&str>,
    ) -> Result<Option<T>, AuthProviderError> {
        let mut request = self
            .client
            .post(self.url(path))
            .header("apikey", &self.api_key)
            .json(body);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, path, "Auth service request failed");
            AuthProviderError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuthProviderError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let error = classify_error(status, &body);
            debug!(status = status.as_u16(), path, error = %error, "Auth service rejected request");
            return Err(error);
        }

        if bytes.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| AuthProviderError::InvalidResponse(e.to_string()))
    }

    async fn post_expecting<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &JsonValue,
    ) -> Result<T, AuthProviderError> {
        self.post(path, body, None)
            .await?
            .ok_or_else(|| AuthProviderError::InvalidResponse("Empty response body".to_string()))
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: JsonValue,
    ) -> Result<SignUpOutcome, AuthProviderError> {
        let body = json!({ "email": email, "password": password, "data": metadata });
        self.post_expecting("signup", &body).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthProviderError> {
        let body = json!({ "email": email, "password": password });
        self.post_expecting("token?grant_type=password", &body).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthProviderError> {
        let body = json!({ "refresh_token": refresh_token });
        self.post_expecting("token?grant_type=refresh_token", &body)
            .await
            .map_err(|e| match e {
                // The token endpoint reports a bad refresh token as a generic grant failure
                AuthProviderError::InvalidCredentials => AuthProviderError::InvalidRefreshToken,
                other => other,
            })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthProviderError> {
        self.post::<JsonValue>("logout", &json!({}), Some(access_token))
            .await
            .map(|_| ())
    }
}
