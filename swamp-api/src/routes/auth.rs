/// Authentication endpoints
///
/// Credentials and sessions live in the hosted auth service. These handlers
/// forward to it and keep the local profile row in step.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account and its profile
/// - `POST /api/auth/login` - Password login
/// - `POST /api/auth/refresh` - Exchange a refresh token
/// - `POST /api/auth/logout` - Revoke the current session

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::non_blank,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use swamp_shared::{
    auth::{
        middleware::AuthContext,
        password,
        provider::{AuthSession, SignUpOutcome},
    },
    models::user::{NewProfile, User, MAX_USERNAME_LEN},
};
use tracing::{info, warn};
use validator::{Validate, ValidationError};

/// Usernames: 3-50 characters of ASCII letters, digits, `_` and `.`
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(3..=MAX_USERNAME_LEN).contains(&len) {
        let mut err = ValidationError::new("length");
        err.message = Some("Username must be 3-50 characters".into());
        return Err(err);
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        let mut err = ValidationError::new("username");
        err.message = Some("Username may only contain letters, digits, '_' and '.'".into());
        return Err(err);
    }

    Ok(())
}

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked against the password policy after the derive rules
    pub password: String,

    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 100, message = "Major must be at most 100 characters"))]
    pub major: Option<String>,

    #[validate(length(max = 20, message = "Year must be at most 20 characters"))]
    pub year: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,

    pub user: User,

    /// Absent when the project requires email confirmation first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Session response for login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    pub user: User,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl From<AuthSession> for RefreshResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
        }
    }
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "albert@ufl.edu",
///   "password": "chomp1234",
///   "username": "albert",
///   "major": "Computer Science",
///   "year": "Junior"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation or password policy failed
/// - `409 Conflict`: Username or email already taken
/// - `502/503`: The auth service failed
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;
    password::validate_password_strength(&req.password)?;

    let email = req.email.trim().to_lowercase();
    let username = req.username.trim().to_string();

    // Catch the common conflicts before an auth account is created upstream
    if User::username_exists(&state.db, &username).await? {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }
    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let first_name = non_blank(req.first_name);
    let last_name = non_blank(req.last_name);
    let major = non_blank(req.major);
    let year = non_blank(req.year);

    let metadata = json!({
        "username": username,
        "first_name": first_name,
        "last_name": last_name,
        "major": major,
        "year": year,
    });

    let outcome = state.auth.sign_up(&email, &req.password, metadata).await?;
    let auth_user = outcome.user();

    let user = User::create(
        &state.db,
        NewProfile {
            auth_id: auth_user.id,
            email: auth_user.email.clone().unwrap_or_else(|| email.clone()),
            username: Some(username),
            first_name,
            last_name,
            major,
            year,
            email_verified: auth_user.email_verified(),
        },
    )
    .await
    .map_err(|e| {
        // The auth account exists without a profile; login will create one
        warn!(auth_id = %auth_user.id, error = %e, "Profile creation failed after sign-up");
        ApiError::from(e)
    })?;

    info!(user_id = %user.id, "User registered");

    let response = match outcome {
        SignUpOutcome::Session(session) => RegisterResponse {
            message: "Registration successful".to_string(),
            user,
            access_token: Some(session.access_token),
            refresh_token: Some(session.refresh_token),
        },
        SignUpOutcome::ConfirmationRequired(_) => RegisterResponse {
            message: "Registration successful. Check your email to confirm your account".to_string(),
            user,
            access_token: None,
            refresh_token: None,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid email or password
/// - `403 Forbidden`: Email not confirmed yet
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let session = state.auth.sign_in_with_password(&email, &req.password).await?;

    let auth_user = &session.user;
    let user = User::get_or_create(
        &state.db,
        NewProfile {
            auth_id: auth_user.id,
            email: auth_user.email.clone().unwrap_or(email),
            username: auth_user.metadata_str("username"),
            first_name: auth_user.metadata_str("first_name"),
            last_name: auth_user.metadata_str("last_name"),
            major: auth_user.metadata_str("major"),
            year: auth_user.metadata_str("year"),
            email_verified: auth_user.email_verified(),
        },
    )
    .await?;

    User::update_last_login(&state.db, user.id).await?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: session.expires_in,
        user,
    }))
}

/// Exchange a refresh token for a new session
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    req.validate()?;

    let session = state.auth.refresh_session(&req.refresh_token).await?;

    Ok(Json(session.into()))
}

/// Revoke the caller's session at the auth service
///
/// The access token stays cryptographically valid until it expires; the
/// refresh token stops working immediately.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<serde_json::Value>> {
    state.auth.sign_out(&auth.access_token).await?;

    info!(auth_id = %auth.auth_id, "User logged out");

    Ok(Json(json!({ "message": "Logged out successfully" })))
}
