/// Authentication for protected routes
///
/// [`jwt_auth_layer`] verifies the bearer token and stores an
/// [`AuthContext`] in the request extensions. Handlers then take a
/// [`CurrentUser`], which resolves the auth subject to the internal profile
/// row, creating the profile the first time a subject is seen.

use crate::{app::AppState, error::ApiError};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use swamp_shared::{
    auth::middleware::{authenticate, AuthContext, AuthError},
    models::user::{NewProfile, User},
};
use tracing::debug;
use uuid::Uuid;

/// JWT authentication middleware layer
///
/// Rejects the request with 401 before the handler runs when the token is
/// missing, malformed, expired or signed with another secret.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    debug!(auth_id = %auth_context.auth_id, "Request authenticated");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// The caller's profile, resolved from the verified token
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub auth: AuthContext,
}

impl CurrentUser {
    /// Internal user id
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

        if let Some(user) = User::find_by_auth_id(&state.db, auth.auth_id).await? {
            return Ok(Self { user, auth });
        }

        // Accounts created outside the register endpoint get a profile on first use
        let email = auth
            .email
            .clone()
            .ok_or_else(|| ApiError::Unauthorized("Token has no email claim".to_string()))?;

        let user = User::get_or_create(
            &state.db,
            NewProfile {
                auth_id: auth.auth_id,
                email,
                username: None,
                first_name: None,
                last_name: None,
                major: None,
                year: None,
                email_verified: false,
            },
        )
        .await?;

        Ok(Self { user, auth })
    }
}
