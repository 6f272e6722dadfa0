/// Profile endpoints
///
/// - `GET /api/user/profile` - The caller's profile and level info
/// - `PUT /api/user/profile` - Partial profile update

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    middleware::auth::CurrentUser,
    routes::{auth::validate_username, double_option},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use swamp_shared::{
    gamification::levels::{level_for_xp, LevelInfo},
    models::{
        user::{UpdateProfile, User},
        user_xp::UserXp,
    },
};
use validator::Validate;

/// Profile with level info
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub xp: LevelInfo,
}

/// Profile update request
///
/// Omitted fields are left alone. `null` clears the optional fields.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub major: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<String>>,
}

/// Trims a clearable field; blank means clear
fn clearable(value: Option<Option<String>>, field: &str, max: usize) -> ApiResult<Option<Option<String>>> {
    match value {
        Some(Some(v)) => {
            let v = v.trim().to_string();
            if v.chars().count() > max {
                return Err(ApiError::invalid_field(
                    field,
                    format!("Must be at most {} characters", max),
                ));
            }
            Ok(Some(if v.is_empty() { None } else { Some(v) }))
        }
        other => Ok(other),
    }
}

impl UpdateProfileRequest {
    fn into_update(self) -> ApiResult<UpdateProfile> {
        Ok(UpdateProfile {
            username: self.username.map(|u| u.trim().to_string()),
            first_name: clearable(self.first_name, "first_name", 100)?,
            last_name: clearable(self.last_name, "last_name", 100)?,
            major: clearable(self.major, "major", 100)?,
            year: clearable(self.year, "year", 20)?,
        })
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<ProfileResponse>> {
    let total_xp = UserXp::total(&state.db, current.id()).await?;

    Ok(Json(ProfileResponse {
        user: current.user,
        xp: level_for_xp(total_xp),
    }))
}

/// Updates the caller's profile
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Invalid field
/// - `409 Conflict`: Username already taken
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate()?;
    let update = req.into_update()?;

    let user = User::update_profile(&state.db, current.id(), update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(serde_json::json!({ "user": user })))
}
