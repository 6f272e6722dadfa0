/// XP and level endpoints
///
/// - `GET /api/xp` - Level info for the caller's XP total
/// - `GET /api/levels` - The static level table (public)

use crate::{app::AppState, error::ApiResult, middleware::auth::CurrentUser};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use swamp_shared::{
    gamification::levels::{level_for_xp, levels, Level, LevelInfo},
    models::user_xp::UserXp,
};

#[derive(Debug, Serialize)]
pub struct LevelsResponse {
    pub levels: &'static [Level],
}

pub async fn get_xp(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<LevelInfo>> {
    let total_xp = UserXp::total(&state.db, current.id()).await?;

    Ok(Json(level_for_xp(total_xp)))
}

/// The table never changes at runtime, so clients may cache it
pub async fn list_levels() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=3600")],
        Json(LevelsResponse { levels: levels() }),
    )
}
