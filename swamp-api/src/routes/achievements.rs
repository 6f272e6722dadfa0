/// Achievement endpoints
///
/// - `GET  /api/achievements` - Catalog with the caller's earned state
/// - `POST /api/achievements/check` - Award anything currently satisfied
///
/// Completions already run the evaluator; the check endpoint exists for
/// clients that want to resynchronise, e.g. after the catalog changed.

use crate::{app::AppState, error::ApiResult, middleware::auth::CurrentUser};
use axum::{extract::State, Json};
use serde::Serialize;
use swamp_shared::{
    gamification::{
        achievements::{check_and_award, EarnedAchievement},
        levels::{level_for_xp, LevelInfo},
    },
    models::achievement::{Achievement, AchievementStatus},
};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementStatus>,
    pub total: usize,
    pub earned_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub achievements_earned: Vec<EarnedAchievement>,
    pub xp_awarded: i64,
    pub total_xp: i64,
    pub level_info: LevelInfo,
}

pub async fn list_achievements(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<AchievementsResponse>> {
    let achievements = Achievement::list_with_status(&state.db, current.id()).await?;
    let earned_count = achievements.iter().filter(|a| a.earned).count();

    Ok(Json(AchievementsResponse {
        total: achievements.len(),
        earned_count,
        achievements,
    }))
}

pub async fn check_achievements(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<CheckResponse>> {
    let mut tx = state.db.begin().await?;
    let outcome = check_and_award(&mut tx, current.id()).await?;
    tx.commit().await?;

    if !outcome.earned.is_empty() {
        info!(
            user_id = %current.id(),
            earned = outcome.earned.len(),
            xp_awarded = outcome.xp_awarded,
            "Achievements awarded on check"
        );
    }

    Ok(Json(CheckResponse {
        level_info: level_for_xp(outcome.total_xp),
        achievements_earned: outcome.earned,
        xp_awarded: outcome.xp_awarded,
        total_xp: outcome.total_xp,
    }))
}
