/// Pomodoro endpoints
///
/// - `POST /api/pomodoro/start` - Start a focus session
/// - `POST /api/pomodoro/:id/complete` - Complete it and collect XP
/// - `GET  /api/pomodoro/sessions` - Recent sessions (`?limit=`, default 20)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ApiQuery, OptionalJson},
    middleware::auth::CurrentUser,
    routes::tasks::CompletionResponse,
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swamp_shared::{
    gamification::rewards::reward_focus_completion,
    models::focus_session::{FocusSession, DEFAULT_DURATION_MINUTES},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_SESSION_LIMIT: i64 = 20;
const MAX_SESSION_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(range(min = 1, max = 120, message = "Duration must be 1-120 minutes"))]
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize)]
pub struct SessionBody {
    pub session: FocusSession,
}

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub limit: Option<i64>,
}

/// Starts a session
///
/// The body is optional; without it the session lasts 25 minutes. A body
/// that is present must be valid.
pub async fn start_session(
    State(state): State<AppState>,
    current: CurrentUser,
    OptionalJson(body): OptionalJson<StartSessionRequest>,
) -> ApiResult<(StatusCode, Json<StartSessionResponse>)> {
    let req = body.unwrap_or_default();
    req.validate()?;

    let duration = req.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    let session = FocusSession::start(&state.db, current.id(), duration).await?;

    info!(session_id = %session.id, user_id = %current.id(), duration, "Focus session started");

    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            session_id: session.id,
            started_at: session.started_at,
            duration_minutes: session.duration_minutes,
        }),
    ))
}

/// Completes a session and awards XP
///
/// # Errors
///
/// - `404 Not Found`: No such session for the caller
/// - `409 Conflict`: Session already completed
pub async fn complete_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<CompletionResponse<SessionBody>>> {
    let user_id = current.id();
    let mut tx = state.db.begin().await?;

    let Some(session) = FocusSession::complete(&mut *tx, id, user_id).await? else {
        tx.rollback().await?;
        return match FocusSession::find_for_user(&state.db, id, user_id).await? {
            Some(_) => Err(ApiError::Conflict("Session already completed".to_string())),
            None => Err(ApiError::NotFound("Session not found".to_string())),
        };
    };

    let rewards = reward_focus_completion(&mut tx, user_id, Utc::now().date_naive()).await?;
    tx.commit().await?;

    info!(
        session_id = %id,
        user_id = %user_id,
        xp_awarded = rewards.xp_awarded,
        "Focus session completed"
    );

    Ok(Json(CompletionResponse {
        item: SessionBody { session },
        rewards,
    }))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionsQuery>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SESSION_LIMIT)
        .clamp(1, MAX_SESSION_LIMIT);

    let sessions = FocusSession::list_recent(&state.db, current.id(), limit).await?;

    Ok(Json(serde_json::json!({ "sessions": sessions })))
}
