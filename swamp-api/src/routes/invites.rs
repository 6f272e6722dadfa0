/// Board invite endpoints
///
/// - `POST /api/boards/:id/invite` - Invite a user by username (owner)
/// - `GET  /api/invites` - The caller's pending invites
/// - `POST /api/invites/:id/accept` - Join the board
/// - `POST /api/invites/:id/decline` - Turn the invite down
///
/// A declined user can be invited again; the old invite is reset to pending.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    middleware::auth::CurrentUser,
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use swamp_shared::{
    auth::authorization::{require_board_access, BoardPermission},
    models::{
        board::SharedBoard,
        board_invite::{BoardInvite, InviteStatus},
        user::User,
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,
}

/// Invites a user to a board
///
/// # Errors
///
/// - `400 Bad Request`: Self-invite
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: Unknown board or username
/// - `409 Conflict`: Already a member or already invited
pub async fn invite_user(
    State(state): State<AppState>,
    ApiPath(board_id): ApiPath<Uuid>,
    current: CurrentUser,
    ApiJson(req): ApiJson<InviteRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    req.validate()?;
    let access = require_board_access(&state.db, board_id, current.id(), BoardPermission::Manage).await?;

    let invitee = User::find_by_username(&state.db, req.username.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if invitee.id == current.id() {
        return Err(ApiError::BadRequest("You cannot invite yourself".to_string()));
    }

    if SharedBoard::role_of(&state.db, &access.board, invitee.id).await?.is_some() {
        return Err(ApiError::Conflict("User is already a member of this board".to_string()));
    }

    let invite = BoardInvite::create(&state.db, board_id, current.id(), invitee.id)
        .await?
        .ok_or_else(|| ApiError::Conflict("User already has a pending invite".to_string()))?;

    info!(
        board_id = %board_id,
        invite_id = %invite.id,
        invitee = %invitee.username,
        "Board invite sent"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Invite sent to {}", invitee.username),
            "invite": invite,
        })),
    ))
}

pub async fn list_invites(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    let invites = BoardInvite::list_pending_for(&state.db, current.id()).await?;

    Ok(Json(json!({ "invites": invites })))
}

/// Answers a pending invite addressed to the caller
async fn respond(
    state: &AppState,
    current: &CurrentUser,
    invite_id: Uuid,
    status: InviteStatus,
) -> ApiResult<BoardInvite> {
    if let Some(invite) = BoardInvite::respond(&state.db, invite_id, current.id(), status).await? {
        info!(
            invite_id = %invite_id,
            board_id = %invite.board_id,
            status = status.as_str(),
            "Board invite answered"
        );
        return Ok(invite);
    }

    // Work out why nothing was updated
    match BoardInvite::find_by_id(&state.db, invite_id).await? {
        None => Err(ApiError::NotFound("Invite not found".to_string())),
        Some(invite) if invite.invitee_id != current.id() => Err(ApiError::Forbidden(
            "This invite is not addressed to you".to_string(),
        )),
        Some(invite) => Err(ApiError::Conflict(format!(
            "Invite already {}",
            invite.status.as_str()
        ))),
    }
}

pub async fn accept_invite(
    State(state): State<AppState>,
    ApiPath(invite_id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    let invite = respond(&state, &current, invite_id, InviteStatus::Accepted).await?;

    Ok(Json(json!({
        "message": "Invite accepted",
        "board_id": invite.board_id,
    })))
}

pub async fn decline_invite(
    State(state): State<AppState>,
    ApiPath(invite_id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    respond(&state, &current, invite_id, InviteStatus::Declined).await?;

    Ok(Json(json!({ "message": "Invite declined" })))
}
