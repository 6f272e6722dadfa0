/// Shared board endpoints
///
/// # Endpoints
///
/// - `GET    /api/boards` - Boards the caller owns or has joined
/// - `POST   /api/boards` - Create a board
/// - `GET    /api/boards/:id` - Board details (members)
/// - `DELETE /api/boards/:id` - Delete a board (owner)
/// - `GET    /api/boards/:id/tasks` - Board tasks (members)
/// - `POST   /api/boards/:id/tasks` - Add a task (members)
/// - `PUT    /api/boards/:id/tasks/:task_id` - Edit a task or its status (members)
/// - `DELETE /api/boards/:id/tasks/:task_id` - Remove a task (members)
/// - `GET    /api/boards/:id/members` - Member list (members)
/// - `DELETE /api/boards/:id/members/:user_id` - Remove a member (owner)
///
/// Non-members get 403, unknown boards 404.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    middleware::auth::CurrentUser,
    routes::{
        double_option, non_blank,
        tasks::{clean_title, UpdateTaskRequest},
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use swamp_shared::{
    auth::authorization::{require_board_access, BoardAccess, BoardPermission},
    models::{
        board::{BoardRole, SharedBoard},
        board_invite::BoardInvite,
        board_task::{BoardTask, BoardTaskStatus, BoardTaskView, CreateBoardTask},
        task::{CreateTask, Priority, Task},
        user::User,
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 100, message = "Board name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub board: SharedBoard,
    pub role: BoardRole,
    pub is_owner: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub due_date: Option<NaiveDate>,

    pub priority: Option<Priority>,

    pub status: Option<BoardTaskStatus>,

    /// Assignee's username
    pub assigned_to: Option<String>,
}

/// Board task update
///
/// Task fields behave as on personal tasks. `assigned_to: null` unassigns.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBoardTaskRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub task: UpdateTaskRequest,

    pub status: Option<BoardTaskStatus>,

    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct BoardTaskBody {
    pub task: BoardTaskView,
}

/// Resolves an assignee username to a member of the board
async fn resolve_assignee(state: &AppState, access: &BoardAccess, username: &str) -> ApiResult<Uuid> {
    let not_member = || {
        ApiError::invalid_field("assigned_to", "Assignee must be a member of this board")
    };

    let user = User::find_by_username(&state.db, username.trim())
        .await?
        .ok_or_else(not_member)?;

    SharedBoard::role_of(&state.db, &access.board, user.id)
        .await?
        .ok_or_else(not_member)?;

    Ok(user.id)
}

pub async fn list_boards(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    let boards = SharedBoard::list_for_member(&state.db, current.id()).await?;

    Ok(Json(json!({ "boards": boards })))
}

pub async fn create_board(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardResponse>)> {
    req.validate()?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "Board name cannot be blank"));
    }
    let description = non_blank(req.description);

    let board = SharedBoard::create(&state.db, current.id(), name, description.as_deref()).await?;

    info!(board_id = %board.id, owner_id = %current.id(), "Board created");

    Ok((
        StatusCode::CREATED,
        Json(BoardResponse {
            board,
            role: BoardRole::Owner,
            is_owner: true,
        }),
    ))
}

pub async fn get_board(
    State(state): State<AppState>,
    ApiPath(board_id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<BoardResponse>> {
    let access = require_board_access(&state.db, board_id, current.id(), BoardPermission::Use).await?;

    Ok(Json(BoardResponse {
        is_owner: access.is_owner(),
        role: access.role,
        board: access.board,
    }))
}

pub async fn delete_board(
    State(state): State<AppState>,
    ApiPath(board_id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    require_board_access(&state.db, board_id, current.id(), BoardPermission::Manage).await?;

    SharedBoard::delete(&state.db, board_id).await?;

    info!(board_id = %board_id, "Board deleted");

    Ok(Json(json!({ "message": "Board deleted successfully" })))
}

pub async fn list_board_tasks(
    State(state): State<AppState>,
    ApiPath(board_id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    require_board_access(&state.db, board_id, current.id(), BoardPermission::Use).await?;

    let tasks = BoardTask::list_for_board(&state.db, board_id).await?;

    Ok(Json(json!({ "tasks": tasks })))
}

/// Adds a task to a board
///
/// The task row and its board link are created together.
pub async fn create_board_task(
    State(state): State<AppState>,
    ApiPath(board_id): ApiPath<Uuid>,
    current: CurrentUser,
    ApiJson(req): ApiJson<CreateBoardTaskRequest>,
) -> ApiResult<(StatusCode, Json<BoardTaskBody>)> {
    req.validate()?;
    let access = require_board_access(&state.db, board_id, current.id(), BoardPermission::Use).await?;

    let title = clean_title(&req.title)?;
    let assigned_to = match req.assigned_to.as_deref().map(str::trim) {
        Some(username) if !username.is_empty() => {
            Some(resolve_assignee(&state, &access, username).await?)
        }
        _ => None,
    };

    let mut tx = state.db.begin().await?;

    let task = Task::create(
        &mut *tx,
        CreateTask {
            user_id: current.id(),
            title,
            description: non_blank(req.description),
            due_date: req.due_date,
            priority: req.priority.unwrap_or_default(),
        },
    )
    .await?;

    BoardTask::create(
        &mut *tx,
        CreateBoardTask {
            board_id,
            task_id: task.id,
            status: req.status.unwrap_or_default(),
            assigned_to,
            created_by: current.id(),
        },
    )
    .await?;

    let view = BoardTask::find_view(&mut *tx, board_id, task.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Board task vanished after insert".to_string()))?;

    tx.commit().await?;

    info!(board_id = %board_id, task_id = %task.id, "Board task created");

    Ok((StatusCode::CREATED, Json(BoardTaskBody { task: view })))
}

pub async fn update_board_task(
    State(state): State<AppState>,
    ApiPath((board_id, task_id)): ApiPath<(Uuid, Uuid)>,
    current: CurrentUser,
    ApiJson(req): ApiJson<UpdateBoardTaskRequest>,
) -> ApiResult<Json<BoardTaskBody>> {
    req.validate()?;
    let access = require_board_access(&state.db, board_id, current.id(), BoardPermission::Use).await?;

    if !BoardTask::exists(&state.db, board_id, task_id).await? {
        return Err(ApiError::NotFound("Task not found on this board".to_string()));
    }

    let assigned_to = match req.assigned_to {
        Some(Some(username)) if !username.trim().is_empty() => {
            Some(Some(resolve_assignee(&state, &access, &username).await?))
        }
        Some(_) => Some(None),
        None => None,
    };
    let status = req.status;
    let update = req.task.into_update()?;

    let mut tx = state.db.begin().await?;

    if !update.is_empty() {
        Task::update(&mut *tx, task_id, update).await?;
    }
    if status.is_some() || assigned_to.is_some() {
        BoardTask::update(&mut *tx, board_id, task_id, status, assigned_to).await?;
    }

    let view = BoardTask::find_view(&mut *tx, board_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found on this board".to_string()))?;

    tx.commit().await?;

    Ok(Json(BoardTaskBody { task: view }))
}

pub async fn delete_board_task(
    State(state): State<AppState>,
    ApiPath((board_id, task_id)): ApiPath<(Uuid, Uuid)>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    require_board_access(&state.db, board_id, current.id(), BoardPermission::Use).await?;

    if !BoardTask::exists(&state.db, board_id, task_id).await? {
        return Err(ApiError::NotFound("Task not found on this board".to_string()));
    }

    // The link row goes with the task
    Task::delete(&state.db, task_id).await?;

    info!(board_id = %board_id, task_id = %task_id, "Board task deleted");

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

pub async fn list_members(
    State(state): State<AppState>,
    ApiPath(board_id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    let access = require_board_access(&state.db, board_id, current.id(), BoardPermission::Use).await?;

    let members = SharedBoard::members(&state.db, board_id).await?;

    Ok(Json(json!({
        "members": members,
        "is_owner": access.is_owner(),
    })))
}

/// Removes a member from a board
///
/// # Errors
///
/// - `400 Bad Request`: Target is the owner
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: Target is not a member
pub async fn remove_member(
    State(state): State<AppState>,
    ApiPath((board_id, user_id)): ApiPath<(Uuid, Uuid)>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    let access = require_board_access(&state.db, board_id, current.id(), BoardPermission::Manage).await?;

    if user_id == access.board.owner_id {
        return Err(ApiError::BadRequest("The board owner cannot be removed".to_string()));
    }

    if !BoardInvite::remove_member(&state.db, board_id, user_id).await? {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    info!(board_id = %board_id, user_id = %user_id, "Board member removed");

    Ok(Json(json!({ "message": "Member removed successfully" })))
}
