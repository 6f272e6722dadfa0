/// Personal task endpoints
///
/// # Endpoints
///
/// - `GET    /api/tasks` - List tasks (`?completed=true|false&sort=due_date|priority|created_at`)
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks/:id` - Get a task
/// - `PUT    /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete a task
/// - `POST   /api/tasks/:id/complete` - Complete a task and collect XP
///
/// Tasks that belong to a shared board are managed through the board
/// endpoints and are invisible here.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::auth::CurrentUser,
    routes::{double_option, non_blank},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use swamp_shared::{
    gamification::rewards::{reward_task_completion, RewardSummary},
    models::task::{CreateTask, Priority, Task, TaskFilter, TaskSort, UpdateTask},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub(crate) const MAX_DESCRIPTION_LEN: usize = 5000;

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub completed: Option<bool>,
    pub sort: Option<String>,
}

impl ListTasksQuery {
    fn filter(&self) -> ApiResult<TaskFilter> {
        let sort = match self.sort.as_deref() {
            Some(sort) => sort.parse::<TaskSort>().map_err(ApiError::BadRequest)?,
            None => TaskSort::default(),
        };

        Ok(TaskFilter {
            completed: self.completed,
            sort,
        })
    }
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub due_date: Option<NaiveDate>,

    pub priority: Option<Priority>,
}

/// Update task request
///
/// Omitted fields are left alone; `null` clears `description`/`due_date`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    pub priority: Option<Priority>,
}

/// Trims a title, rejecting whitespace-only ones
pub(crate) fn clean_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::invalid_field("title", "Title cannot be blank"));
    }
    Ok(title.to_string())
}

impl UpdateTaskRequest {
    pub(crate) fn into_update(self) -> ApiResult<UpdateTask> {
        if let Some(Some(description)) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(ApiError::invalid_field(
                    "description",
                    "Description must be at most 5000 characters",
                ));
            }
        }

        Ok(UpdateTask {
            title: self.title.as_deref().map(clean_title).transpose()?,
            description: self.description.map(non_blank),
            due_date: self.due_date,
            priority: self.priority,
        })
    }
}

/// Completion response: the task plus what the completion earned
#[derive(Debug, Serialize)]
pub struct CompletionResponse<T: Serialize> {
    #[serde(flatten)]
    pub item: T,

    #[serde(flatten)]
    pub rewards: RewardSummary,
}

#[derive(Debug, Serialize)]
pub struct TaskBody {
    pub task: Task,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListTasksQuery>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    let tasks = Task::list_for_user(&state.db, current.id(), query.filter()?).await?;

    Ok(Json(json!({
        "total": tasks.len(),
        "tasks": tasks,
    })))
}

pub async fn create_task(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskBody>)> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: current.id(),
            title: clean_title(&req.title)?,
            description: non_blank(req.description),
            due_date: req.due_date,
            priority: req.priority.unwrap_or_default(),
        },
    )
    .await?;

    info!(task_id = %task.id, user_id = %current.id(), "Task created");

    Ok((StatusCode::CREATED, Json(TaskBody { task })))
}

pub async fn get_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<TaskBody>> {
    let task = Task::find_for_user(&state.db, id, current.id())
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskBody { task }))
}

pub async fn update_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    current: CurrentUser,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskBody>> {
    req.validate()?;
    let update = req.into_update()?;

    let task = Task::update_for_user(&state.db, id, current.id(), update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskBody { task }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    if !Task::delete_for_user(&state.db, id, current.id()).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    info!(task_id = %id, user_id = %current.id(), "Task deleted");

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

/// Completes a task and awards XP
///
/// The completion, the daily counter, XP and any achievements commit
/// together or not at all.
///
/// # Errors
///
/// - `404 Not Found`: No such personal task
/// - `409 Conflict`: Task already completed
pub async fn complete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    current: CurrentUser,
) -> ApiResult<Json<CompletionResponse<TaskBody>>> {
    let user_id = current.id();
    let mut tx = state.db.begin().await?;

    let task = match Task::mark_completed(&mut *tx, id, user_id).await? {
        Some(task) => task,
        None => {
            tx.rollback().await?;
            return match Task::find_for_user(&state.db, id, user_id).await? {
                Some(_) => Err(ApiError::Conflict("Task already completed".to_string())),
                None => Err(ApiError::NotFound("Task not found".to_string())),
            };
        }
    };

    let rewards = reward_task_completion(&mut tx, user_id, Utc::now().date_naive()).await?;
    tx.commit().await?;

    info!(
        task_id = %id,
        user_id = %user_id,
        xp_awarded = rewards.xp_awarded,
        total_xp = rewards.total_xp,
        "Task completed"
    );

    Ok(Json(CompletionResponse {
        item: TaskBody { task },
        rewards,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sort_is_bad_request() {
        let query = ListTasksQuery {
            completed: None,
            sort: Some("alphabetical".to_string()),
        };
        assert!(matches!(query.filter(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_default_sort_is_created_at() {
        let query = ListTasksQuery {
            completed: Some(false),
            sort: None,
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.sort, TaskSort::CreatedAt);
        assert_eq!(filter.completed, Some(false));
    }

    #[test]
    fn test_update_request_clears_and_trims() {
        let req: UpdateTaskRequest = serde_json::from_str(
            r#"{"title": "  Study for exam ", "description": null, "due_date": "2026-12-01"}"#,
        )
        .unwrap();
        let update = req.into_update().unwrap();

        assert_eq!(update.title.as_deref(), Some("Study for exam"));
        assert_eq!(update.description, Some(None));
        assert_eq!(
            update.due_date,
            Some(Some(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()))
        );
        assert_eq!(update.priority, None);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        assert!(clean_title("   ").is_err());
    }
}
