/// Task model and database operations
///
/// Tasks are owned by a single user. A task linked to a shared board through
/// `board_tasks` is managed by the board's members and is hidden from the
/// owner's personal list.
///
/// # Lifecycle
///
/// ```text
/// open → completed
/// ```
///
/// Completion is one-way and happens only through [`Task::mark_completed`],
/// which is also what triggers XP rewards.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('Low', 'Medium', 'High');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     due_date DATE,
///     priority task_priority NOT NULL DEFAULT 'Medium',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     completed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use swamp_shared::models::task::{Task, CreateTask, Priority};
/// use swamp_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     user_id: Uuid::new_v4(),
///     title: "COP3530 project 2".to_string(),
///     description: None,
///     due_date: None,
///     priority: Priority::High,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, user_id, title, description, due_date, priority, completed, \
                            completed_at, created_at, updated_at";

/// Excludes tasks that belong to a shared board
const PERSONAL_ONLY: &str = "NOT EXISTS (SELECT 1 FROM board_tasks bt WHERE bt.task_id = tasks.id)";

/// Task priority
///
/// Ordered so that `High` sorts last in ascending order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

/// Sort order for task listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    /// Soonest due first, undated last
    DueDate,
    /// High priority first
    Priority,
    /// Newest first
    #[default]
    CreatedAt,
}

impl TaskSort {
    fn order_by(&self) -> &'static str {
        match self {
            TaskSort::DueDate => "due_date ASC NULLS LAST, created_at DESC",
            TaskSort::Priority => "priority DESC, due_date ASC NULLS LAST, created_at DESC",
            TaskSort::CreatedAt => "created_at DESC",
        }
    }
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due_date" => Ok(TaskSort::DueDate),
            "priority" => Ok(TaskSort::Priority),
            "created_at" => Ok(TaskSort::CreatedAt),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owner (for board tasks, the member who created it)
    pub user_id: Uuid,

    pub title: String,

    pub description: Option<String>,

    /// Calendar due date, no time component
    pub due_date: Option<NaiveDate>,

    pub priority: Priority,

    pub completed: bool,

    /// When the task was completed (null while open)
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
}

/// Input for updating a task
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// New due date (use Some(None) to clear)
    pub due_date: Option<Option<NaiveDate>>,

    pub priority: Option<Priority>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
    }
}

/// Filter for personal task listings
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub sort: TaskSort,
}

impl Task {
    /// Creates a new open task
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, priority)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.user_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.due_date)
            .bind(data.priority)
            .fetch_one(executor)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(task)
    }

    /// Finds a personal task owned by `user_id`
    ///
    /// This is the lookup API endpoints use, so other users' tasks and board
    /// tasks are indistinguishable from missing ones.
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2 AND {}",
            TASK_COLUMNS, PERSONAL_ONLY
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists the user's personal tasks
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        filter: TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 AND {}",
            TASK_COLUMNS, PERSONAL_ONLY
        );
        if filter.completed.is_some() {
            query.push_str(" AND completed = $2");
        }
        query.push_str(" ORDER BY ");
        query.push_str(filter.sort.order_by());

        let mut q = sqlx::query_as::<_, Task>(&query).bind(user_id);
        if let Some(completed) = filter.completed {
            q = q.bind(completed);
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Updates a personal task owned by `user_id`
    ///
    /// Returns None if the task doesn't exist or isn't the user's.
    pub async fn update_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        Self::update_where(pool, id, Some(user_id), data).await
    }

    /// Updates any task by ID
    ///
    /// Callers must have checked access (board membership) already.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        Self::update_where(executor, id, None, data).await
    }

    async fn update_where<'e, E>(
        executor: E,
        id: Uuid,
        owner: Option<Uuid>,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");
        if owner.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND user_id = ${} AND {}", bind_count, PERSONAL_ONLY));
        }
        query.push_str(" RETURNING ");
        query.push_str(TASK_COLUMNS);

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(owner) = owner {
            q = q.bind(owner);
        }

        let task = q.fetch_optional(executor).await?;

        Ok(task)
    }

    /// Marks an open personal task completed
    ///
    /// Returns None if the task is missing, not the user's, or already
    /// completed; the `completed = FALSE` predicate makes double completion
    /// impossible under concurrency.
    pub async fn mark_completed<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            UPDATE tasks
            SET completed = TRUE,
                completed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND completed = FALSE AND {}
            RETURNING {}
            "#,
            PERSONAL_ONLY, TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(task)
    }

    /// Deletes a personal task owned by `user_id`
    pub async fn delete_for_user(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let query = format!(
            "DELETE FROM tasks WHERE id = $1 AND user_id = $2 AND {}",
            PERSONAL_ONLY
        );

        let result = sqlx::query(&query)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes any task by ID
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of tasks the user has completed
    pub async fn count_completed<'e, E>(executor: E, user_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND completed = TRUE")
                .bind(user_id)
                .fetch_one(executor)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
        let parsed: Priority = serde_json::from_str("\"Low\"").unwrap();
        assert_eq!(parsed, Priority::Low);
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("due_date".parse::<TaskSort>().unwrap(), TaskSort::DueDate);
        assert_eq!("priority".parse::<TaskSort>().unwrap(), TaskSort::Priority);
        assert_eq!(TaskSort::default(), TaskSort::CreatedAt);
        assert!("title".parse::<TaskSort>().is_err());
    }

    #[test]
    fn test_update_task_default_is_empty() {
        let update = UpdateTask::default();
        assert!(update.is_empty());

        let update = UpdateTask {
            due_date: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
