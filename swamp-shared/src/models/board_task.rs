/// Tasks on shared boards
///
/// A board task is an ordinary `tasks` row plus a `board_tasks` link holding
/// the board-specific workflow status and assignee. The board status is
/// independent of the task's own `completed` flag, which only personal
/// completion (and its XP) sets.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE board_task_status AS ENUM ('todo', 'in_progress', 'done');
///
/// CREATE TABLE board_tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES shared_boards(id) ON DELETE CASCADE,
///     task_id UUID NOT NULL UNIQUE REFERENCES tasks(id) ON DELETE CASCADE,
///     status board_task_status NOT NULL DEFAULT 'todo',
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::models::task::Priority;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "board_task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BoardTaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardTask {
    pub id: Uuid,
    pub board_id: Uuid,
    pub task_id: Uuid,
    pub status: BoardTaskStatus,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task joined with its board status, as shown on the board
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BoardTaskView {
    /// The underlying task's ID
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: BoardTaskStatus,
    pub assigned_to: Option<Uuid>,
    /// Username of the assignee
    pub assigned_username: Option<String>,
    pub created_by: Uuid,
    pub created_by_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for linking a task to a board
#[derive(Debug, Clone)]
pub struct CreateBoardTask {
    pub board_id: Uuid,
    pub task_id: Uuid,
    pub status: BoardTaskStatus,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
}

const VIEW_QUERY: &str = r#"
    SELECT t.id, bt.board_id, t.title, t.description, t.due_date, t.priority,
           bt.status, bt.assigned_to, a.username AS assigned_username,
           bt.created_by, c.username AS created_by_username,
           t.created_at, GREATEST(t.updated_at, bt.updated_at) AS updated_at
    FROM board_tasks bt
    JOIN tasks t ON t.id = bt.task_id
    JOIN users c ON c.id = bt.created_by
    LEFT JOIN users a ON a.id = bt.assigned_to
    WHERE bt.board_id = $1
"#;

impl BoardTask {
    pub async fn create<'e, E>(executor: E, data: CreateBoardTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let link = sqlx::query_as::<_, BoardTask>(
            r#"
            INSERT INTO board_tasks (board_id, task_id, status, assigned_to, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, board_id, task_id, status, assigned_to, created_by, created_at, updated_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.task_id)
        .bind(data.status)
        .bind(data.assigned_to)
        .bind(data.created_by)
        .fetch_one(executor)
        .await?;

        Ok(link)
    }

    /// Whether the task is on the board
    pub async fn exists<'e, E>(executor: E, board_id: Uuid, task_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM board_tasks WHERE board_id = $1 AND task_id = $2)",
        )
        .bind(board_id)
        .bind(task_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Board tasks, open work first and then by due date
    pub async fn list_for_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<BoardTaskView>, sqlx::Error> {
        let query = format!(
            "{} ORDER BY bt.status, t.due_date ASC NULLS LAST, t.created_at DESC",
            VIEW_QUERY
        );

        let tasks = sqlx::query_as::<_, BoardTaskView>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    pub async fn find_view<'e, E>(
        executor: E,
        board_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<BoardTaskView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("{} AND bt.task_id = $2", VIEW_QUERY);

        let task = sqlx::query_as::<_, BoardTaskView>(&query)
            .bind(board_id)
            .bind(task_id)
            .fetch_optional(executor)
            .await?;

        Ok(task)
    }

    /// Updates board status and/or assignee
    ///
    /// `assigned_to: Some(None)` unassigns.
    pub async fn update<'e, E>(
        executor: E,
        board_id: Uuid,
        task_id: Uuid,
        status: Option<BoardTaskStatus>,
        assigned_to: Option<Option<Uuid>>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("UPDATE board_tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }

        query.push_str(
            " WHERE board_id = $1 AND task_id = $2 \
             RETURNING id, board_id, task_id, status, assigned_to, created_by, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, BoardTask>(&query)
            .bind(board_id)
            .bind(task_id);

        if let Some(status) = status {
            q = q.bind(status);
        }
        if let Some(assigned_to) = assigned_to {
            q = q.bind(assigned_to);
        }

        let link = q.fetch_optional(executor).await?;

        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&BoardTaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: BoardTaskStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, BoardTaskStatus::Done);
        assert_eq!(BoardTaskStatus::default(), BoardTaskStatus::Todo);
    }
}
