/// Per-day completion counters
///
/// # Schema
///
/// ```sql
/// CREATE TABLE daily_task_stats (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     stat_date DATE NOT NULL,
///     tasks_completed INTEGER NOT NULL DEFAULT 0,
///     focus_sessions_completed INTEGER NOT NULL DEFAULT 0,
///     PRIMARY KEY (user_id, stat_date)
/// );
/// ```

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DailyTaskStats {
    pub user_id: Uuid,
    pub stat_date: NaiveDate,
    pub tasks_completed: i32,
    pub focus_sessions_completed: i32,
}

impl DailyTaskStats {
    /// Bumps the task counter for a day, returning the updated row
    pub async fn increment_tasks<'e, E>(
        executor: E,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let stats = sqlx::query_as::<_, DailyTaskStats>(
            r#"
            INSERT INTO daily_task_stats (user_id, stat_date, tasks_completed)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, stat_date) DO UPDATE
                SET tasks_completed = daily_task_stats.tasks_completed + 1
            RETURNING user_id, stat_date, tasks_completed, focus_sessions_completed
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(executor)
        .await?;

        Ok(stats)
    }

    /// Bumps the focus-session counter for a day, returning the updated row
    pub async fn increment_focus<'e, E>(
        executor: E,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let stats = sqlx::query_as::<_, DailyTaskStats>(
            r#"
            INSERT INTO daily_task_stats (user_id, stat_date, focus_sessions_completed)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, stat_date) DO UPDATE
                SET focus_sessions_completed = daily_task_stats.focus_sessions_completed + 1
            RETURNING user_id, stat_date, tasks_completed, focus_sessions_completed
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(executor)
        .await?;

        Ok(stats)
    }

    pub async fn find<'e, E>(
        executor: E,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let stats = sqlx::query_as::<_, DailyTaskStats>(
            r#"
            SELECT user_id, stat_date, tasks_completed, focus_sessions_completed
            FROM daily_task_stats
            WHERE user_id = $1 AND stat_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(executor)
        .await?;

        Ok(stats)
    }

    /// Rows between `start` and `end` inclusive, oldest first
    ///
    /// Days without activity have no row; callers zero-fill.
    pub async fn list_range(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let stats = sqlx::query_as::<_, DailyTaskStats>(
            r#"
            SELECT user_id, stat_date, tasks_completed, focus_sessions_completed
            FROM daily_task_stats
            WHERE user_id = $1 AND stat_date BETWEEN $2 AND $3
            ORDER BY stat_date
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(stats)
    }

    /// Every date with at least one completed task, oldest first
    pub async fn active_dates(pool: &PgPool, user_id: Uuid) -> Result<Vec<NaiveDate>, sqlx::Error> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT stat_date
            FROM daily_task_stats
            WHERE user_id = $1 AND tasks_completed > 0
            ORDER BY stat_date
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(dates)
    }
}
