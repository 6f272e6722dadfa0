/// Pomodoro focus sessions
///
/// A session is started with a planned duration and completed once. Only
/// completed sessions count toward XP, achievements and analytics.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE focus_sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     ended_at TIMESTAMPTZ,
///     duration_minutes INTEGER NOT NULL DEFAULT 25 CHECK (duration_minutes > 0),
///     completed BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// Default pomodoro length
pub const DEFAULT_DURATION_MINUTES: i32 = 25;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FocusSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub completed: bool,
}

/// Aggregate focus statistics for a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct FocusSummary {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub total_focus_minutes: i64,
}

impl FocusSummary {
    /// Mean planned length of completed sessions, 0 when there are none
    pub fn average_session_minutes(&self) -> f64 {
        if self.completed_sessions == 0 {
            return 0.0;
        }
        let average = self.total_focus_minutes as f64 / self.completed_sessions as f64;
        (average * 10.0).round() / 10.0
    }
}

impl FocusSession {
    /// Starts a session
    pub async fn start(
        pool: &PgPool,
        user_id: Uuid,
        duration_minutes: i32,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, FocusSession>(
            r#"
            INSERT INTO focus_sessions (user_id, duration_minutes)
            VALUES ($1, $2)
            RETURNING id, user_id, started_at, ended_at, duration_minutes, completed
            "#,
        )
        .bind(user_id)
        .bind(duration_minutes)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session owned by `user_id`
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, FocusSession>(
            r#"
            SELECT id, user_id, started_at, ended_at, duration_minutes, completed
            FROM focus_sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Completes an open session owned by `user_id`
    ///
    /// Returns None if the session is missing, not the user's, or already
    /// completed.
    pub async fn complete<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let session = sqlx::query_as::<_, FocusSession>(
            r#"
            UPDATE focus_sessions
            SET completed = TRUE,
                ended_at = NOW()
            WHERE id = $1 AND user_id = $2 AND completed = FALSE
            RETURNING id, user_id, started_at, ended_at, duration_minutes, completed
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    /// Most recent sessions first
    pub async fn list_recent(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sessions = sqlx::query_as::<_, FocusSession>(
            r#"
            SELECT id, user_id, started_at, ended_at, duration_minutes, completed
            FROM focus_sessions
            WHERE user_id = $1
            ORDER BY started_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    /// Number of completed sessions
    pub async fn count_completed<'e, E>(executor: E, user_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM focus_sessions WHERE user_id = $1 AND completed = TRUE",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    pub async fn summary(pool: &PgPool, user_id: Uuid) -> Result<FocusSummary, sqlx::Error> {
        let summary = sqlx::query_as::<_, FocusSummary>(
            r#"
            SELECT COUNT(*) AS total_sessions,
                   COUNT(*) FILTER (WHERE completed) AS completed_sessions,
                   COALESCE(SUM(duration_minutes) FILTER (WHERE completed), 0)::BIGINT
                       AS total_focus_minutes
            FROM focus_sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_with_no_sessions() {
        assert_eq!(FocusSummary::default().average_session_minutes(), 0.0);
    }

    #[test]
    fn test_average_is_rounded_to_one_decimal() {
        let summary = FocusSummary {
            total_sessions: 4,
            completed_sessions: 3,
            total_focus_minutes: 80,
        };
        assert_eq!(summary.average_session_minutes(), 26.7);
    }
}
