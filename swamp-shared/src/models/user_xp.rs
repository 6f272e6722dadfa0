/// Running XP totals
///
/// One row per user, created lazily by the first award. Increments are a
/// single upsert, so concurrent awards never lose points.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserXp {
    pub user_id: Uuid,
    pub total_xp: i64,
    pub updated_at: DateTime<Utc>,
}

impl UserXp {
    /// Current total, 0 for users that have never earned XP
    pub async fn total<'e, E>(executor: E, user_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT total_xp FROM user_xp WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(executor)
                .await?;

        Ok(total.unwrap_or(0))
    }

    /// Adds XP and returns the new total
    pub async fn add<'e, E>(executor: E, user_id: Uuid, amount: i64) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let total: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO user_xp (user_id, total_xp)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
                SET total_xp = user_xp.total_xp + EXCLUDED.total_xp,
                    updated_at = NOW()
            RETURNING total_xp
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }
}
