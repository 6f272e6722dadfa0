/// Achievement catalog and per-user awards
///
/// # Schema
///
/// ```sql
/// CREATE TYPE achievement_category AS ENUM ('tasks', 'focus', 'level');
///
/// CREATE TABLE achievements (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     code VARCHAR(50) NOT NULL UNIQUE,
///     name VARCHAR(100) NOT NULL,
///     description TEXT NOT NULL,
///     icon VARCHAR(16) NOT NULL,
///     xp_reward INTEGER NOT NULL CHECK (xp_reward >= 0),
///     category achievement_category NOT NULL,
///     requirement_value INTEGER NOT NULL CHECK (requirement_value > 0),
///     sort_order INTEGER NOT NULL DEFAULT 0
/// );
///
/// CREATE TABLE user_achievements (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     achievement_id UUID NOT NULL REFERENCES achievements(id) ON DELETE CASCADE,
///     earned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, achievement_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

/// Which counter an achievement is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "achievement_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    /// Completed task count
    Tasks,

    /// Completed focus session count
    Focus,

    /// Current level
    Level,
}

/// Catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: i32,
    pub category: AchievementCategory,
    pub requirement_value: i32,
    pub sort_order: i32,
}

/// Record of a user earning an achievement
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserAchievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub earned_at: DateTime<Utc>,
}

/// Catalog entry annotated with the caller's earned state
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AchievementStatus {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: i32,
    pub category: AchievementCategory,
    pub requirement_value: i32,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// Lists the full catalog in display order
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let achievements = sqlx::query_as::<_, Achievement>(
            r#"
            SELECT id, code, name, description, icon, xp_reward, category,
                   requirement_value, sort_order
            FROM achievements
            ORDER BY sort_order, code
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(achievements)
    }

    /// Lists the catalog with the user's earned flags
    pub async fn list_with_status<'e, E>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<AchievementStatus>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let achievements = sqlx::query_as::<_, AchievementStatus>(
            r#"
            SELECT a.id, a.code, a.name, a.description, a.icon, a.xp_reward,
                   a.category, a.requirement_value,
                   ua.earned_at IS NOT NULL AS earned,
                   ua.earned_at
            FROM achievements a
            LEFT JOIN user_achievements ua
                   ON ua.achievement_id = a.id AND ua.user_id = $1
            ORDER BY a.sort_order, a.code
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(achievements)
    }
}

impl UserAchievement {
    /// IDs of every achievement the user has earned
    pub async fn earned_ids<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT achievement_id FROM user_achievements WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(executor)
                .await?;

        Ok(ids)
    }

    /// Records an award
    ///
    /// Returns false if the user already had the achievement; the unique key
    /// makes concurrent awards of the same achievement a no-op.
    pub async fn award<'e, E>(
        executor: E,
        user_id: Uuid,
        achievement_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO user_achievements (user_id, achievement_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT user_achievements_user_achievement_key DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(achievement_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde() {
        let parsed: AchievementCategory = serde_json::from_str("\"tasks\"").unwrap();
        assert_eq!(parsed, AchievementCategory::Tasks);
        assert!(serde_json::from_str::<AchievementCategory>("\"task\"").is_err());
        assert_eq!(
            serde_json::to_string(&AchievementCategory::Focus).unwrap(),
            "\"focus\""
        );
    }
}
