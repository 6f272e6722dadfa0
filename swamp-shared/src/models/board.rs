/// Shared task boards
///
/// A board's members are its owner plus every user whose invite to it has
/// been accepted. There is no separate membership table; see
/// [`crate::models::board_invite`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE shared_boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// A member's role on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardRole {
    Owner,
    Member,
}

impl BoardRole {
    pub fn is_owner(&self) -> bool {
        matches!(self, BoardRole::Owner)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SharedBoard {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Board as listed for one member
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BoardSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub name: String,
    pub description: Option<String>,
    pub is_owner: bool,
    /// Owner included
    pub member_count: i64,
    pub task_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One row of a board's member list
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BoardMember {
    pub user_id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl SharedBoard {
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let board = sqlx::query_as::<_, SharedBoard>(
            r#"
            INSERT INTO shared_boards (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, description, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(board)
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let board = sqlx::query_as::<_, SharedBoard>(
            r#"
            SELECT id, owner_id, name, description, created_at, updated_at
            FROM shared_boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(board)
    }

    /// Boards the user owns or has joined, newest first
    pub async fn list_for_member(pool: &PgPool, user_id: Uuid) -> Result<Vec<BoardSummary>, sqlx::Error> {
        let boards = sqlx::query_as::<_, BoardSummary>(
            r#"
            SELECT b.id, b.owner_id, o.username AS owner_username, b.name, b.description,
                   b.owner_id = $1 AS is_owner,
                   1 + (SELECT COUNT(*) FROM board_invites i
                        WHERE i.board_id = b.id AND i.status = 'accepted') AS member_count,
                   (SELECT COUNT(*) FROM board_tasks bt WHERE bt.board_id = b.id) AS task_count,
                   b.created_at
            FROM shared_boards b
            JOIN users o ON o.id = b.owner_id
            WHERE b.owner_id = $1
               OR EXISTS (SELECT 1 FROM board_invites i
                          WHERE i.board_id = b.id AND i.invitee_id = $1 AND i.status = 'accepted')
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// The user's role on a board, None if not a member
    pub async fn role_of<'e, E>(
        executor: E,
        board: &SharedBoard,
        user_id: Uuid,
    ) -> Result<Option<BoardRole>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if board.owner_id == user_id {
            return Ok(Some(BoardRole::Owner));
        }

        let accepted: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM board_invites
                WHERE board_id = $1 AND invitee_id = $2 AND status = 'accepted'
            )
            "#,
        )
        .bind(board.id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(accepted.then_some(BoardRole::Member))
    }

    /// Owner first, then members in join order
    pub async fn members(pool: &PgPool, board_id: Uuid) -> Result<Vec<BoardMember>, sqlx::Error> {
        let members = sqlx::query_as::<_, BoardMember>(
            r#"
            SELECT u.id AS user_id, u.username, u.first_name, u.last_name,
                   'owner' AS role, b.created_at AS joined_at
            FROM shared_boards b
            JOIN users u ON u.id = b.owner_id
            WHERE b.id = $1
            UNION ALL
            SELECT u.id, u.username, u.first_name, u.last_name,
                   'member', COALESCE(i.responded_at, i.created_at)
            FROM board_invites i
            JOIN users u ON u.id = i.invitee_id
            WHERE i.board_id = $1 AND i.status = 'accepted'
            ORDER BY 5 DESC, 6
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Deletes a board with its invites and tasks
    ///
    /// The tasks behind `board_tasks` rows are removed explicitly; deleting
    /// them cascades to the link rows.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE id IN (SELECT task_id FROM board_tasks WHERE board_id = $1)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM shared_boards WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&BoardRole::Owner).unwrap(), "\"owner\"");
        assert!(BoardRole::Owner.is_owner());
        assert!(!BoardRole::Member.is_owner());
    }
}
