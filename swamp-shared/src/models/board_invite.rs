/// Board invitations
///
/// An invite is the membership record: `pending` until the invitee answers,
/// then `accepted` (member) or `declined`. There is at most one row per
/// `(board_id, invitee_id)`; re-inviting after a decline reuses it.
///
/// # State Machine
///
/// ```text
/// pending → accepted
///         → declined → pending (re-invite)
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invite_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardInvite {
    pub id: Uuid,
    pub board_id: Uuid,
    pub inviter_id: Uuid,
    pub invitee_id: Uuid,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Pending invite as shown to the invitee
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PendingInvite {
    pub id: Uuid,
    pub board_id: Uuid,
    pub board_name: String,
    pub board_description: Option<String>,
    pub inviter_username: String,
    pub created_at: DateTime<Utc>,
}

impl BoardInvite {
    /// Invites a user to a board
    ///
    /// Returns None if the user already has a pending or accepted invite to
    /// the board. A declined invite is reset to pending.
    pub async fn create(
        pool: &PgPool,
        board_id: Uuid,
        inviter_id: Uuid,
        invitee_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invite = sqlx::query_as::<_, BoardInvite>(
            r#"
            INSERT INTO board_invites (board_id, inviter_id, invitee_id)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT board_invites_board_invitee_key DO UPDATE
                SET status = 'pending',
                    inviter_id = EXCLUDED.inviter_id,
                    created_at = NOW(),
                    responded_at = NULL
                WHERE board_invites.status = 'declined'
            RETURNING id, board_id, inviter_id, invitee_id, status, created_at, responded_at
            "#,
        )
        .bind(board_id)
        .bind(inviter_id)
        .bind(invitee_id)
        .fetch_optional(pool)
        .await?;

        Ok(invite)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let invite = sqlx::query_as::<_, BoardInvite>(
            r#"
            SELECT id, board_id, inviter_id, invitee_id, status, created_at, responded_at
            FROM board_invites
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(invite)
    }

    /// Pending invites addressed to the user, newest first
    pub async fn list_pending_for(pool: &PgPool, invitee_id: Uuid) -> Result<Vec<PendingInvite>, sqlx::Error> {
        let invites = sqlx::query_as::<_, PendingInvite>(
            r#"
            SELECT i.id, i.board_id, b.name AS board_name, b.description AS board_description,
                   u.username AS inviter_username, i.created_at
            FROM board_invites i
            JOIN shared_boards b ON b.id = i.board_id
            JOIN users u ON u.id = i.inviter_id
            WHERE i.invitee_id = $1 AND i.status = 'pending'
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(invitee_id)
        .fetch_all(pool)
        .await?;

        Ok(invites)
    }

    /// Answers a pending invite addressed to `invitee_id`
    ///
    /// Returns None if the invite is missing, addressed to someone else, or
    /// already answered.
    pub async fn respond<'e, E>(
        executor: E,
        id: Uuid,
        invitee_id: Uuid,
        status: InviteStatus,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let invite = sqlx::query_as::<_, BoardInvite>(
            r#"
            UPDATE board_invites
            SET status = $3,
                responded_at = NOW()
            WHERE id = $1 AND invitee_id = $2 AND status = 'pending'
            RETURNING id, board_id, inviter_id, invitee_id, status, created_at, responded_at
            "#,
        )
        .bind(id)
        .bind(invitee_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(invite)
    }

    /// Removes a member's accepted invite, revoking their membership
    pub async fn remove_member(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM board_invites WHERE board_id = $1 AND invitee_id = $2 AND status = 'accepted'",
        )
        .bind(board_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
