/// Board access checks
///
/// Board endpoints resolve the board and the caller's role in one step and
/// fail with an [`AccessError`] the API maps to 404 or 403.
///
/// # Permission Model
///
/// | Action | Owner | Member |
/// |---|---|---|
/// | View board, tasks, members | yes | yes |
/// | Create / edit / delete board tasks | yes | yes |
/// | Invite, remove members, delete board | yes | no |
///
/// # Example
///
/// ```no_run
/// use swamp_shared::auth::authorization::{require_board_access, BoardPermission};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn delete_board(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
///     let access = require_board_access(pool, board_id, user_id, BoardPermission::Manage).await?;
///     println!("{} may manage {}", user_id, access.board.name);
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::board::{BoardRole, SharedBoard};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Board not found")]
    BoardNotFound,

    /// Caller is neither the owner nor an accepted member
    #[error("Not a member of this board")]
    NotMember,

    /// Action is reserved for the board owner
    #[error("Only the board owner can do this")]
    NotOwner,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Permission types for authorization checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPermission {
    /// Any member
    Use,

    /// Owner only
    Manage,
}

impl BoardPermission {
    pub fn allows(&self, role: BoardRole) -> bool {
        match self {
            BoardPermission::Use => true,
            BoardPermission::Manage => role.is_owner(),
        }
    }
}

/// A board together with the caller's role on it
#[derive(Debug, Clone)]
pub struct BoardAccess {
    pub board: SharedBoard,
    pub role: BoardRole,
}

impl BoardAccess {
    pub fn is_owner(&self) -> bool {
        self.role.is_owner()
    }
}

/// Loads a board and checks the caller may perform `permission` on it
///
/// # Errors
///
/// - `AccessError::BoardNotFound` if the board does not exist
/// - `AccessError::NotMember` if the caller has no role on it
/// - `AccessError::NotOwner` if the permission needs the owner
pub async fn require_board_access(
    pool: &PgPool,
    board_id: Uuid,
    user_id: Uuid,
    permission: BoardPermission,
) -> Result<BoardAccess, AccessError> {
    let board = SharedBoard::find_by_id(pool, board_id)
        .await?
        .ok_or(AccessError::BoardNotFound)?;

    let role = SharedBoard::role_of(pool, &board, user_id)
        .await?
        .ok_or(AccessError::NotMember)?;

    if !permission.allows(role) {
        return Err(AccessError::NotOwner);
    }

    Ok(BoardAccess { board, role })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_matrix() {
        assert!(BoardPermission::Use.allows(BoardRole::Owner));
        assert!(BoardPermission::Use.allows(BoardRole::Member));
        assert!(BoardPermission::Manage.allows(BoardRole::Owner));
        assert!(!BoardPermission::Manage.allows(BoardRole::Member));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AccessError::BoardNotFound.to_string(), "Board not found");
        assert_eq!(
            AccessError::NotOwner.to_string(),
            "Only the board owner can do this"
        );
    }
}
