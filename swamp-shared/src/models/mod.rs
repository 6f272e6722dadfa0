/// Database models for SwampScheduler
///
/// This module contains all database models and their queries. Functions
/// that take part in multi-table writes are generic over
/// [`sqlx::postgres::PgExecutor`], so they run equally against the pool or
/// inside a transaction.
///
/// # Models
///
/// - `user`: Application profiles linked to hosted auth accounts
/// - `task`: Personal (and board-backed) tasks
/// - `focus_session`: Pomodoro sessions
/// - `user_xp`: Running XP totals
/// - `daily_stats`: Per-day completion counters
/// - `achievement`: Achievement catalog and awards
/// - `board`: Shared boards
/// - `board_invite`: Invitations, which double as board membership
/// - `board_task`: Board status and assignee of board tasks
///
/// # Example
///
/// ```no_run
/// use swamp_shared::models::task::{Task, TaskFilter};
/// use swamp_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let open = Task::list_for_user(&pool, user_id, TaskFilter {
///     completed: Some(false),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod achievement;
pub mod board;
pub mod board_invite;
pub mod board_task;
pub mod daily_stats;
pub mod focus_session;
pub mod task;
pub mod user;
pub mod user_xp;
