/// XP bookkeeping for completions
///
/// Each completion does the same three things inside the caller's
/// transaction: bump the day's counter, add the base XP (plus the streak
/// bonus for tasks), then run the achievement evaluator.

use crate::gamification::achievements::{check_and_award, EarnedAchievement};
use crate::gamification::levels::{
    level_for_xp, LevelInfo, DAILY_STREAK_XP, POMODORO_COMPLETION_XP, TASK_COMPLETION_XP,
};
use crate::models::daily_stats::DailyTaskStats;
use crate::models::user_xp::UserXp;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

/// What a completion earned
#[derive(Debug, Clone, Serialize)]
pub struct RewardSummary {
    /// Base XP + streak bonus + achievement XP
    pub xp_awarded: i64,
    pub total_xp: i64,
    pub level_info: LevelInfo,
    pub leveled_up: bool,
    pub achievements_earned: Vec<EarnedAchievement>,
}

impl RewardSummary {
    fn new(previous_xp: i64, xp_awarded: i64, total_xp: i64, achievements: Vec<EarnedAchievement>) -> Self {
        let level_info = level_for_xp(total_xp);

        Self {
            xp_awarded,
            total_xp,
            leveled_up: level_info.level > level_for_xp(previous_xp).level,
            level_info,
            achievements_earned: achievements,
        }
    }
}

/// Whether a task completion earns the streak bonus
///
/// `completed_today` is the day's count including this completion.
pub fn streak_bonus_applies(completed_today: i32, completed_yesterday: i32) -> bool {
    completed_today == 1 && completed_yesterday > 0
}

/// Rewards a task completion on `today`
pub async fn reward_task_completion(
    conn: &mut PgConnection,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<RewardSummary, sqlx::Error> {
    let previous_xp = UserXp::total(&mut *conn, user_id).await?;

    let stats = DailyTaskStats::increment_tasks(&mut *conn, user_id, today).await?;
    let yesterday = DailyTaskStats::find(&mut *conn, user_id, today - Duration::days(1))
        .await?
        .map(|s| s.tasks_completed)
        .unwrap_or(0);

    let mut base_xp = TASK_COMPLETION_XP;
    if streak_bonus_applies(stats.tasks_completed, yesterday) {
        info!(user_id = %user_id, bonus = DAILY_STREAK_XP, "Daily streak bonus awarded");
        base_xp += DAILY_STREAK_XP;
    }

    UserXp::add(&mut *conn, user_id, base_xp).await?;
    let outcome = check_and_award(conn, user_id).await?;

    Ok(RewardSummary::new(
        previous_xp,
        base_xp + outcome.xp_awarded,
        outcome.total_xp,
        outcome.earned,
    ))
}

/// Rewards a completed focus session on `today`
pub async fn reward_focus_completion(
    conn: &mut PgConnection,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<RewardSummary, sqlx::Error> {
    let previous_xp = UserXp::total(&mut *conn, user_id).await?;

    DailyTaskStats::increment_focus(&mut *conn, user_id, today).await?;
    UserXp::add(&mut *conn, user_id, POMODORO_COMPLETION_XP).await?;
    let outcome = check_and_award(conn, user_id).await?;

    Ok(RewardSummary::new(
        previous_xp,
        POMODORO_COMPLETION_XP + outcome.xp_awarded,
        outcome.total_xp,
        outcome.earned,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_bonus_only_on_first_completion_of_day() {
        assert!(streak_bonus_applies(1, 3));
        assert!(!streak_bonus_applies(2, 3));
    }

    #[test]
    fn test_streak_bonus_needs_activity_yesterday() {
        assert!(!streak_bonus_applies(1, 0));
    }

    #[test]
    fn test_summary_detects_level_up() {
        let summary = RewardSummary::new(95, 10, 105, Vec::new());
        assert!(summary.leveled_up);
        assert_eq!(summary.level_info.level, 2);

        let summary = RewardSummary::new(10, 10, 20, Vec::new());
        assert!(!summary.leveled_up);
    }
}
