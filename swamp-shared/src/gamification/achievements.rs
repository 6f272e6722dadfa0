/// Achievement unlock evaluator
///
/// An achievement unlocks once the counter for its category reaches its
/// `requirement_value`:
///
/// - `tasks`: completed tasks
/// - `focus`: completed focus sessions
/// - `level`: current level
///
/// Achievements carry XP, so awarding one can push the user over a level
/// threshold and unlock a `level` achievement in turn. [`plan_awards`]
/// repeats evaluation until nothing new unlocks.

use crate::gamification::levels::level_for_xp;
use crate::models::achievement::{Achievement, AchievementCategory, UserAchievement};
use crate::models::focus_session::FocusSession;
use crate::models::task::Task;
use crate::models::user_xp::UserXp;
use serde::Serialize;
use sqlx::PgConnection;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Counters an achievement can be measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub tasks_completed: i64,
    pub focus_sessions_completed: i64,
    pub level: i32,
}

impl Progress {
    pub fn counter(&self, category: AchievementCategory) -> i64 {
        match category {
            AchievementCategory::Tasks => self.tasks_completed,
            AchievementCategory::Focus => self.focus_sessions_completed,
            AchievementCategory::Level => i64::from(self.level),
        }
    }
}

/// Achievement summary returned to clients when something unlocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarnedAchievement {
    pub code: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: i32,
}

impl From<&Achievement> for EarnedAchievement {
    fn from(achievement: &Achievement) -> Self {
        Self {
            code: achievement.code.clone(),
            name: achievement.name.clone(),
            description: achievement.description.clone(),
            icon: achievement.icon.clone(),
            xp_reward: achievement.xp_reward,
        }
    }
}

/// Result of an award pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct AwardOutcome {
    pub earned: Vec<EarnedAchievement>,
    pub xp_awarded: i64,
    pub total_xp: i64,
}

/// Catalog entries that are unearned and currently satisfied, in catalog order
pub fn evaluate<'a>(
    catalog: &'a [Achievement],
    earned: &HashSet<Uuid>,
    progress: &Progress,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|achievement| !earned.contains(&achievement.id))
        .filter(|achievement| {
            progress.counter(achievement.category) >= i64::from(achievement.requirement_value)
        })
        .collect()
}

/// Everything that unlocks from the current state, including level
/// achievements reached through other achievements' XP
///
/// Returns the unlocked achievements in award order and the XP they carry.
pub fn plan_awards<'a>(
    catalog: &'a [Achievement],
    earned: &HashSet<Uuid>,
    tasks_completed: i64,
    focus_sessions_completed: i64,
    total_xp: i64,
) -> (Vec<&'a Achievement>, i64) {
    let mut earned = earned.clone();
    let mut planned = Vec::new();
    let mut xp = 0;

    loop {
        let progress = Progress {
            tasks_completed,
            focus_sessions_completed,
            level: level_for_xp(total_xp + xp).level,
        };

        let unlocked = evaluate(catalog, &earned, &progress);
        if unlocked.is_empty() {
            break;
        }

        for achievement in unlocked {
            earned.insert(achievement.id);
            xp += i64::from(achievement.xp_reward);
            planned.push(achievement);
        }
    }

    (planned, xp)
}

/// Awards every achievement the user now qualifies for
///
/// Must run inside the caller's transaction. A per-user advisory lock
/// serialises concurrent passes so the XP used for level achievements is
/// the XP actually stored.
pub async fn check_and_award(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<AwardOutcome, sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    let catalog = Achievement::list(&mut *conn).await?;
    let earned: HashSet<Uuid> = UserAchievement::earned_ids(&mut *conn, user_id)
        .await?
        .into_iter()
        .collect();
    let tasks_completed = Task::count_completed(&mut *conn, user_id).await?;
    let focus_sessions_completed = FocusSession::count_completed(&mut *conn, user_id).await?;
    let mut total_xp = UserXp::total(&mut *conn, user_id).await?;

    let (planned, _) = plan_awards(
        &catalog,
        &earned,
        tasks_completed,
        focus_sessions_completed,
        total_xp,
    );

    let mut outcome = AwardOutcome::default();
    for achievement in planned {
        if UserAchievement::award(&mut *conn, user_id, achievement.id).await? {
            info!(
                user_id = %user_id,
                achievement = %achievement.code,
                xp_reward = achievement.xp_reward,
                "Achievement earned"
            );
            outcome.xp_awarded += i64::from(achievement.xp_reward);
            outcome.earned.push(EarnedAchievement::from(achievement));
        }
    }

    if outcome.xp_awarded > 0 {
        total_xp = UserXp::add(&mut *conn, user_id, outcome.xp_awarded).await?;
    }
    outcome.total_xp = total_xp;

    debug!(
        user_id = %user_id,
        earned = outcome.earned.len(),
        total_xp,
        "Achievement check finished"
    );

    Ok(outcome)
}
