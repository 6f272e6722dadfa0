/// Leveling curve
///
/// Levels are derived from a user's running XP total using a fixed table of
/// thresholds. Level 10 has no upper bound.
///
/// # Example
///
/// ```
/// use swamp_shared::gamification::levels::level_for_xp;
///
/// let info = level_for_xp(300);
/// assert_eq!(info.level, 3);
/// assert_eq!(info.level_name, "Swamp Puppy");
/// assert_eq!(info.xp_to_next_level, 200);
/// assert_eq!(info.progress_percent, 20);
/// ```

use serde::Serialize;

/// One row of the leveling table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level {
    pub level: i32,
    pub name: &'static str,
    pub min_xp: i64,
    /// Exclusive upper bound; `None` for the last level
    pub max_xp: Option<i64>,
}

static LEVELS: [Level; 10] = [
    Level { level: 1, name: "Hatchling", min_xp: 0, max_xp: Some(100) },
    Level { level: 2, name: "Baby Gator", min_xp: 100, max_xp: Some(250) },
    Level { level: 3, name: "Swamp Puppy", min_xp: 250, max_xp: Some(500) },
    Level { level: 4, name: "Novice Chomper", min_xp: 500, max_xp: Some(850) },
    Level { level: 5, name: "Adept Reptile", min_xp: 850, max_xp: Some(1300) },
    Level { level: 6, name: "Disciple of Albert", min_xp: 1300, max_xp: Some(1900) },
    Level { level: 7, name: "Epic Gator", min_xp: 1900, max_xp: Some(2650) },
    Level { level: 8, name: "Legendary Gator", min_xp: 2650, max_xp: Some(3550) },
    Level { level: 9, name: "Mythic Gator", min_xp: 3550, max_xp: Some(4600) },
    Level { level: 10, name: "Gator God", min_xp: 4600, max_xp: None },
];

/// Highest reachable level
pub const MAX_LEVEL: i32 = 10;

/// XP awarded for completing a task
pub const TASK_COMPLETION_XP: i64 = 10;

/// XP awarded for completing a pomodoro session
pub const POMODORO_COMPLETION_XP: i64 = 5;

/// Bonus XP for the first completion of a day that extends a streak
pub const DAILY_STREAK_XP: i64 = 20;

/// The full leveling table, lowest level first
pub fn levels() -> &'static [Level] {
    &LEVELS
}

/// Level and progress derived from an XP total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub level: i32,
    pub level_name: &'static str,
    pub total_xp: i64,
    pub min_xp_for_level: i64,
    pub max_xp_for_level: Option<i64>,
    pub xp_to_next_level: i64,
    pub progress_percent: i64,
}

/// Computes level information for an XP total
///
/// Negative totals are treated as zero.
pub fn level_for_xp(total_xp: i64) -> LevelInfo {
    let xp = total_xp.max(0);

    // The table starts at 0 and the last level is unbounded, so a match always exists
    let row = LEVELS
        .iter()
        .rev()
        .find(|row| xp >= row.min_xp)
        .unwrap_or(&LEVELS[0]);

    let (xp_to_next_level, progress_percent) = match row.max_xp {
        Some(max_xp) => {
            let span = max_xp - row.min_xp;
            (max_xp - xp, (xp - row.min_xp) * 100 / span)
        }
        None => (0, 100),
    };

    LevelInfo {
        level: row.level,
        level_name: row.name,
        total_xp: xp,
        min_xp_for_level: row.min_xp,
        max_xp_for_level: row.max_xp,
        xp_to_next_level,
        progress_percent,
    }
}
