/// Gamification rules
///
/// - [`levels`]: Static leveling curve and XP reward amounts
/// - [`achievements`]: Achievement unlock evaluator and award-once persistence
/// - [`rewards`]: XP + achievement bookkeeping for task and focus completions

pub mod achievements;
pub mod levels;
pub mod rewards;
