/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login, refresh, logout via the hosted auth service
/// - `profile`: The caller's profile
/// - `tasks`: Personal tasks and task completion
/// - `xp`: XP level info and the level table
/// - `achievements`: Achievement catalog and evaluation
/// - `pomodoro`: Focus sessions
/// - `boards`: Shared boards, their tasks and members
/// - `invites`: Board invitations
/// - `analytics`: Completion statistics and streaks

pub mod achievements;
pub mod analytics;
pub mod auth;
pub mod boards;
pub mod health;
pub mod invites;
pub mod pomodoro;
pub mod profile;
pub mod tasks;
pub mod xp;

use serde::{Deserialize, Deserializer};

/// Deserializes a field that distinguishes "absent" from "null"
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// a missing field stays `None`, `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trims a free-text field, mapping blank to `None`
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, None);

        let cleared: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: Patch = serde_json::from_str(r#"{"description": "notes"}"#).unwrap();
        assert_eq!(set.description, Some(Some("notes".to_string())));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" CS ".to_string())), Some("CS".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
