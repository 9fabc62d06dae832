//! Identifier schemes for bot messages.
//!
//! Ids embed a UUID v7 (millisecond timestamp plus random bits), so every
//! id issued by this process is distinct. Guest messages only ever live
//! in the widget and use the `ai-local-` prefix for both phases.

use uuid::Uuid;

/// Temporary id for a pending bot placeholder.
pub fn temp_id(is_guest: bool) -> String {
    if is_guest {
        format!("ai-local-{}", Uuid::now_v7())
    } else {
        format!("ai-temp-{}", Uuid::now_v7())
    }
}

/// Final id assigned when a reply arrives.
pub fn final_id(is_guest: bool) -> String {
    if is_guest {
        format!("ai-local-{}", Uuid::now_v7())
    } else {
        format!("ai-{}", Uuid::now_v7())
    }
}

/// Id of a user message loaded from history.
pub fn history_user_id(record_id: i64) -> String {
    format!("user-{record_id}")
}

/// Id of a bot reply loaded from history.
pub fn history_bot_id(record_id: i64) -> String {
    format!("ai-{record_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_prefixes() {
        assert!(temp_id(true).starts_with("ai-local-"));
        assert!(temp_id(false).starts_with("ai-temp-"));
        assert!(final_id(true).starts_with("ai-local-"));
        assert!(final_id(false).starts_with("ai-"));
        assert!(!final_id(false).starts_with("ai-temp-"));
    }

    #[test]
    fn test_temp_ids_never_collide() {
        let ids: HashSet<_> = (0..10_000).map(|_| temp_id(false)).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_history_ids() {
        assert_eq!(history_user_id(4), "user-4");
        assert_eq!(history_bot_id(4), "ai-4");
    }
}
