//! Activity event types.
//!
//! Every recorded action produces an activity event. Events use ULIDs for
//! time-ordered ids, which makes per-user history listings a prefix scan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::{ActivityId, UserId};

/// A recorded trackable action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Unique event id (ULID for time-ordering).
    pub id: ActivityId,

    /// The user who performed the action.
    pub user_id: UserId,

    /// What the user did.
    pub action: ActionKind,

    /// Points awarded, including any milestone bonus.
    pub points_awarded: u64,

    /// Streak after this action was recorded.
    pub streak_after: u32,

    /// Streak milestone hit by this action, if any.
    pub milestone: Option<u32>,

    /// When the action was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// Create a new event with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(
        user_id: UserId,
        action: ActionKind,
        points_awarded: u64,
        streak_after: u32,
        milestone: Option<u32>,
    ) -> Self {
        Self {
            id: ActivityId::generate(),
            user_id,
            action,
            points_awarded,
            streak_after,
            milestone,
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_get_distinct_ids() {
        let user_id = UserId::generate();
        let first = ActivityEvent::new(user_id, ActionKind::SummaryGenerated, 10, 1, None);
        let second = ActivityEvent::new(user_id, ActionKind::QuizCompleted, 25, 1, None);

        assert_ne!(first.id, second.id);
    }
}
