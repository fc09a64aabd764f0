//! User profile types.
//!
//! The profile is the single per-user record: identity, reserved username,
//! point total, streak state, usage counters, and unlocked achievements.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::Unlock;
use crate::actions::Counters;
use crate::username::Username;
use crate::UserId;

/// A user's study profile.
///
/// Created at signup, mutated by every gamified action and by username
/// changes. Points and counters only ever increase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// The user id (from the identity provider).
    pub user_id: UserId,

    /// Free-form display name.
    pub display_name: String,

    /// Reserved username, if the user has claimed one.
    pub username: Option<Username>,

    /// Total points earned.
    pub points: u64,

    /// Consecutive activity days.
    pub streak: u32,

    /// Calendar day (UTC) of the most recent trackable action.
    pub last_activity: Option<NaiveDate>,

    /// Per-action usage counters.
    pub counters: Counters,

    /// Unlocked achievements with unlock timestamps.
    pub achievements: Vec<Unlock>,

    /// When the profile was created.
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a fresh profile with no activity.
    #[must_use]
    pub fn new(user_id: UserId, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            display_name,
            username: None,
            points: 0,
            streak: 0,
            last_activity: None,
            counters: Counters::default(),
            achievements: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-folded key of the current username, if one is reserved.
    #[must_use]
    pub fn username_key(&self) -> Option<&str> {
        self.username.as_ref().map(Username::key)
    }

    /// Whether the achievement id is already unlocked.
    #[must_use]
    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|unlock| unlock.id == id)
    }

    /// Ids of all unlocked achievements.
    #[must_use]
    pub fn unlocked_ids(&self) -> Vec<String> {
        self.achievements
            .iter()
            .map(|unlock| unlock.id.clone())
            .collect()
    }
}
