//! Streak arithmetic and milestone bonuses.
//!
//! A streak counts consecutive calendar days with at least one trackable
//! action. Calendar days are computed in UTC by callers; this module only
//! compares dates.

use chrono::NaiveDate;

// ============================================================================
// Constants
// ============================================================================

/// Streak lengths that trigger a one-time milestone bonus.
pub const STREAK_MILESTONES: [u32; 3] = [3, 5, 7];

/// Bonus points for reaching a 3-day streak.
pub const MILESTONE_3_BONUS_POINTS: u64 = 15;

/// Bonus points for reaching a 5-day streak.
pub const MILESTONE_5_BONUS_POINTS: u64 = 25;

/// Bonus points for reaching a 7-day streak.
pub const MILESTONE_7_BONUS_POINTS: u64 = 50;

/// The result of advancing a streak for an action on `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    /// The streak after the action.
    pub streak: u32,

    /// Whether the streak value changed this invocation. False when the
    /// action lands on the same calendar day as the last recorded activity.
    pub extended: bool,
}

/// Advance a streak for an action occurring on `today`.
///
/// - Same calendar day as the last activity: streak unchanged.
/// - Exactly one day after the last activity: streak + 1.
/// - Any larger gap, no prior activity, or a date in the future of `today`
///   (clock skew): reset to 1.
#[must_use]
pub fn advance(last_activity: Option<NaiveDate>, streak: u32, today: NaiveDate) -> StreakUpdate {
    match last_activity {
        Some(last) if last == today => StreakUpdate {
            streak,
            extended: false,
        },
        Some(last) if last.succ_opt() == Some(today) => StreakUpdate {
            streak: streak + 1,
            extended: true,
        },
        _ => StreakUpdate {
            streak: 1,
            extended: true,
        },
    }
}

/// A streak milestone hit by the current invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    /// The streak length that was reached.
    pub streak: u32,

    /// The one-time point bonus for reaching it.
    pub bonus_points: u64,
}

/// The milestone triggered by a streak update, if any.
///
/// Only an update that landed exactly on a milestone value triggers it;
/// repeating an action later the same day does not. Milestones are per
/// streak-run: after a reset, climbing back re-triggers them.
#[must_use]
pub const fn milestone_for(update: StreakUpdate) -> Option<Milestone> {
    if !update.extended {
        return None;
    }
    match update.streak {
        3 => Some(Milestone {
            streak: 3,
            bonus_points: MILESTONE_3_BONUS_POINTS,
        }),
        5 => Some(Milestone {
            streak: 5,
            bonus_points: MILESTONE_5_BONUS_POINTS,
        }),
        7 => Some(Milestone {
            streak: 7,
            bonus_points: MILESTONE_7_BONUS_POINTS,
        }),
        _ => None,
    }
}
