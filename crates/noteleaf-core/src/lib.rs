//! Core types and gamification logic for noteleaf.
//!
//! This crate provides the foundational types used throughout the noteleaf
//! profile service:
//!
//! - **Identifiers**: `UserId`, `ActivityId`
//! - **Profiles**: `Profile`, `Counters`, `Unlock`
//! - **Usernames**: `Username`, `UsernameReservation`
//! - **Actions**: `ActionKind`, `CounterKind`, `ActivityEvent`
//! - **Streaks**: streak arithmetic and milestone bonuses
//! - **Achievements**: the static catalog and the evaluator
//!
//! # Points
//!
//! Every trackable action awards a fixed number of points; streak milestones
//! add a one-time bonus on top. Points are stored as `u64` and only ever
//! increase.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod achievements;
pub mod actions;
pub mod activity;
pub mod ids;
pub mod profile;
pub mod streak;
pub mod username;

pub use achievements::{AchievementDef, Unlock};
pub use actions::{
    ActionKind, CounterKind, Counters, FLASHCARDS_POINTS, MINDMAP_POINTS, PODCAST_POINTS,
    QUIZ_COMPLETED_POINTS, QUIZ_CORRECT_POINTS, SUMMARY_POINTS,
};
pub use activity::ActivityEvent;
pub use ids::{ActivityId, IdError, UserId};
pub use profile::Profile;
pub use streak::{Milestone, StreakUpdate, STREAK_MILESTONES};
pub use username::{
    Username, UsernameError, UsernameReservation, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};
