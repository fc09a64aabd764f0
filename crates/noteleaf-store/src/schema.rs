//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary profile records, keyed by `user_id`.
    pub const PROFILES: &str = "profiles";

    /// Username reservations, keyed by case-folded username.
    pub const USERNAMES: &str = "usernames";

    /// Activity events, keyed by `activity_id` (ULID).
    pub const ACTIVITY: &str = "activity";

    /// Index: activity by user, keyed by `user_id || activity_id`.
    /// Value is empty (index only).
    pub const ACTIVITY_BY_USER: &str = "activity_by_user";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::PROFILES,
        cf::USERNAMES,
        cf::ACTIVITY,
        cf::ACTIVITY_BY_USER,
    ]
}
