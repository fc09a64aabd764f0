//! `RocksDB` storage layer for noteleaf.
//!
//! This crate provides persistent storage for profiles, username
//! reservations, and activity events using `RocksDB` with column families
//! for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `profiles`: Primary profile records, keyed by `user_id`
//! - `usernames`: Username reservations, keyed by case-folded username
//! - `activity`: Activity events, keyed by `activity_id` (ULID)
//! - `activity_by_user`: Index for listing activity by user
//!
//! # Transactions
//!
//! Compound operations (`reserve_username`, `record_action`,
//! `grant_achievements`) read everything they need first, then commit all
//! writes in a single `WriteBatch` for all-or-nothing visibility. Compound
//! mutations serialize through an internal lock so the read-then-write
//! sequence of one operation cannot interleave with another's.
//!
//! # Example
//!
//! ```no_run
//! use noteleaf_store::{RocksStore, Store};
//! use noteleaf_core::{Profile, UserId};
//!
//! let store = RocksStore::open("/tmp/noteleaf-db").unwrap();
//!
//! let user_id = UserId::generate();
//! let profile = Profile::new(user_id, "Dana".into());
//! store.put_profile(&profile).unwrap();
//!
//! let retrieved = store.get_profile(&user_id).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::NaiveDate;

use noteleaf_core::{
    ActionKind, ActivityEvent, Counters, Profile, Unlock, UserId, Username, UsernameReservation,
};

/// Result of a username reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    /// The final display-case username.
    pub username: String,

    /// Whether any writes were performed. False when the requested name
    /// case-folds to the user's current one.
    pub changed: bool,
}

/// Result of recording a trackable action.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// Points awarded, including any milestone bonus.
    pub points_awarded: u64,

    /// The streak after the action.
    pub streak: u32,

    /// Streak milestone hit by this action, if any.
    pub milestone: Option<u32>,

    /// Counters after the commit. Input to achievement evaluation.
    pub counters: Counters,

    /// Achievement ids unlocked before this action.
    pub unlocked_ids: Vec<String>,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Profile Operations
    // =========================================================================

    /// Insert or update a profile record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_profile(&self, profile: &Profile) -> Result<()>;

    /// Get a profile by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>>;

    // =========================================================================
    // Username Operations
    // =========================================================================

    /// Get a username reservation by its case-folded key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_reservation(&self, key: &str) -> Result<Option<UsernameReservation>>;

    /// Atomically reserve a username for a user.
    ///
    /// Reads the profile and any conflicting reservation first, then commits
    /// the new reservation, the deletion of the user's old reservation, and
    /// the profile update in one batch. Re-reserving the current name
    /// (case-folded) is a no-op that performs zero writes.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the profile doesn't exist.
    /// - `StoreError::UsernameTaken` if another user owns the name.
    fn reserve_username(&self, user_id: &UserId, username: &Username) -> Result<RenameOutcome>;

    // =========================================================================
    // Action Recording
    // =========================================================================

    /// Record a trackable action performed on `today` (UTC calendar day).
    ///
    /// Advances the streak, applies the point delta (base + milestone
    /// bonus), bumps the action's counter, stamps the activity date, and
    /// appends an activity event, all in one atomic batch. The returned
    /// outcome carries the post-commit counters and previously unlocked ids
    /// for achievement evaluation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the profile doesn't exist.
    fn record_action(
        &self,
        user_id: &UserId,
        action: ActionKind,
        today: NaiveDate,
    ) -> Result<ActionOutcome>;

    /// Add achievements to a profile's unlock set.
    ///
    /// Add-to-set semantics: ids already present are skipped, so repeated
    /// grants never duplicate an unlock or disturb its original timestamp.
    /// Returns the ids that were actually added.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the profile doesn't exist.
    fn grant_achievements(&self, user_id: &UserId, unlocks: &[Unlock]) -> Result<Vec<String>>;

    // =========================================================================
    // Activity Operations
    // =========================================================================

    /// List activity events for a user, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_activity(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ActivityEvent>>;
}
