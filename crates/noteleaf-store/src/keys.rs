//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families.

use noteleaf_core::{ActivityId, UserId};

/// Create a profile key from a user ID.
#[must_use]
pub fn profile_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a reservation key from a case-folded username.
#[must_use]
pub fn username_key(key: &str) -> Vec<u8> {
    key.as_bytes().to_vec()
}

/// Create an activity key from an activity ID.
#[must_use]
pub fn activity_key(activity_id: &ActivityId) -> Vec<u8> {
    activity_id.to_bytes().to_vec()
}

/// Create a user-activity index key.
///
/// Format: `user_id (16 bytes) || activity_id (16 bytes)`
///
/// Since ULIDs are time-ordered, a user's events sort chronologically
/// within the prefix.
#[must_use]
pub fn user_activity_key(user_id: &UserId, activity_id: &ActivityId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&activity_id.to_bytes());
    key
}

/// Create a prefix for iterating all activity for a user.
#[must_use]
pub fn user_activity_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the activity ID from a user-activity index key.
///
/// Returns `None` if the key is shorter than 32 bytes.
#[must_use]
pub fn extract_activity_id_from_user_key(key: &[u8]) -> Option<ActivityId> {
    let tail = key.get(16..32)?;
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(tail);
    ActivityId::from_bytes(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_key_length() {
        let user_id = UserId::generate();
        let key = profile_key(&user_id);
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn username_key_is_raw_bytes() {
        assert_eq!(username_key("dana"), b"dana".to_vec());
    }

    #[test]
    fn activity_key_length() {
        let activity_id = ActivityId::generate();
        let key = activity_key(&activity_id);
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn user_activity_key_format() {
        let user_id = UserId::generate();
        let activity_id = ActivityId::generate();
        let key = user_activity_key(&user_id, &activity_id);

        assert_eq!(key.len(), 32);
        assert_eq!(&key[..16], user_id.as_bytes());
        assert_eq!(&key[16..], activity_id.to_bytes());
    }

    #[test]
    fn extract_activity_id_roundtrip() {
        let user_id = UserId::generate();
        let activity_id = ActivityId::generate();
        let key = user_activity_key(&user_id, &activity_id);

        let extracted = extract_activity_id_from_user_key(&key).unwrap();
        assert_eq!(extracted, activity_id);
    }

    #[test]
    fn extract_activity_id_rejects_short_keys() {
        assert!(extract_activity_id_from_user_key(&[0u8; 16]).is_none());
    }
}
