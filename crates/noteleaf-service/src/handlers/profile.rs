//! Profile management handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use noteleaf_core::{Counters, Profile, Username};
use noteleaf_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Profile response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User ID.
    pub user_id: String,
    /// Display name.
    pub display_name: String,
    /// Reserved username, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Total points earned.
    pub points: u64,
    /// Consecutive activity days.
    pub streak: u32,
    /// Calendar day (UTC) of the most recent trackable action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
    /// Per-action usage counters.
    pub counters: Counters,
    /// Number of unlocked achievements.
    pub achievements_unlocked: usize,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            display_name: profile.display_name.clone(),
            username: profile.username.as_ref().map(ToString::to_string),
            points: profile.points,
            streak: profile.streak,
            last_activity: profile.last_activity.map(|d| d.to_string()),
            counters: profile.counters.clone(),
            achievements_unlocked: profile.achievements.len(),
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

/// Create profile request.
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    /// Optional display name (defaults to a placeholder).
    pub display_name: Option<String>,
}

/// Create a new profile at signup.
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    // Check if the profile already exists
    if state.store.get_profile(&auth.user_id)?.is_some() {
        return Err(ApiError::Conflict("Profile already exists".into()));
    }

    let display_name = body
        .display_name
        .unwrap_or_else(|| format!("Learner {}", auth.user_id));

    let profile = Profile::new(auth.user_id, display_name);
    state.store.put_profile(&profile)?;

    tracing::info!(user_id = %auth.user_id, "Profile created");

    Ok(Json(ProfileResponse::from(&profile)))
}

/// Get the current user's profile.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .store
        .get_profile(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// Update username request.
#[derive(Debug, Deserialize)]
pub struct UpdateUsernameRequest {
    /// The desired username.
    pub username: String,
}

/// Update username response.
#[derive(Debug, Serialize)]
pub struct UpdateUsernameResponse {
    /// The final (display-case) username.
    pub username: String,
    /// Whether anything changed. False when the requested name case-folds
    /// to the current one.
    pub changed: bool,
}

/// Reserve or change the caller's username.
///
/// Validates the format before touching the store; the reservation itself
/// is one atomic store transaction.
pub async fn update_username(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<UpdateUsernameRequest>,
) -> Result<Json<UpdateUsernameResponse>, ApiError> {
    let username = Username::parse(&body.username)?;

    let outcome = state.store.reserve_username(&auth.user_id, &username)?;

    if outcome.changed {
        tracing::info!(
            user_id = %auth.user_id,
            username = %outcome.username,
            "Username changed"
        );
    }

    Ok(Json(UpdateUsernameResponse {
        username: outcome.username,
        changed: outcome.changed,
    }))
}

/// Username availability response.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// The username that was checked.
    pub username: String,
    /// Whether it can be reserved. Invalid formats report as unavailable.
    pub available: bool,
}

/// Check whether a username can be reserved.
pub async fn username_available(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    // An invalid format is reported as unavailable, not as an error.
    let Ok(username) = Username::parse(&raw) else {
        return Ok(Json(AvailabilityResponse {
            username: raw,
            available: false,
        }));
    };

    let available = state.store.get_reservation(username.key())?.is_none();

    Ok(Json(AvailabilityResponse {
        username: raw,
        available,
    }))
}
