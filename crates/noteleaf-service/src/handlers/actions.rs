//! Action recording handlers.
//!
//! The generation pipeline reports completed actions here. Recording an
//! action applies points and streak updates, then evaluates achievements
//! against the post-commit counters. Achievement grants are a separate,
//! idempotent store operation, so a notification delayed by a concurrent
//! action still lands on a later call and is never duplicated.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use noteleaf_core::{achievements, ActionKind, ActivityEvent, Unlock};
use noteleaf_store::Store;

use crate::auth::{AuthUser, ServiceAuth};
use crate::error::ApiError;
use crate::handlers::achievements::AchievementResponse;
use crate::state::AppState;

/// Record action request from services.
#[derive(Debug, Deserialize)]
pub struct RecordActionRequest {
    /// The user who performed the action.
    pub user_id: String,
    /// What the user did.
    pub action: ActionKind,
}

/// Record action response.
#[derive(Debug, Serialize)]
pub struct RecordActionResponse {
    /// Whether the action was recorded. Missing profiles and store failures
    /// report `false` rather than an error.
    pub success: bool,
    /// Points awarded, including any milestone bonus.
    pub points_awarded: u64,
    /// The streak after the action.
    pub streak: u32,
    /// Streak milestone hit by this action, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_milestone: Option<u32>,
    /// Achievements newly unlocked by this action.
    pub new_achievements: Vec<AchievementResponse>,
}

impl RecordActionResponse {
    fn failed() -> Self {
        Self {
            success: false,
            points_awarded: 0,
            streak: 0,
            streak_milestone: None,
            new_achievements: Vec::new(),
        }
    }
}

/// Record a trackable action.
pub async fn record_action(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<RecordActionRequest>,
) -> Result<Json<RecordActionResponse>, ApiError> {
    tracing::debug!(
        service = %auth.service_name,
        user_id = %body.user_id,
        action = ?body.action,
        "Recording action"
    );

    let user_id = body
        .user_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".into()))?;

    // Streak days are UTC calendar days.
    let today = Utc::now().date_naive();

    // Gamification must never block the primary flow: a missing profile or
    // a store failure degrades to success: false.
    let outcome = match state.store.record_action(&user_id, body.action, today) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Action not recorded");
            return Ok(Json(RecordActionResponse::failed()));
        }
    };

    // Evaluate achievements against the post-commit counters. Under
    // concurrent actions this may read counters another call has already
    // advanced past; the grant below is an idempotent add-to-set, so
    // unlocks are delayed at worst, never duplicated or lost.
    let newly = achievements::evaluate(&outcome.counters, &outcome.unlocked_ids);

    let mut new_achievements = Vec::new();
    if !newly.is_empty() {
        let now = Utc::now();
        let unlocks: Vec<Unlock> = newly
            .iter()
            .map(|def| Unlock {
                id: def.id.to_string(),
                unlocked_at: now,
            })
            .collect();

        match state.store.grant_achievements(&user_id, &unlocks) {
            Ok(added) => {
                new_achievements = newly
                    .iter()
                    .filter(|def| added.iter().any(|id| id == def.id))
                    .map(|def| AchievementResponse::from(*def))
                    .collect();

                if !new_achievements.is_empty() {
                    tracing::info!(
                        user_id = %user_id,
                        achievements = ?added,
                        "Achievements unlocked"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Achievement grant failed - will unlock on a later action"
                );
            }
        }
    }

    Ok(Json(RecordActionResponse {
        success: true,
        points_awarded: outcome.points_awarded,
        streak: outcome.streak,
        streak_milestone: outcome.milestone,
        new_achievements,
    }))
}

/// Activity history query parameters.
#[derive(Debug, Deserialize)]
pub struct ListHistoryQuery {
    /// Maximum number of events to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Activity event response.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    /// Event ID.
    pub id: String,
    /// What the user did.
    pub action: ActionKind,
    /// Points awarded.
    pub points_awarded: u64,
    /// Streak after the action.
    pub streak_after: u32,
    /// Milestone hit, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u32>,
    /// Timestamp.
    pub recorded_at: String,
}

impl From<&ActivityEvent> for ActivityResponse {
    fn from(event: &ActivityEvent) -> Self {
        Self {
            id: event.id.to_string(),
            action: event.action,
            points_awarded: event.points_awarded,
            streak_after: event.streak_after,
            milestone: event.milestone,
            recorded_at: event.recorded_at.to_rfc3339(),
        }
    }
}

/// Activity history response.
#[derive(Debug, Serialize)]
pub struct ListHistoryResponse {
    /// Events, newest first.
    pub events: Vec<ActivityResponse>,
    /// Whether more events exist past this page.
    pub has_more: bool,
}

/// List the caller's activity history, newest first.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListHistoryQuery>,
) -> Result<Json<ListHistoryResponse>, ApiError> {
    // Verify the profile exists
    state
        .store
        .get_profile(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let events = state
        .store
        .list_activity(&auth.user_id, limit + 1, query.offset)?;

    let has_more = events.len() > limit;
    let events: Vec<_> = events.iter().take(limit).map(ActivityResponse::from).collect();

    Ok(Json(ListHistoryResponse { events, has_more }))
}
