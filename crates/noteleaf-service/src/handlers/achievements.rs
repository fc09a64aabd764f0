//! Achievement handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use noteleaf_core::{achievements, AchievementDef};
use noteleaf_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Achievement definition response.
#[derive(Debug, Serialize)]
pub struct AchievementResponse {
    /// Badge id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Counter value at which the badge unlocks.
    pub threshold: u64,
}

impl From<&AchievementDef> for AchievementResponse {
    fn from(def: &AchievementDef) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            threshold: def.threshold,
        }
    }
}

/// Catalog response.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// All achievement definitions, in catalog order.
    pub achievements: Vec<AchievementResponse>,
}

/// List the static achievement catalog.
pub async fn list_catalog(_auth: AuthUser) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        achievements: achievements::catalog()
            .iter()
            .map(AchievementResponse::from)
            .collect(),
    })
}

/// An unlocked achievement with its timestamp.
#[derive(Debug, Serialize)]
pub struct UnlockedResponse {
    /// Badge id.
    pub id: String,
    /// Display name (from the catalog; unknown ids fall back to the id).
    pub name: String,
    /// Short description.
    pub description: String,
    /// When the badge was unlocked.
    pub unlocked_at: String,
}

/// Unlocked achievements response.
#[derive(Debug, Serialize)]
pub struct ListUnlockedResponse {
    /// The caller's unlocked achievements, in unlock order.
    pub achievements: Vec<UnlockedResponse>,
}

/// List the caller's unlocked achievements.
pub async fn list_unlocked(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ListUnlockedResponse>, ApiError> {
    let profile = state
        .store
        .get_profile(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    let unlocked = profile
        .achievements
        .iter()
        .map(|unlock| {
            let def = achievements::find(&unlock.id);
            UnlockedResponse {
                id: unlock.id.clone(),
                name: def.map_or_else(|| unlock.id.clone(), |d| d.name.to_string()),
                description: def.map_or_else(String::new, |d| d.description.to_string()),
                unlocked_at: unlock.unlocked_at.to_rfc3339(),
            }
        })
        .collect();

    Ok(Json(ListUnlockedResponse {
        achievements: unlocked,
    }))
}
