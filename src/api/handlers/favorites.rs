use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::favorite_error;
use crate::api::middleware::AuthSession;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::favorites::{self, LocalFavorite, MergeReport};
use crate::storage::models::Favorite;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateFavoriteRequest {
    #[serde(default)]
    pub title: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MergeFavoritesRequest {
    pub favorites: Vec<LocalFavorite>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub created_at: String,
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteListResponse {
    pub favorites: Vec<FavoriteResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    AuthSession(claim): AuthSession,
) -> Result<Json<JSend<FavoriteListResponse>>, ApiError> {
    let favorites = favorites::list(&state.db, claim.account_id).map_err(favorite_error)?;

    Ok(JSend::success(FavoriteListResponse {
        favorites: favorites.iter().map(favorite_to_response).collect(),
    }))
}

pub async fn create_favorite(
    State(state): State<Arc<AppState>>,
    AuthSession(claim): AuthSession,
    AppJson(req): AppJson<CreateFavoriteRequest>,
) -> Result<Json<JSend<FavoriteResponse>>, ApiError> {
    if req.url.trim().is_empty() {
        return Err(ApiError::bad_request("url is required"));
    }

    let favorite = favorites::add(&state.db, claim.account_id, &req.url, &req.title)
        .map_err(favorite_error)?;

    Ok(JSend::success(favorite_to_response(&favorite)))
}

pub async fn delete_favorite(
    State(state): State<Arc<AppState>>,
    AuthSession(claim): AuthSession,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    favorites::remove(&state.db, claim.account_id, &id).map_err(favorite_error)?;
    Ok(JSend::success(()))
}

/// One-time local → server merge. The client clears its anonymous local
/// store only after receiving this success response, so a failed call can
/// be retried without losing anything.
pub async fn merge_favorites(
    State(state): State<Arc<AppState>>,
    AuthSession(claim): AuthSession,
    AppJson(req): AppJson<MergeFavoritesRequest>,
) -> Result<Json<JSend<MergeReport>>, ApiError> {
    let report = favorites::merge_local(&state.db, claim.account_id, req.favorites)
        .map_err(favorite_error)?;

    Ok(JSend::success(report))
}

// ============================================================================
// Helpers
// ============================================================================

fn favorite_to_response(favorite: &Favorite) -> FavoriteResponse {
    FavoriteResponse {
        created_at: favorite.created_at.to_rfc3339(),
        id: favorite.id.clone(),
        title: favorite.title.clone(),
        url: favorite.url.clone(),
    }
}
