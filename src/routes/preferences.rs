use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::Preference,
    routes::{validate_game_id, validate_steam_id, AppState},
};

#[derive(Debug, Deserialize)]
pub struct PreferenceRequest {
    pub preference: Preference,
}

/// Handler for marking a game liked or disliked
///
/// Disliked games are excluded from future recommendations.
pub async fn set_preference(
    State(state): State<Arc<AppState>>,
    Path((steam_id, game_id)): Path<(String, String)>,
    Json(request): Json<PreferenceRequest>,
) -> AppResult<StatusCode> {
    validate_steam_id(&steam_id)?;
    validate_game_id(&game_id)?;

    state
        .recommendations
        .set_preference(&steam_id, &game_id, request.preference)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for removing a preference
pub async fn clear_preference(
    State(state): State<Arc<AppState>>,
    Path((steam_id, game_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    validate_steam_id(&steam_id)?;
    validate_game_id(&game_id)?;

    state
        .recommendations
        .clear_preference(&steam_id, &game_id)
        .await?;

    tracing::info!(steam_id = %steam_id, game_id = %game_id, "Preference cleared");

    Ok(StatusCode::NO_CONTENT)
}
