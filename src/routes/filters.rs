use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    routes::{validate_steam_id, AppState},
};

/// Saved genre filter, used whenever a recommendation request names no genres
#[derive(Debug, Serialize, Deserialize)]
pub struct GenreFilter {
    pub genres: Vec<String>,
}

pub async fn get_filter(
    State(state): State<Arc<AppState>>,
    Path(steam_id): Path<String>,
) -> AppResult<Json<GenreFilter>> {
    validate_steam_id(&steam_id)?;

    let genres = state.recommendations.saved_genres(&steam_id).await?;

    Ok(Json(GenreFilter { genres }))
}

/// Handler for replacing the saved filter; responds with the stored list
pub async fn save_filter(
    State(state): State<Arc<AppState>>,
    Path(steam_id): Path<String>,
    Json(request): Json<GenreFilter>,
) -> AppResult<Json<GenreFilter>> {
    validate_steam_id(&steam_id)?;

    let genres = state
        .recommendations
        .save_genres(&steam_id, request.genres)
        .await?;

    Ok(Json(GenreFilter { genres }))
}

pub async fn clear_filter(
    State(state): State<Arc<AppState>>,
    Path(steam_id): Path<String>,
) -> AppResult<StatusCode> {
    validate_steam_id(&steam_id)?;

    state.recommendations.clear_saved_genres(&steam_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
