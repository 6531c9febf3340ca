use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    routes::{validate_steam_id, AppState},
    services::{HistoryPage, RecommendOutcome, DEFAULT_PAGE_SIZE},
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// Absent means "use the saved genre filter"
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Handler for generating a new recommendation
///
/// A validated, newly saved game is `201 Created`. An already recommended game
/// and "nothing found" are both ordinary `200` outcomes, told apart by `status`.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Path(steam_id): Path<String>,
    request: Option<Json<RecommendationRequest>>,
) -> AppResult<(StatusCode, Json<RecommendOutcome>)> {
    validate_steam_id(&steam_id)?;

    let genres = request.and_then(|Json(request)| request.genres);

    tracing::info!(
        steam_id = %steam_id,
        genres = ?genres,
        "Processing recommendation request"
    );

    let outcome = state.recommendations.recommend(&steam_id, genres).await?;

    let status = match outcome {
        RecommendOutcome::Recommended { .. } => StatusCode::CREATED,
        _ => StatusCode::OK,
    };

    Ok((status, Json(outcome)))
}

/// Handler for listing past recommendations, newest first
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(steam_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<HistoryPage>> {
    validate_steam_id(&steam_id)?;

    let page = state
        .recommendations
        .history(
            &steam_id,
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            params.offset.unwrap_or(0),
        )
        .await?;

    Ok(Json(page))
}
