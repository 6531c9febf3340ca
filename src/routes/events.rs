use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{EventKind, UserEvent},
    routes::{validate_steam_id, AppState},
    services::DEFAULT_EVENT_LIMIT,
};

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    #[serde(rename = "type")]
    pub kind: Option<EventKind>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EventLog {
    pub events: Vec<UserEvent>,
}

/// Handler for a user's activity log, newest first
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Path(steam_id): Path<String>,
    Query(params): Query<EventQuery>,
) -> AppResult<Json<EventLog>> {
    validate_steam_id(&steam_id)?;

    let events = state
        .recommendations
        .events(
            &steam_id,
            params.kind,
            params.limit.unwrap_or(DEFAULT_EVENT_LIMIT),
        )
        .await?;

    Ok(Json(EventLog { events }))
}
