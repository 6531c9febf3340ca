use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::{make_span_with_request_id, MakeRequestUuid, REQUEST_ID_HEADER},
    services::RecommendationService,
};

pub mod events;
pub mod filters;
pub mod preferences;
pub mod recommendations;

/// Shared handler state
pub struct AppState {
    pub recommendations: RecommendationService,
}

/// Creates the application router with all routes
///
/// Every request gets an `x-request-id` (kept when the client sent one),
/// traced in its span and echoed on the response.
pub fn create_router(state: Arc<AppState>, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    request_id_header.clone(),
                    MakeRequestUuid,
                ))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(PropagateRequestIdLayer::new(request_id_header))
                .layer(cors),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/users/:steam_id/recommendations",
            get(recommendations::history).post(recommendations::recommend),
        )
        .route(
            "/users/:steam_id/preferences/:game_id",
            put(preferences::set_preference).delete(preferences::clear_preference),
        )
        .route(
            "/users/:steam_id/filters",
            get(filters::get_filter)
                .put(filters::save_filter)
                .delete(filters::clear_filter),
        )
        .route("/users/:steam_id/events", get(events::list_events))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// SteamID64: exactly 17 ASCII digits
pub(crate) fn validate_steam_id(steam_id: &str) -> AppResult<()> {
    if steam_id.len() == 17 && steam_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "Invalid Steam ID: {}",
            steam_id
        )))
    }
}

pub(crate) fn validate_game_id(game_id: &str) -> AppResult<()> {
    if !game_id.is_empty() && game_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("Invalid game ID: {}", game_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_steam_id() {
        assert!(validate_steam_id("76561197960287930").is_ok());
        assert!(validate_steam_id("7656119796028793").is_err());
        assert!(validate_steam_id("7656119796028793a").is_err());
        assert!(validate_steam_id("").is_err());
    }

    #[test]
    fn test_validate_game_id() {
        assert!(validate_game_id("570").is_ok());
        assert!(validate_game_id("").is_err());
        assert!(validate_game_id("57 0").is_err());
    }
}
