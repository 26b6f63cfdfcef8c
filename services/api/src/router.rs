//! Axum Router Configuration
//!
//! This module defines the HTTP routing for the token service along
//! with its OpenAPI documentation.

use crate::{
    handlers,
    models::{DispatchParams, DispatchResponse, ErrorResponse, HealthResponse, TokenRequest, TokenResponse},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::generate_token,
        handlers::dispatch_agent,
    ),
    components(
        schemas(TokenRequest, TokenResponse, HealthResponse, DispatchParams, DispatchResponse, ErrorResponse)
    ),
    tags(
        (name = "Parley API", description = "Room access tokens and agent dispatch for the Parley voice assistant")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/token", post(handlers::generate_token))
        .route("/dispatch-agent", post(handlers::dispatch_agent))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
