// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

use std::env;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{DEFAULT_PUBLIC_DIR, PUBLIC_DIR_ENV},
    models::{StatusResponse, UnlockRequest, UnlockResponse},
    state::AppState,
};

pub mod health;
pub mod status;
pub mod unlock;

pub fn router(state: AppState) -> Router {
    let public_dir =
        env::var(PUBLIC_DIR_ENV).unwrap_or_else(|_| DEFAULT_PUBLIC_DIR.to_string());

    Router::new()
        .route("/status", get(status::status))
        .route("/unlock", post(unlock::unlock))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        status::status,
        unlock::unlock,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            StatusResponse,
            UnlockRequest,
            UnlockResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Disclosure", description = "Status and unlock of the guarded secret"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
