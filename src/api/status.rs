// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

use axum::{extract::State, Json};

use crate::{error::ApiError, models::StatusResponse, state::AppState};

/// Status query handler. A pure read; never mutates state.
#[utoipa::path(
    get,
    path = "/status",
    tag = "Disclosure",
    responses((status = 200, description = "Current disclosure status", body = StatusResponse))
)]
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let vault = state.vault.read().await;
    let report = vault.status().map_err(|e| {
        tracing::error!(error = %e, "status query failed");
        ApiError::internal("server error")
    })?;
    Ok(Json(report.into()))
}
