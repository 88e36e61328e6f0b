// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::vault::UnlockError;

/// HTTP-facing error carrying the structured body the front-end renders.
///
/// Countable failures include `attempts`/`maxUnlocks` so the caller can
/// show "N attempts remaining" without ever seeing cryptographic detail.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub attempts: Option<u32>,
    pub max_unlocks: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_unlocks: Option<u32>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            attempts: None,
            max_unlocks: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn gone(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GONE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Wrong-password failure, carrying the counters for the remaining-
    /// attempts UI.
    pub fn unauthorized(message: impl Into<String>, attempts: u32, max_unlocks: u32) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
            attempts: Some(attempts),
            max_unlocks: Some(max_unlocks),
        }
    }
}

impl From<UnlockError> for ApiError {
    fn from(err: UnlockError) -> Self {
        match err {
            UnlockError::PasswordRequired => ApiError::bad_request("password required"),
            UnlockError::DataCleared => ApiError::gone("data cleared"),
            UnlockError::DataExpired => ApiError::gone("data expired"),
            UnlockError::CorruptPayload => ApiError::internal("invalid blob"),
            UnlockError::DecryptionFailed {
                attempts,
                max_unlocks,
            } => ApiError::unauthorized("decryption failed", attempts, max_unlocks),
            UnlockError::Internal(e) => {
                tracing::error!(error = %e, "unlock failed on storage fault");
                ApiError::internal("server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            ok: false,
            error: self.message,
            attempts: self.attempts,
            max_unlocks: self.max_unlocks,
        });
        (self.status, body).into_response()
    }
}
