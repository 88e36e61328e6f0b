// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation. Wire names are camelCase, matching what the front-end
//! consumer expects.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::vault::{StatusReport, UnlockSuccess};

/// Public status of the disclosure. Never contains cryptographic detail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Global attempt count so far.
    pub attempts: u32,
    /// Attempt budget; 0 once the payload is gone.
    pub max_unlocks: u32,
    /// Milliseconds left in the active window, or `null` before the first
    /// successful unlock.
    pub time_remaining_ms: Option<i64>,
    /// Whether the payload has been destroyed.
    pub cleared: bool,
}

impl From<StatusReport> for StatusResponse {
    fn from(report: StatusReport) -> Self {
        Self {
            attempts: report.attempts,
            max_unlocks: report.max_unlocks,
            time_remaining_ms: report.time_remaining_ms,
            cleared: report.cleared,
        }
    }
}

/// Unlock request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnlockRequest {
    /// The disclosure password. Missing and empty are equivalent.
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful unlock response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    /// Always `true`; failures use the error body instead.
    pub ok: bool,
    /// The decrypted secret. Non-JSON payloads arrive as `{"raw": "..."}`.
    pub data: serde_json::Value,
    pub attempts: u32,
    pub max_unlocks: u32,
    /// Present and `true` only when this was the final permitted attempt
    /// and the payload is about to be destroyed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_after_response: Option<bool>,
}

impl From<UnlockSuccess> for UnlockResponse {
    fn from(success: UnlockSuccess) -> Self {
        Self {
            ok: true,
            data: success.data,
            attempts: success.attempts,
            max_unlocks: success.max_unlocks,
            cleared_after_response: success.cleared_after_response.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_response_uses_camel_case() {
        let response = StatusResponse {
            attempts: 2,
            max_unlocks: 5,
            time_remaining_ms: Some(1500),
            cleared: false,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"attempts": 2, "maxUnlocks": 5, "timeRemainingMs": 1500, "cleared": false})
        );
    }

    #[test]
    fn time_remaining_serializes_as_null_before_first_unlock() {
        let response = StatusResponse {
            attempts: 0,
            max_unlocks: 3,
            time_remaining_ms: None,
            cleared: false,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["timeRemainingMs"], serde_json::Value::Null);
    }

    #[test]
    fn cleared_after_response_is_omitted_unless_set() {
        let response = UnlockResponse {
            ok: true,
            data: json!({"note": "hi"}),
            attempts: 1,
            max_unlocks: 3,
            cleared_after_response: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("clearedAfterResponse").is_none());

        let last = UnlockResponse {
            cleared_after_response: Some(true),
            ..response
        };
        let value = serde_json::to_value(&last).unwrap();
        assert_eq!(value["clearedAfterResponse"], true);
    }

    #[test]
    fn unlock_request_tolerates_missing_password() {
        let request: UnlockRequest = serde_json::from_str("{}").unwrap();
        assert!(request.password.is_none());
    }
}
