// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{UnlockRequest, UnlockResponse},
    state::AppState,
    vault::ClearReason,
};

/// Unlock attempt handler.
///
/// The whole attempt runs under the write guard so concurrent requests
/// cannot interleave with the increment-check-persist sequence. When the
/// final permitted attempt succeeds, the response value is handed off first
/// and the clear transition runs as a spawned follow-up the caller never
/// awaits. The follow-up keeps holding the write guard, so no other request
/// is admitted between the response and the destruction of the payload.
#[utoipa::path(
    post,
    path = "/unlock",
    tag = "Disclosure",
    request_body = UnlockRequest,
    responses(
        (status = 200, description = "Decrypted secret", body = UnlockResponse),
        (status = 400, description = "Password missing"),
        (status = 401, description = "Wrong password; the attempt counted"),
        (status = 410, description = "Payload cleared or expired"),
        (status = 500, description = "Corrupt payload or internal fault")
    )
)]
pub async fn unlock(
    State(state): State<AppState>,
    Json(request): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, ApiError> {
    let password = request.password.unwrap_or_default();

    let vault = state.vault.clone().write_owned().await;
    let success = vault.unlock(&password).map_err(ApiError::from)?;

    if success.cleared_after_response {
        // The guard moves into the follow-up and is released only once the
        // payload is gone.
        tokio::spawn(async move {
            vault.clear(ClearReason::MaxAttempts);
        });
    }

    Ok(Json(success.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::provisioned_state;
    use axum::http::StatusCode;

    fn request(password: &str) -> Json<UnlockRequest> {
        Json(UnlockRequest {
            password: Some(password.to_string()),
        })
    }

    #[tokio::test]
    async fn correct_password_returns_secret() {
        let (_dir, state) = provisioned_state(3, 60_000);

        let Json(response) = unlock(State(state), request("correct horse"))
            .await
            .expect("unlock succeeds");
        assert!(response.ok);
        assert_eq!(response.data["note"], "the secret");
        assert_eq!(response.attempts, 1);
        assert_eq!(response.max_unlocks, 3);
        assert!(response.cleared_after_response.is_none());
    }

    #[tokio::test]
    async fn missing_password_is_bad_request() {
        let (_dir, state) = provisioned_state(3, 60_000);

        let err = unlock(State(state), Json(UnlockRequest { password: None }))
            .await
            .expect_err("expected bad request");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized_with_counters() {
        let (_dir, state) = provisioned_state(3, 60_000);

        let err = unlock(State(state), request("wrong"))
            .await
            .expect_err("expected unauthorized");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.attempts, Some(1));
        assert_eq!(err.max_unlocks, Some(3));
    }

    #[tokio::test]
    async fn exhausted_attempts_destroy_payload_and_fail_closed() {
        let (_dir, state) = provisioned_state(3, 60_000);

        for _ in 0..3 {
            let err = unlock(State(state.clone()), request("wrong"))
                .await
                .expect_err("expected unauthorized");
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        }

        let err = unlock(State(state.clone()), request("correct horse"))
            .await
            .expect_err("expected gone");
        assert_eq!(err.status, StatusCode::GONE);

        let report = state.vault.read().await.status().unwrap();
        assert!(report.cleared);
    }

    #[tokio::test]
    async fn final_attempt_success_clears_after_response() {
        let (_dir, state) = provisioned_state(1, 60_000);

        let Json(response) = unlock(State(state.clone()), request("correct horse"))
            .await
            .expect("unlock succeeds");
        assert_eq!(response.cleared_after_response, Some(true));
        assert_eq!(response.data["note"], "the secret");

        // The spawned follow-up holds the write guard until the clear lands,
        // so acquiring the read guard is enough to observe it.
        let report = state.vault.read().await.status().unwrap();
        assert!(report.cleared);
    }

    #[tokio::test]
    async fn no_request_slips_in_between_response_and_clear() {
        let (_dir, state) = provisioned_state(1, 60_000);

        let Json(response) = unlock(State(state.clone()), request("correct horse"))
            .await
            .expect("unlock succeeds");
        assert_eq!(response.cleared_after_response, Some(true));

        // The very next attempt must see the cleared state, never a second
        // disclosure or a counter past the budget.
        let err = unlock(State(state.clone()), request("correct horse"))
            .await
            .expect_err("expected gone");
        assert_eq!(err.status, StatusCode::GONE);

        let report = state.vault.read().await.status().unwrap();
        assert!(report.cleared);
        assert_eq!(report.attempts, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_attempts_never_race_past_the_budget() {
        let (_dir, state) = provisioned_state(3, 60_000);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                unlock(State(state), request("wrong")).await
            }));
        }

        let mut unauthorized = Vec::new();
        let mut gone = 0;
        for handle in handles {
            let err = handle
                .await
                .expect("task completes")
                .expect_err("every attempt fails");
            match err.status {
                StatusCode::UNAUTHORIZED => unauthorized.push(err.attempts),
                StatusCode::GONE => gone += 1,
                other => panic!("unexpected status {other}"),
            }
        }

        // Exactly three attempts count; the rest bounce off the cleared state.
        unauthorized.sort();
        assert_eq!(unauthorized, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(gone, 5);

        let report = state.vault.read().await.status().unwrap();
        assert!(report.cleared);
        assert_eq!(report.attempts, 3);
    }

    #[tokio::test]
    async fn expired_window_is_gone() {
        let (_dir, state) = provisioned_state(5, 50);

        unlock(State(state.clone()), request("correct horse"))
            .await
            .expect("first unlock succeeds");

        tokio::time::sleep(std::time::Duration::from_millis(80)).await;

        let err = unlock(State(state.clone()), request("correct horse"))
            .await
            .expect_err("expected gone");
        assert_eq!(err.status, StatusCode::GONE);
        assert_eq!(err.message, "data expired");
    }
}
