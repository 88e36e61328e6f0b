// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! # Vault Gatekeeper
//!
//! The engine behind the unlock/attempt-limiting/self-destruct behavior.
//! Every operation re-reads the payload and state records from disk, so the
//! filesystem is always the source of truth.
//!
//! State machine: `Locked → Active → Cleared` (terminal). `Active` begins
//! at the first successful decryption and runs a countdown; `Cleared` is
//! reached through max attempts, window expiry, or a missing/corrupt
//! payload, and is never left.
//!
//! Callers must serialize [`Gatekeeper::unlock`] and [`Gatekeeper::clear`]
//! behind a write lock; the attempt increment, limit check, and persist are
//! one atomic step only under that exclusion. [`Gatekeeper::status`] is a
//! pure read.

pub mod crypto;

use std::fmt;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use thiserror::Error;

use crate::storage::{
    DisclosureState, FileStorage, PayloadRecord, StorageError, VaultRepository,
};
use crypto::{CryptoError, EncryptedBlob};

/// Why the clear transition fired. Logged, never surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// The global attempt budget is spent.
    MaxAttempts,
    /// The active window since the first successful unlock elapsed.
    Expired,
    /// The payload blob could not be framed.
    CorruptPayload,
}

impl fmt::Display for ClearReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearReason::MaxAttempts => write!(f, "max attempts reached"),
            ClearReason::Expired => write!(f, "expired"),
            ClearReason::CorruptPayload => write!(f, "invalid blob"),
        }
    }
}

/// Error type for unlock attempts. All kinds are terminal for the request.
#[derive(Debug, Error)]
pub enum UnlockError {
    /// Password missing or empty.
    #[error("password required")]
    PasswordRequired,
    /// The payload has been destroyed (flag set or file gone).
    #[error("data cleared")]
    DataCleared,
    /// The active window elapsed; this attempt executed the clear.
    #[error("data expired")]
    DataExpired,
    /// Payload blob too short or not decodable. Counted as an attempt.
    #[error("invalid blob")]
    CorruptPayload,
    /// Wrong password or tampered ciphertext. Counted as an attempt;
    /// carries the counters so the caller can render attempts remaining.
    #[error("decryption failed")]
    DecryptionFailed { attempts: u32, max_unlocks: u32 },
    /// Storage fault. Surfaced generically; details go to the log only.
    #[error("storage fault")]
    Internal(#[from] StorageError),
}

/// Snapshot returned by the status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub attempts: u32,
    pub max_unlocks: u32,
    /// `None` until the first successful unlock starts the window.
    pub time_remaining_ms: Option<i64>,
    pub cleared: bool,
}

/// Result of a successful unlock.
#[derive(Debug, Clone)]
pub struct UnlockSuccess {
    /// Decrypted secret. Non-JSON plaintext is wrapped as `{"raw": ...}`.
    pub data: Value,
    pub attempts: u32,
    pub max_unlocks: u32,
    /// True when this was the last permitted attempt: the caller must be
    /// handed this result first, and only then may the clear transition run.
    pub cleared_after_response: bool,
}

/// Provisioning parameters for a new disclosure.
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    pub pbkdf2_iterations: u32,
    pub max_unlocks: u32,
    pub active_window_ms: i64,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: 200_000,
            max_unlocks: 3,
            active_window_ms: 24 * 60 * 60 * 1000,
        }
    }
}

/// Error type for provisioning a new disclosure.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A disclosure already exists (possibly cleared); refuse to overwrite.
    #[error("a disclosure is already provisioned")]
    AlreadyProvisioned,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The gatekeeper: key derivation, decryption, attempt tracking, clearing.
pub struct Gatekeeper {
    storage: FileStorage,
}

impl Gatekeeper {
    /// Create a gatekeeper over initialized storage.
    pub fn new(storage: FileStorage) -> Self {
        Self { storage }
    }

    /// The underlying storage (health checks, tests).
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Provision a new disclosure: seal the secret under the password and
    /// write the payload plus a fresh state record.
    ///
    /// Refuses to touch an installation that already has any state: a
    /// cleared disclosure stays cleared until externally reprovisioned.
    pub fn provision(
        &self,
        secret: &[u8],
        password: &str,
        options: &ProvisionOptions,
    ) -> Result<(), ProvisionError> {
        let repo = VaultRepository::new(&self.storage);
        if repo.state_exists() || repo.payload_exists() {
            return Err(ProvisionError::AlreadyProvisioned);
        }

        let blob = crypto::seal(secret, password, options.pbkdf2_iterations)?;
        repo.save_payload(&PayloadRecord {
            combined_b64: blob.to_base64(),
            pbkdf2_iterations: options.pbkdf2_iterations,
            max_unlocks: options.max_unlocks,
            active_window_ms: options.active_window_ms,
        })?;
        repo.save_state(&DisclosureState::initial())?;
        Ok(())
    }

    /// Status query. No side effects.
    ///
    /// A missing payload reads as cleared even when the state flag was never
    /// written (a prior clear may have died between delete and flag write);
    /// the repair write happens on the next unlock, not here.
    pub fn status(&self) -> Result<StatusReport, StorageError> {
        let repo = VaultRepository::new(&self.storage);
        let state = repo.load_state()?;
        let payload = if repo.payload_exists() {
            Some(repo.load_payload()?)
        } else {
            None
        };

        let active_window_ms = payload.as_ref().map_or(0, |p| p.active_window_ms);
        let time_remaining_ms = state.first_unlock.map(|first| {
            let expiry = first + Duration::milliseconds(active_window_ms);
            (expiry - Utc::now()).num_milliseconds().max(0)
        });

        Ok(StatusReport {
            attempts: state.attempts,
            max_unlocks: payload.as_ref().map_or(0, |p| p.max_unlocks),
            time_remaining_ms,
            cleared: state.cleared || payload.is_none(),
        })
    }

    /// Unlock attempt. Must run under the write lock.
    ///
    /// Every call that reaches the counter increments it, whether or not
    /// the password proves correct. When the post-increment counter reaches
    /// `maxUnlocks` and decryption fails, the clear transition fires before
    /// the error returns; when decryption succeeds, the result comes back
    /// with `cleared_after_response = true` and the caller is responsible
    /// for invoking [`Gatekeeper::clear`] after handing off the response.
    pub fn unlock(&self, password: &str) -> Result<UnlockSuccess, UnlockError> {
        if password.is_empty() {
            return Err(UnlockError::PasswordRequired);
        }

        let repo = VaultRepository::new(&self.storage);
        let mut state = repo.load_state()?;

        if state.cleared {
            return Err(UnlockError::DataCleared);
        }
        if !repo.payload_exists() {
            // Repair: a prior clear deleted the payload but never got the
            // flag to disk.
            state.cleared = true;
            if let Err(e) = repo.save_state(&state) {
                tracing::warn!(error = %e, "failed to persist cleared repair");
            }
            return Err(UnlockError::DataCleared);
        }

        let payload = repo.load_payload()?;
        let now = Utc::now();

        if let Some(first) = state.first_unlock {
            let expiry = first + Duration::milliseconds(payload.active_window_ms);
            if now > expiry {
                self.clear(ClearReason::Expired);
                return Err(UnlockError::DataExpired);
            }
        }

        state.attempts += 1;
        let will_clear = state.attempts >= payload.max_unlocks;
        repo.save_state(&state)?;

        let blob = match EncryptedBlob::from_base64(&payload.combined_b64) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::error!(error = %e, "payload blob failed to parse");
                if will_clear {
                    self.clear(ClearReason::CorruptPayload);
                }
                return Err(UnlockError::CorruptPayload);
            }
        };

        let plaintext = match crypto::open(&blob, password, payload.pbkdf2_iterations) {
            Ok(plaintext) => plaintext,
            Err(_) => {
                if will_clear {
                    self.clear(ClearReason::MaxAttempts);
                }
                return Err(UnlockError::DecryptionFailed {
                    attempts: state.attempts,
                    max_unlocks: payload.max_unlocks,
                });
            }
        };

        // Decryption succeeded; an unexpected payload shape must not turn
        // that into a failure.
        let data = match serde_json::from_slice::<Value>(&plaintext) {
            Ok(value) => value,
            Err(_) => json!({ "raw": String::from_utf8_lossy(&plaintext) }),
        };

        if state.first_unlock.is_none() {
            state.first_unlock = Some(now);
            repo.save_state(&state)?;
        }

        Ok(UnlockSuccess {
            data,
            attempts: state.attempts,
            max_unlocks: payload.max_unlocks,
            cleared_after_response: will_clear,
        })
    }

    /// The clear transition: delete the payload and set the cleared flag as
    /// one logical unit. Idempotent and irreversible; a second invocation is
    /// a no-op. Failures are logged, never surfaced; the caller whose
    /// response triggered this has already been answered.
    pub fn clear(&self, reason: ClearReason) {
        let repo = VaultRepository::new(&self.storage);

        match repo.load_state() {
            Ok(mut state) => {
                if state.cleared && !repo.payload_exists() {
                    return;
                }
                state.cleared = true;
                if let Err(e) = repo.save_state(&state) {
                    tracing::warn!(error = %e, %reason, "failed to persist cleared flag");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, %reason, "failed to load state while clearing");
            }
        }

        if let Err(e) = repo.delete_payload() {
            tracing::warn!(error = %e, %reason, "failed to delete payload");
        }

        tracing::info!(%reason, "payload cleared");
    }
}
