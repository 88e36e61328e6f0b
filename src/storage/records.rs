// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! Durable vault records and their repository.
//!
//! Two records make up the whole persisted state:
//!
//! - [`PayloadRecord`]: the encrypted payload and its policy limits.
//!   Immutable once provisioned; the only mutation it ever sees is its own
//!   deletion by the clear transition.
//! - [`DisclosureState`]: the global attempt counter, the start of the
//!   active window, and the cleared flag. Mutated only by the gatekeeper.
//!
//! Field names on disk are camelCase with `firstUnlock` as epoch
//! milliseconds, so records written by earlier deployments parse unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FileStorage, StorageResult};

/// Encrypted payload record, externally provisioned before the service
/// answers its first unlock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PayloadRecord {
    /// Base64 of `salt(16) || iv(12) || ciphertext || authTag(16)`.
    pub combined_b64: String,
    /// PBKDF2-HMAC-SHA256 iteration count used at provisioning time.
    pub pbkdf2_iterations: u32,
    /// Global unlock attempt budget. Every call counts, right or wrong.
    pub max_unlocks: u32,
    /// How long the payload stays readable after the first successful
    /// unlock, in milliseconds.
    pub active_window_ms: i64,
}

/// Disclosure state record. Created at provisioning with zero attempts,
/// no window start, and `cleared = false`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureState {
    /// Monotonically non-decreasing attempt counter.
    pub attempts: u32,
    /// Set exactly once, on the first successful decryption. Starts the
    /// active window.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub first_unlock: Option<DateTime<Utc>>,
    /// Monotonic false→true. Once true the payload file is gone.
    pub cleared: bool,
}

impl DisclosureState {
    /// Fresh state for a newly provisioned payload.
    pub fn initial() -> Self {
        Self {
            attempts: 0,
            first_unlock: None,
            cleared: false,
        }
    }
}

/// Repository for the two vault records.
///
/// Reads and writes whole records only; callers are responsible for holding
/// the state lock across any read-modify-write sequence.
pub struct VaultRepository<'a> {
    storage: &'a FileStorage,
}

impl<'a> VaultRepository<'a> {
    /// Create a new VaultRepository.
    pub fn new(storage: &'a FileStorage) -> Self {
        Self { storage }
    }

    /// Check whether the payload record still exists.
    pub fn payload_exists(&self) -> bool {
        self.storage.exists(self.storage.paths().payload())
    }

    /// Load the payload record.
    pub fn load_payload(&self) -> StorageResult<PayloadRecord> {
        self.storage.read_json(self.storage.paths().payload())
    }

    /// Write the payload record. Only valid at provisioning time.
    pub fn save_payload(&self, payload: &PayloadRecord) -> StorageResult<()> {
        self.storage
            .write_json(self.storage.paths().payload(), payload)
    }

    /// Delete the payload record. Idempotent.
    pub fn delete_payload(&self) -> StorageResult<()> {
        self.storage.delete(self.storage.paths().payload())
    }

    /// Check whether a disclosure state record exists at all (it does from
    /// provisioning onward, including after clearing).
    pub fn state_exists(&self) -> bool {
        self.storage.exists(self.storage.paths().state())
    }

    /// Load the disclosure state.
    pub fn load_state(&self) -> StorageResult<DisclosureState> {
        self.storage.read_json(self.storage.paths().state())
    }

    /// Persist the disclosure state as a whole record.
    pub fn save_state(&self, state: &DisclosureState) -> StorageResult<()> {
        self.storage.write_json(self.storage.paths().state(), state)
    }
}
