// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! # Durable Storage Module
//!
//! Persistent state lives in two JSON files under the data directory:
//!
//! ```text
//! data/
//!   payload.json   # Encrypted payload + policy limits (deleted on clear)
//!   state.json     # Attempt counter, window start, cleared flag
//! ```
//!
//! Both records are re-read from disk on every request (there is no
//! in-memory cache), so what the filesystem says is always what the service
//! reports. Mutations rewrite the whole record through an atomic
//! temp-file-and-rename.

pub mod files;
pub mod paths;
pub mod records;

pub use files::{FileStorage, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use records::{DisclosureState, PayloadRecord, VaultRepository};
