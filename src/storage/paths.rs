// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! Path constants and utilities for the durable storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for persistent data.
pub const DATA_ROOT: &str = "data";

/// Storage path utilities for the vault data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persistent data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the encrypted payload record.
    ///
    /// Deleted permanently by the clear transition; its absence is treated
    /// as cleared even when the state flag was never written.
    pub fn payload(&self) -> PathBuf {
        self.root.join("payload.json")
    }

    /// Path to the disclosure state record (attempt counter, window start,
    /// cleared flag).
    pub fn state(&self) -> PathBuf {
        self.root.join("state.json")
    }
}
