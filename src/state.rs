// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::vault::Gatekeeper;

/// Shared application state.
///
/// The lock serializes access to the single durable state record: unlock
/// attempts and the clear transition take the write guard so the
/// increment-check-persist sequence is one atomic step per request, while
/// status queries share the read guard and still observe consistent
/// (state, payload) pairs.
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<RwLock<Gatekeeper>>,
}

impl AppState {
    pub fn new(gatekeeper: Gatekeeper) -> Self {
        Self {
            vault: Arc::new(RwLock::new(gatekeeper)),
        }
    }
}
