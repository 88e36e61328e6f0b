// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! Embervault - Self-Destructing Secret Disclosure Service
//!
//! This crate guards a single encrypted secret payload behind a password,
//! enforces a global limit on unlock attempts, and irreversibly destroys
//! the payload once the limit is reached or the active window after the
//! first successful unlock elapses.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `vault` - The gatekeeper engine: key derivation, decryption, attempt
//!   tracking, and the clear transition
//! - `storage` - Durable JSON records (payload + disclosure state)

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod vault;
