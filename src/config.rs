// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding `payload.json` and `state.json` | `data` |
//! | `PUBLIC_DIR` | Static front-end directory served at `/` | `public` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SEED_SECRET` | JSON (or raw text) secret to provision at boot | unset |
//! | `SEED_PASSWORD` | Password for the seeded secret | unset |
//! | `SEED_MAX_UNLOCKS` | Attempt budget for the seeded secret | `3` |
//! | `SEED_ACTIVE_WINDOW_MS` | Active window for the seeded secret | `86400000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Seeding only happens when no disclosure state exists yet; a cleared
//! installation is never silently re-armed.

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the static front-end directory.
pub const PUBLIC_DIR_ENV: &str = "PUBLIC_DIR";

/// Environment variable names for boot-time provisioning.
pub const SEED_SECRET_ENV: &str = "SEED_SECRET";
pub const SEED_PASSWORD_ENV: &str = "SEED_PASSWORD";
pub const SEED_MAX_UNLOCKS_ENV: &str = "SEED_MAX_UNLOCKS";
pub const SEED_ACTIVE_WINDOW_MS_ENV: &str = "SEED_ACTIVE_WINDOW_MS";

/// Default static front-end directory.
pub const DEFAULT_PUBLIC_DIR: &str = "public";
