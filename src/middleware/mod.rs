// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (role gate, security headers).

pub mod auth;
pub mod security;

pub use auth::{require_coach, require_player, LOGIN_PATH};
