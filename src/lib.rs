// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Tennis Evaluations: coach and player evaluation portal
//!
//! This crate provides the role-gated back end for a tennis club evaluation
//! portal. Coaches manage their club's player roster; players read the
//! feedback shared with them. Persistence and authentication are delegated
//! to Supabase (GoTrue + PostgREST with row-level security).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod view;

use auth::{AuthClient, IdentityResolver};
use config::Config;
use db::SupabaseDb;
use services::{PageStore, RosterPage};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SupabaseDb,
    pub auth: AuthClient,
    pub identity: IdentityResolver,
    /// Mounted roster pages, keyed by user id.
    pub rosters: PageStore<RosterPage>,
}
