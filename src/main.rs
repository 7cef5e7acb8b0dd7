// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tennis Evaluations API Server
//!
//! Serves the coach and player pages of a tennis club evaluation portal,
//! backed by a Supabase project for auth and storage.

use std::sync::Arc;
use tennis_evals::{
    auth::{AuthClient, IdentityResolver},
    config::Config,
    db::SupabaseDb,
    services::{PageStore, RosterPage},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Tennis Evaluations API");

    let db = SupabaseDb::new(&config)?;
    let auth = AuthClient::new(&config)?;
    let identity = IdentityResolver::new(&config.supabase_jwt_secret);

    // Page state is dropped when a user's session changes or sits idle
    let rosters: PageStore<RosterPage> = PageStore::with_idle_limit(config.page_idle_timeout);
    rosters.spawn_eviction(auth.subscribe());
    rosters.spawn_idle_sweep(config.page_idle_timeout / 4);

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        auth,
        identity,
        rosters,
    });

    // Build router
    let app = tennis_evals::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tennis_evals=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
