// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Every request runs with the caller's own access token, so the store's
//! row-level policies see the real user. Two backends share one [`Query`]
//! type: PostgREST for deployments and an in-memory store with the same
//! policies for tests and local development.

pub mod access;
pub mod memory;
pub mod query;
pub mod rest;

pub use access::DataAccess;
pub use memory::MemoryStore;
pub use query::Query;

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::query::Cardinality;
use crate::error::StoreError;
use rest::RestClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Table names.
pub mod tables {
    pub const PROFILES: &str = "users_profile";
    pub const PLAYERS: &str = "players";
    pub const SESSIONS: &str = "sessions";
    pub const SESSION_PLAYERS: &str = "session_players";
    pub const FEEDBACK_ENTRIES: &str = "feedback_entries";
    pub const SUGGESTIONS: &str = "suggestions";
}

/// PostgREST's message when a single-row request does not get one row.
pub(crate) const SINGLE_ROW_MESSAGE: &str = "JSON object requested, multiple (or no) rows returned";

#[derive(Clone)]
enum Backend {
    Rest(RestClient),
    Memory(Arc<MemoryStore>),
}

/// Store client shared by all requests.
#[derive(Clone)]
pub struct SupabaseDb {
    backend: Backend,
    timeout: Duration,
}

impl SupabaseDb {
    /// Client for the configured Supabase project.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = RestClient::new(
            &config.supabase_url,
            &config.supabase_anon_key,
            config.request_timeout,
        )?;
        tracing::info!(url = %config.supabase_url, "Using Supabase PostgREST backend");

        Ok(Self {
            backend: Backend::Rest(client),
            timeout: config.request_timeout,
        })
    }

    /// Client backed by an in-process store.
    pub fn in_memory(store: Arc<MemoryStore>, timeout: Duration) -> Self {
        Self {
            backend: Backend::Memory(store),
            timeout,
        }
    }

    /// Run a query as `user`.
    ///
    /// Settles with `Timeout` once the configured deadline passes and with
    /// `Cancelled` as soon as `cancel` fires; either way the result of the
    /// abandoned request is discarded.
    pub async fn execute(
        &self,
        user: &AuthUser,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<Value>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let request = async {
            match &self.backend {
                Backend::Rest(client) => client.execute(&user.access_token, query).await,
                Backend::Memory(store) => store.execute(user.user_id(), query),
            }
        };

        let rows = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(table = query.table_name(), "Store request cancelled");
                return Err(StoreError::Cancelled);
            }
            result = tokio::time::timeout(self.timeout, request) => match result {
                Ok(rows) => rows?,
                Err(_) => {
                    tracing::warn!(
                        table = query.table_name(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Store request timed out"
                    );
                    return Err(StoreError::Timeout);
                }
            },
        };

        check_cardinality(query.cardinality(), rows)
    }

    /// Run a query and decode every row.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        user: &AuthUser,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, StoreError> {
        self.execute(user, &query, cancel)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Run a query that must produce exactly one row.
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        user: &AuthUser,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<T, StoreError> {
        let rows = self.execute(user, &query.single(), cancel).await?;
        rows.into_iter()
            .next()
            .map(decode)
            .unwrap_or_else(|| Err(StoreError::NotFound(SINGLE_ROW_MESSAGE.to_string())))
    }

    /// Run a query that may produce at most one row.
    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        user: &AuthUser,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, StoreError> {
        let rows = self.execute(user, &query.maybe_single(), cancel).await?;
        rows.into_iter().next().map(decode).transpose()
    }
}

fn decode<T: DeserializeOwned>(row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|e| StoreError::Other(format!("Unexpected row shape: {}", e)))
}

fn check_cardinality(cardinality: Cardinality, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
    if cardinality.accepts(rows.len()) {
        Ok(rows)
    } else {
        Err(StoreError::NotFound(SINGLE_ROW_MESSAGE.to_string()))
    }
}
