// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player pages: session inbox and evaluation detail.
//!
//! Reads here carry no client-side filter; the store's policies decide
//! which sessions and notes a player can see.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::auth::AuthUser;
use crate::db::DataAccess;
use crate::models::Session;
use crate::services::{load_evaluation, EvaluationDetail};
use crate::view::{Status, ViewState};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/player", get(inbox))
        .route("/player/evaluations/{session_id}", get(evaluation))
}

/// Inbox card for one session.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionCard {
    #[serde(flatten)]
    pub session: Session,
    pub coach_mode_label: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlayerInbox {
    pub email: String,
    pub sessions: Vec<SessionCard>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub status: Status,
}

/// Sessions the player took part in, newest first.
async fn inbox(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<PlayerInbox> {
    let mut view: ViewState<Session> = ViewState::new();
    view.begin_load();

    let result = DataAccess::new(&state.db, &user)
        .list_sessions_for_player()
        .await;
    if let Err(e) = &result {
        tracing::warn!(user_id = %user.user_id(), error = %e, "Inbox load failed");
    }
    view.finish_load(result);

    let sessions = view
        .records()
        .iter()
        .map(|session| SessionCard {
            coach_mode_label: session.coach_mode.label().to_string(),
            session: session.clone(),
        })
        .collect();

    Json(PlayerInbox {
        email: user.identity.email.clone(),
        sessions,
        status: view.status().clone(),
    })
}

async fn evaluation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Json<EvaluationDetail> {
    Json(load_evaluation(&state.db, &user, &session_id).await)
}
