// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach pages: dashboard, roster, player forms, club sessions.
//!
//! Every handler here runs behind the coach gate, so `AuthUser` and an
//! `Access` carrying a club scope are always present.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::auth::{Access, AuthUser, CoachScope};
use crate::db::DataAccess;
use crate::error::{AppError, Result};
use crate::models::{Player, PlayerForm, Session};
use crate::services::{RosterPage, RosterService};
use crate::view::{Status, ViewState};
use crate::AppState;

const ROSTER_PATH: &str = "/coach/players";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/coach", get(dashboard))
        .route("/coach/players", get(roster).post(add_player))
        .route("/coach/players/new", get(new_player_form))
        .route("/coach/players/{id}", get(edit_player_form).post(save_player))
        .route("/coach/players/{id}/archive", post(archive_player))
        .route("/coach/players/{id}/restore", post(restore_player))
        .route("/coach/players/{id}/delete", post(delete_player))
        .route("/coach/sessions", get(club_sessions))
}

// ─── Page Models ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CoachDashboard {
    pub email: String,
    pub club_id: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RosterPageModel {
    pub players: Vec<Player>,
    pub show_archived: bool,
    pub search: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub status: Status,
}

impl From<&RosterPage> for RosterPageModel {
    fn from(page: &RosterPage) -> Self {
        Self {
            players: page.visible(),
            show_archived: page.show_archived(),
            search: page.search().to_string(),
            status: page.view().status().clone(),
        }
    }
}

/// Add/edit form page. `player_id` is None when adding.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlayerFormPage {
    pub player_id: Option<String>,
    pub form: PlayerForm,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub status: Status,
}

impl PlayerFormPage {
    fn render(player_id: Option<&str>, form: PlayerForm, status: Status) -> Response {
        Json(Self {
            player_id: player_id.map(str::to_string),
            form,
            status,
        })
        .into_response()
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClubSessionsPage {
    pub sessions: Vec<Session>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub status: Status,
}

// ─── Parameters ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RosterParams {
    /// Search text over the held roster
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    show_archived: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmParams {
    #[serde(default)]
    confirm: bool,
}

fn coach_scope(access: &Access) -> Result<&CoachScope> {
    access.coach_scope().ok_or(AppError::Unauthorized)
}

// ─── Handlers ────────────────────────────────────────────────────

async fn dashboard(Extension(access): Extension<Access>) -> Result<Json<CoachDashboard>> {
    let club_id = coach_scope(&access)?.club_id().to_string();
    Ok(Json(CoachDashboard {
        email: access.identity.email.clone(),
        club_id,
    }))
}

/// Roster page.
///
/// A search over an already mounted page with the same archive toggle is
/// answered from the held records; anything else mounts and loads afresh.
async fn roster(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(access): Extension<Access>,
    Query(params): Query<RosterParams>,
) -> Result<Json<RosterPageModel>> {
    let coach = coach_scope(&access)?;

    if let Some(search) = &params.q {
        if let Some(slot) = state.rosters.get(user.user_id()) {
            let mut page = slot.lock();
            if !slot.is_unmounted() && page.show_archived() == params.show_archived {
                page.set_search(search);
                return Ok(Json(RosterPageModel::from(&*page)));
            }
        }
    }

    let slot = state
        .rosters
        .mount(user.user_id(), RosterPage::new(params.show_archived));
    slot.lock().set_search(params.q.as_deref().unwrap_or_default());

    let service = RosterService::new(&state.db, &user, coach, slot);
    service.load().await;

    let model = RosterPageModel::from(&*service.slot().lock());
    Ok(Json(model))
}

async fn new_player_form() -> Response {
    PlayerFormPage::render(None, PlayerForm::default(), Status::Idle)
}

async fn add_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(access): Extension<Access>,
    Form(submitted): Form<PlayerForm>,
) -> Result<Response> {
    let coach = coach_scope(&access)?;

    let form = match submitted.clone().normalized() {
        Ok(form) => form,
        Err(message) => {
            return Ok(PlayerFormPage::render(None, submitted, Status::Error(message)));
        }
    };

    match DataAccess::new(&state.db, &user)
        .insert_player(coach, &form)
        .await
    {
        Ok(_) => Ok(Redirect::to(ROSTER_PATH).into_response()),
        Err(e) => {
            tracing::warn!(club_id = %coach.club_id(), error = %e, "Add player failed");
            Ok(PlayerFormPage::render(None, form, Status::Error(e.message())))
        }
    }
}

async fn edit_player_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(access): Extension<Access>,
    Path(id): Path<String>,
) -> Result<Response> {
    let coach = coach_scope(&access)?;

    let page = match DataAccess::new(&state.db, &user).get_player(coach, &id).await {
        Ok(player) => {
            PlayerFormPage::render(Some(&id), PlayerForm::from_player(&player), Status::Idle)
        }
        Err(e) => {
            PlayerFormPage::render(Some(&id), PlayerForm::default(), Status::Error(e.message()))
        }
    };
    Ok(page)
}

async fn save_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(access): Extension<Access>,
    Path(id): Path<String>,
    Form(submitted): Form<PlayerForm>,
) -> Result<Response> {
    let coach = coach_scope(&access)?;

    let form = match submitted.clone().normalized() {
        Ok(form) => form,
        Err(message) => {
            return Ok(PlayerFormPage::render(Some(&id), submitted, Status::Error(message)));
        }
    };

    match DataAccess::new(&state.db, &user)
        .update_player(coach, &id, &form)
        .await
    {
        Ok(_) => Ok(Redirect::to(ROSTER_PATH).into_response()),
        Err(e) => {
            tracing::warn!(player_id = %id, error = %e, "Save player failed");
            Ok(PlayerFormPage::render(Some(&id), form, Status::Error(e.message())))
        }
    }
}

/// Roster service for the caller's mounted page, if any.
fn mounted_roster<'a>(
    state: &'a AppState,
    user: &'a AuthUser,
    coach: &'a CoachScope,
) -> Option<RosterService<'a>> {
    state
        .rosters
        .get(user.user_id())
        .map(|slot| RosterService::new(&state.db, user, coach, slot))
}

fn render_roster(service: &RosterService<'_>) -> Response {
    let model = RosterPageModel::from(&*service.slot().lock());
    Json(model).into_response()
}

/// Archive a held player (`?confirm=true` to actually write).
///
/// Roster actions need a mounted page; without one the browser is stale
/// and goes back to the roster.
async fn archive_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(access): Extension<Access>,
    Path(id): Path<String>,
    Query(params): Query<ConfirmParams>,
) -> Result<Response> {
    let coach = coach_scope(&access)?;
    let Some(service) = mounted_roster(&state, &user, coach) else {
        return Ok(Redirect::to(ROSTER_PATH).into_response());
    };

    service.archive(&id, params.confirm).await?;
    Ok(render_roster(&service))
}

async fn restore_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(access): Extension<Access>,
    Path(id): Path<String>,
) -> Result<Response> {
    let coach = coach_scope(&access)?;
    let Some(service) = mounted_roster(&state, &user, coach) else {
        return Ok(Redirect::to(ROSTER_PATH).into_response());
    };

    service.restore(&id).await?;
    Ok(render_roster(&service))
}

/// Permanently delete an archived player (`?confirm=true` to write).
async fn delete_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(access): Extension<Access>,
    Path(id): Path<String>,
    Query(params): Query<ConfirmParams>,
) -> Result<Response> {
    let coach = coach_scope(&access)?;
    let Some(service) = mounted_roster(&state, &user, coach) else {
        return Ok(Redirect::to(ROSTER_PATH).into_response());
    };

    service.delete(&id, params.confirm).await?;
    Ok(render_roster(&service))
}

async fn club_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(access): Extension<Access>,
) -> Result<Json<ClubSessionsPage>> {
    let coach = coach_scope(&access)?;

    let mut view: ViewState<Session> = ViewState::new();
    view.begin_load();
    view.finish_load(
        DataAccess::new(&state.db, &user)
            .list_club_sessions(coach)
            .await,
    );

    Ok(Json(ClubSessionsPage {
        sessions: view.records().to_vec(),
        status: view.status().clone(),
    }))
}
