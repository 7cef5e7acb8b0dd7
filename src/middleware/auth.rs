// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role gate middleware.
//!
//! Resolves the session and authorizes it once per navigation, before the
//! page handler runs. On success the handler finds [`AuthUser`] and
//! [`Access`] in the request extensions.

use crate::auth::{authorize, Access, AuthUser, Denied};
use crate::models::Role;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Where denied and signed-out visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Inline notice rendered instead of a page whose setup is incomplete.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SetupNotice {
    pub status: String,
}

/// Gate for coach pages.
pub async fn require_coach(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    gate(&state, &jar, request, next, Role::Coach).await
}

/// Gate for player pages.
pub async fn require_player(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    gate(&state, &jar, request, next, Role::Player).await
}

async fn gate(
    state: &AppState,
    jar: &CookieJar,
    mut request: Request,
    next: Next,
    required: Role,
) -> Response {
    let Some(user) = state.identity.resolve(jar, request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "No session, redirecting to login");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match authorize(&state.db, &user, required).await {
        Ok(access) => {
            request.extensions_mut().insert::<AuthUser>(user);
            request.extensions_mut().insert::<Access>(access);
            next.run(request).await
        }
        Err(Denied::MissingClub) => {
            tracing::warn!(user_id = %user.user_id(), "Coach profile has no club");
            Json(SetupNotice {
                status: Denied::MissingClub.to_string(),
            })
            .into_response()
        }
        Err(denied) => {
            tracing::warn!(
                user_id = %user.user_id(),
                required = %required,
                reason = %denied,
                "Access denied"
            );
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}
