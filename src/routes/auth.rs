// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login page and auth provider flows.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::auth::{
    AuthEvent, AuthProviderError, AuthUser, Identity, ProviderSession, SignUpOutcome,
    SESSION_COOKIE,
};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::{resolve_landing, Landing};
use crate::AppState;

const CONFIRMED_MESSAGE: &str = "You are logged in.";
const MAGIC_LINK_SENT: &str = "Check your email for the sign-in link.";
const ACCOUNT_CREATED: &str =
    "Account created. If email confirmation is on, check your inbox, then log in.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page))
        .route("/auth/login", post(password_login))
        .route("/auth/magic-link", post(magic_link))
        .route("/auth/signup", post(signup))
        .route("/auth/confirm", get(confirm))
        .route("/auth/logout", post(logout))
}

/// Login page model.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginPage {
    pub status: String,
}

impl LoginPage {
    fn with_status(status: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: status.into(),
        })
    }
}

#[derive(Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    confirmed: Option<String>,
}

#[derive(Deserialize)]
pub struct Credentials {
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct MagicLinkRequest {
    email: String,
}

#[derive(Deserialize)]
pub struct ConfirmParams {
    token_hash: String,
    #[serde(rename = "type", default = "default_otp_type")]
    kind: String,
}

fn default_otp_type() -> String {
    "email".to_string()
}

/// Show the login page, or forward an existing session to its landing.
async fn login_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LoginParams>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    if let Some(user) = state.identity.resolve(&jar, &headers) {
        return match resolve_landing(&state.db, &user).await {
            Landing::Redirect(path) => Redirect::to(path).into_response(),
            Landing::Notice(notice) => LoginPage::with_status(notice).into_response(),
        };
    }

    let status = if params.confirmed.is_some() {
        CONFIRMED_MESSAGE
    } else {
        ""
    };
    LoginPage::with_status(status).into_response()
}

/// Password sign-in.
async fn password_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Result<Response> {
    let email = credentials.email.trim();
    match state
        .auth
        .sign_in_with_password(email, &credentials.password)
        .await
    {
        Ok(session) => Ok(start_session(&state, jar, session).await),
        Err(e) => provider_failure(e),
    }
}

/// Email a magic sign-in link.
async fn magic_link(
    State(state): State<Arc<AppState>>,
    Form(request): Form<MagicLinkRequest>,
) -> Result<Response> {
    match state.auth.sign_in_with_otp(request.email.trim()).await {
        Ok(()) => Ok(LoginPage::with_status(MAGIC_LINK_SENT).into_response()),
        Err(e) => provider_failure(e),
    }
}

/// Create an account.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Result<Response> {
    match state
        .auth
        .sign_up(credentials.email.trim(), &credentials.password)
        .await
    {
        Ok(SignUpOutcome::SessionCreated(session)) => Ok(start_session(&state, jar, session).await),
        Ok(SignUpOutcome::ConfirmationSent) => {
            Ok(LoginPage::with_status(ACCOUNT_CREATED).into_response())
        }
        Err(e) => provider_failure(e),
    }
}

/// Magic-link landing: exchange the token hash for a session.
async fn confirm(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConfirmParams>,
    jar: CookieJar,
) -> Result<Response> {
    match state.auth.verify_otp(&params.token_hash, &params.kind).await {
        Ok(session) => {
            let jar = jar.add(session_cookie(&state.config, &session));
            Ok((jar, Redirect::to("/login?confirmed=1")).into_response())
        }
        Err(e) => provider_failure(e),
    }
}

/// Sign out and clear the session cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(user) = state.identity.resolve(&jar, &headers) {
        state.auth.publish(AuthEvent::SignedOut {
            user_id: user.user_id().to_string(),
        });

        if let Err(e) = state.auth.sign_out(&user.access_token).await {
            tracing::warn!(user_id = %user.user_id(), error = %e, "Provider sign-out failed");
        }
    }

    let removal = Cookie::build(SESSION_COOKIE)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies());

    (jar.remove(removal), Redirect::to("/login"))
}

/// Set the session cookie, then send the user where their role belongs.
async fn start_session(state: &AppState, jar: CookieJar, session: ProviderSession) -> Response {
    let jar = jar.add(session_cookie(&state.config, &session));
    let user = AuthUser {
        identity: Identity {
            id: session.user.id.clone(),
            email: session.user.email.clone().unwrap_or_default(),
        },
        access_token: session.access_token.clone(),
    };

    tracing::info!(user_id = %user.user_id(), "Signed in");

    match resolve_landing(&state.db, &user).await {
        Landing::Redirect(path) => (jar, Redirect::to(path)).into_response(),
        Landing::Notice(notice) => (jar, LoginPage::with_status(notice)).into_response(),
    }
}

fn session_cookie(config: &Config, session: &ProviderSession) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(session.expires_in))
        .build()
}

/// Rejections are shown on the login page; an unreachable provider is a 502.
fn provider_failure(error: AuthProviderError) -> Result<Response> {
    match error {
        AuthProviderError::Rejected(message) => {
            tracing::info!(reason = %message, "Auth provider rejected request");
            Ok(LoginPage::with_status(message).into_response())
        }
        AuthProviderError::Unavailable(message) => Err(AppError::AuthProvider(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::ProviderUser;

    fn session(expires_in: i64) -> ProviderSession {
        ProviderSession {
            access_token: "token-abc".to_string(),
            refresh_token: None,
            expires_in,
            user: ProviderUser {
                id: "user-1".to_string(),
                email: None,
            },
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&Config::test_default(), &session(3600)).to_string();

        assert!(cookie.starts_with("tennis_session=token-abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_secure_off_localhost() {
        let mut config = Config::test_default();
        config.site_url = "https://tennis.example.com".to_string();

        let cookie = session_cookie(&config, &session(60)).to_string();
        assert!(cookie.contains("Secure"));
    }
}
