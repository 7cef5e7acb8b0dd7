// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase auth (GoTrue) client.
//!
//! Handles:
//! - Password sign-in and sign-up
//! - Magic-link (OTP) delivery and token-hash verification
//! - Sign-out and user lookup
//! - Broadcasting session changes to in-process subscribers

use crate::config::Config;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Buffered auth events before slow subscribers start lagging.
const EVENT_CAPACITY: usize = 64;

/// Auth provider failure, carrying the provider's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthProviderError {
    /// Provider rejected the request (bad credentials, rate limit, ...)
    #[error("{0}")]
    Rejected(String),

    /// Provider unreachable or returned garbage
    #[error("{0}")]
    Unavailable(String),
}

/// Session change observed by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: String },
    SignedOut { user_id: String },
}

impl AuthEvent {
    pub fn user_id(&self) -> &str {
        match self {
            AuthEvent::SignedIn { user_id } | AuthEvent::SignedOut { user_id } => user_id,
        }
    }
}

/// Listener for [`AuthEvent`]s. Dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl Subscription {
    /// Next event, or `None` once the client is gone.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// User object returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token grant returned by password sign-in and OTP verification.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    pub user: ProviderUser,
}

fn default_expires_in() -> i64 {
    3600
}

/// Sign-up outcome. With email confirmation on there is no session yet.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    SessionCreated(ProviderSession),
    ConfirmationSent,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct OtpRequest<'a> {
    email: &'a str,
    create_user: bool,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    token_hash: &'a str,
}

/// Error body shapes GoTrue uses across versions.
#[derive(Deserialize, Default)]
struct ProviderErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Auth provider client.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    site_url: String,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthClient {
    /// Create a client for the project's `/auth/v1` endpoints.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed building auth HTTP client")?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            http,
            base_url: format!("{}/auth/v1", config.supabase_url),
            anon_key: config.supabase_anon_key.clone(),
            site_url: config.site_url.clone(),
            events,
        })
    }

    // ─── Session Events ──────────────────────────────────────────

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.events.subscribe(),
        }
    }

    /// Announce a session change. No subscribers is not an error.
    pub fn publish(&self, event: AuthEvent) {
        tracing::debug!(event = ?event, "Auth state changed");
        let _ = self.events.send(event);
    }

    // ─── Provider Calls ──────────────────────────────────────────

    /// Sign in with email and password.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, AuthProviderError> {
        let url = format!("{}/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(|e| AuthProviderError::Unavailable(e.to_string()))?;

        let session: ProviderSession = check_response_json(response).await?;
        self.publish(AuthEvent::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(session)
    }

    /// Email a magic sign-in link that lands on `/login?confirmed=1`.
    pub async fn sign_in_with_otp(&self, email: &str) -> Result<(), AuthProviderError> {
        let url = format!(
            "{}/otp?redirect_to={}",
            self.base_url,
            urlencoding::encode(&self.magic_link_redirect())
        );

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&OtpRequest {
                email,
                create_user: true,
            })
            .send()
            .await
            .map_err(|e| AuthProviderError::Unavailable(e.to_string()))?;

        check_response(response).await
    }

    /// Create an account.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpOutcome, AuthProviderError> {
        let url = format!("{}/signup", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(|e| AuthProviderError::Unavailable(e.to_string()))?;

        let body: serde_json::Value = check_response_json(response).await?;
        if body.get("access_token").is_some() {
            let session: ProviderSession = serde_json::from_value(body)
                .map_err(|e| AuthProviderError::Unavailable(format!("JSON parse error: {}", e)))?;
            self.publish(AuthEvent::SignedIn {
                user_id: session.user.id.clone(),
            });
            return Ok(SignUpOutcome::SessionCreated(session));
        }

        Ok(SignUpOutcome::ConfirmationSent)
    }

    /// Exchange a magic-link token hash for a session.
    pub async fn verify_otp(
        &self,
        token_hash: &str,
        kind: &str,
    ) -> Result<ProviderSession, AuthProviderError> {
        let url = format!("{}/verify", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&VerifyRequest { kind, token_hash })
            .send()
            .await
            .map_err(|e| AuthProviderError::Unavailable(e.to_string()))?;

        let session: ProviderSession = check_response_json(response).await?;
        self.publish(AuthEvent::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(session)
    }

    /// Revoke the session server-side.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthProviderError> {
        let url = format!("{}/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthProviderError::Unavailable(e.to_string()))?;

        check_response(response).await
    }

    /// Fetch the user behind an access token from the provider.
    pub async fn get_user(&self, access_token: &str) -> Result<ProviderUser, AuthProviderError> {
        let url = format!("{}/user", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthProviderError::Unavailable(e.to_string()))?;

        check_response_json(response).await
    }

    /// Where magic links send the browser back to.
    pub fn magic_link_redirect(&self) -> String {
        format!("{}/login?confirmed=1", self.site_url)
    }
}

/// Check response status and return the provider's message if not successful.
async fn check_response(response: reqwest::Response) -> Result<(), AuthProviderError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(error_from_response(response).await)
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AuthProviderError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| AuthProviderError::Unavailable(format!("JSON parse error: {}", e)))
}

async fn error_from_response(response: reqwest::Response) -> AuthProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));

    if status.is_server_error() {
        tracing::warn!(status = %status, "Auth provider unavailable");
        AuthProviderError::Unavailable(message)
    } else {
        AuthProviderError::Rejected(message)
    }
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(ProviderErrorBody::into_message)
}
