// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgREST backend.
//!
//! Requests carry the caller's access token so the project's row-level
//! security policies apply to every read and write.

use crate::db::query::{Action, Cardinality, Query};
use crate::error::StoreError;
use anyhow::Context;
use reqwest::{header, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Accept header asking PostgREST for exactly one object.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST error body.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for `{SUPABASE_URL}/rest/v1`.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestClient {
    pub fn new(supabase_url: &str, anon_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building PostgREST HTTP client")?;

        Ok(Self {
            http,
            base_url: format!("{}/rest/v1", supabase_url),
            anon_key: anon_key.to_string(),
        })
    }

    /// Full request URL for a query.
    pub fn url_for(&self, query: &Query) -> String {
        format!(
            "{}/{}?{}",
            self.base_url,
            query.table_name(),
            query.to_query_string()
        )
    }

    /// Execute a query as the holder of `access_token`.
    pub async fn execute(&self, access_token: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let (method, body) = match query.action() {
            Action::Select => (Method::GET, None),
            Action::Insert(row) => (Method::POST, Some(row)),
            Action::Update(patch) => (Method::PATCH, Some(patch)),
            Action::Delete => (Method::DELETE, None),
        };

        let mut request = self
            .http
            .request(method, self.url_for(query))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);

        if query.is_write() {
            request = request.header("Prefer", "return=representation");
        }
        if query.cardinality() == Cardinality::Single {
            request = request.header(header::ACCEPT, SINGLE_OBJECT);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout
            } else {
                StoreError::Transient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Other(format!("JSON parse error: {}", e)))?;

        Ok(match body {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            row => vec![row],
        })
    }
}

/// Map a failed PostgREST response onto a store error kind.
///
/// The store's own message is kept as the user-facing text.
pub fn classify_error(status: StatusCode, body: &str) -> StoreError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code.unwrap_or_default();
    let message = parsed
        .message
        .unwrap_or_else(|| format!("HTTP {}", status));

    if code == "42501"
        || code.starts_with("PGRST30")
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        StoreError::PermissionDenied(message)
    } else if code == "PGRST116" || status == StatusCode::NOT_FOUND {
        StoreError::NotFound(message)
    } else if code.starts_with("23") {
        StoreError::Constraint(message)
    } else if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        tracing::warn!(status = %status, code = %code, "Transient PostgREST failure");
        StoreError::Transient(message)
    } else {
        StoreError::Other(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_select() {
        let client = RestClient::new("https://demo.supabase.co", "anon", Duration::from_secs(1))
            .unwrap();
        let query = Query::table("users_profile")
            .select("role,club_id")
            .eq("user_id", "u-1")
            .maybe_single();

        assert_eq!(
            client.url_for(&query),
            "https://demo.supabase.co/rest/v1/users_profile?select=role%2Cclub_id&user_id=eq.u-1"
        );
    }

    #[test]
    fn test_classify_error_kinds() {
        let not_found = classify_error(
            StatusCode::NOT_ACCEPTABLE,
            r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#,
        );
        assert_eq!(
            not_found,
            StoreError::NotFound("JSON object requested, multiple (or no) rows returned".to_string())
        );

        let rls = classify_error(
            StatusCode::UNAUTHORIZED,
            r#"{"code":"42501","message":"new row violates row-level security policy for table \"players\""}"#,
        );
        assert!(matches!(rls, StoreError::PermissionDenied(_)));

        let constraint = classify_error(
            StatusCode::CONFLICT,
            r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#,
        );
        assert!(matches!(constraint, StoreError::Constraint(_)));

        let transient = classify_error(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(transient, StoreError::Transient("HTTP 503 Service Unavailable".to_string()));

        let other = classify_error(
            StatusCode::BAD_REQUEST,
            r#"{"code":"PGRST100","message":"failed to parse filter"}"#,
        );
        assert_eq!(other, StoreError::Other("failed to parse filter".to_string()));
    }
}
