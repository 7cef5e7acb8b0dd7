// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session/identity resolution.
//!
//! The session cookie carries the auth provider's access token. Tokens are
//! verified locally against the project JWT secret, so resolving the
//! current identity never touches the network.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Cookie holding the access token.
pub const SESSION_COOKIE: &str = "tennis_session";

/// Audience Supabase stamps on signed-in user tokens.
const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Access token claims we rely on.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (auth user id)
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: usize,
}

/// Authenticated subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Identity plus the token to present to the store on its behalf.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
    pub access_token: String,
}

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.identity.id
    }
}

/// Verifies access tokens issued by the auth provider.
#[derive(Clone)]
pub struct IdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl IdentityResolver {
    pub fn new(jwt_secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

        Self {
            key: DecodingKey::from_secret(jwt_secret),
            validation,
        }
    }

    /// Resolve the identity behind an access token.
    ///
    /// Returns `None` for malformed, forged, or expired tokens.
    pub fn resolve_token(&self, token: &str) -> Option<AuthUser> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| tracing::debug!(error = %e, "Rejected access token"))
            .ok()?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return None;
        }

        Some(AuthUser {
            identity: Identity {
                id: claims.sub,
                email: claims.email.unwrap_or_default(),
            },
            access_token: token.to_string(),
        })
    }

    /// Resolve the current identity from the request's session.
    ///
    /// Cookie first, then `Authorization: Bearer`. A stale cookie does not
    /// mask a valid header.
    pub fn resolve(&self, jar: &CookieJar, headers: &HeaderMap) -> Option<AuthUser> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| self.resolve_token(cookie.value()))
            .or_else(|| {
                let token = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|h| h.strip_prefix("Bearer "))?;
                self.resolve_token(token.trim())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &[u8] = b"test_jwt_secret_32_bytes_minimum!";

    fn token(sub: &str, aud: &str, exp_offset: i64, secret: &[u8]) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;

        let claims = Claims {
            sub: sub.to_string(),
            email: Some("coach@example.com".to_string()),
            aud: aud.to_string(),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_resolves_identity() {
        let resolver = IdentityResolver::new(SECRET);
        let user = resolver
            .resolve_token(&token("user-1", "authenticated", 3600, SECRET))
            .unwrap();

        assert_eq!(user.identity.id, "user-1");
        assert_eq!(user.identity.email, "coach@example.com");
    }

    #[test]
    fn test_expired_token_is_unauthenticated() {
        let resolver = IdentityResolver::new(SECRET);
        assert!(resolver
            .resolve_token(&token("user-1", "authenticated", -3600, SECRET))
            .is_none());
    }

    #[test]
    fn test_wrong_secret_or_audience_is_unauthenticated() {
        let resolver = IdentityResolver::new(SECRET);
        assert!(resolver
            .resolve_token(&token("user-1", "authenticated", 3600, b"another_secret"))
            .is_none());
        assert!(resolver
            .resolve_token(&token("user-1", "anon", 3600, SECRET))
            .is_none());
        assert!(resolver.resolve_token("not.a.token").is_none());
    }

    #[test]
    fn test_bearer_header_is_accepted_without_cookie() {
        let resolver = IdentityResolver::new(SECRET);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token("user-2", "authenticated", 3600, SECRET))
                .parse()
                .unwrap(),
        );

        let user = resolver.resolve(&CookieJar::new(), &headers).unwrap();
        assert_eq!(user.user_id(), "user-2");
    }

    #[test]
    fn test_stale_cookie_falls_back_to_bearer_header() {
        let resolver = IdentityResolver::new(SECRET);
        let jar = CookieJar::new().add(Cookie::new(
            SESSION_COOKIE,
            token("user-1", "authenticated", -3600, SECRET),
        ));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token("user-2", "authenticated", 3600, SECRET))
                .parse()
                .unwrap(),
        );

        let user = resolver.resolve(&jar, &headers).unwrap();
        assert_eq!(user.user_id(), "user-2");

        assert!(resolver.resolve(&jar, &HeaderMap::new()).is_none());
    }

    #[test]
    fn test_valid_cookie_wins_over_header() {
        let resolver = IdentityResolver::new(SECRET);
        let jar = CookieJar::new().add(Cookie::new(
            SESSION_COOKIE,
            token("user-1", "authenticated", 3600, SECRET),
        ));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token("user-2", "authenticated", 3600, SECRET))
                .parse()
                .unwrap(),
        );

        assert_eq!(resolver.resolve(&jar, &headers).unwrap().user_id(), "user-1");
    }
}
