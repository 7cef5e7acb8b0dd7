// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization gate: identity + required role → access scope.

use crate::auth::{AuthUser, Identity};
use crate::db::{DataAccess, SupabaseDb};
use crate::models::Role;

/// Tenant scope of an authorized coach.
///
/// Only [`authorize`] can produce one, so coach writes can never be issued
/// without a club filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachScope {
    club_id: String,
}

impl CoachScope {
    pub(crate) fn new(club_id: String) -> Self {
        Self { club_id }
    }

    pub fn club_id(&self) -> &str {
        &self.club_id
    }
}

/// How reads for this caller are narrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Explicit club filter on top of store policies
    Club(CoachScope),
    /// Store policies alone
    StorePolicy,
}

/// Result of a successful authorization.
#[derive(Debug, Clone)]
pub struct Access {
    pub identity: Identity,
    pub role: Role,
    pub scope: Scope,
}

impl Access {
    pub fn coach_scope(&self) -> Option<&CoachScope> {
        match &self.scope {
            Scope::Club(scope) => Some(scope),
            Scope::StorePolicy => None,
        }
    }
}

/// Why access was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
    #[error("no profile for this login")]
    NoProfile,

    #[error("role {actual:?} does not match required {required}")]
    RoleMismatch {
        required: Role,
        actual: Option<Role>,
    },

    /// Recoverable setup problem, shown inline rather than redirected
    #[error("Coach account not set up correctly (missing club).")]
    MissingClub,

    /// Profile lookup failed; treated like a missing profile
    #[error("profile lookup failed: {0}")]
    Lookup(String),
}

impl Denied {
    /// Whether this denial sends the browser back to `/login`.
    pub fn redirects(&self) -> bool {
        !matches!(self, Denied::MissingClub)
    }
}

/// Decide whether `user` may open a page requiring `required`.
pub async fn authorize(db: &SupabaseDb, user: &AuthUser, required: Role) -> Result<Access, Denied> {
    let profile = DataAccess::new(db, user)
        .get_profile()
        .await
        .map_err(|e| Denied::Lookup(e.message()))?
        .ok_or(Denied::NoProfile)?;

    if profile.role != Some(required) {
        return Err(Denied::RoleMismatch {
            required,
            actual: profile.role,
        });
    }

    let scope = match required {
        Role::Coach => {
            let club_id = profile
                .club_id
                .filter(|c| !c.is_empty())
                .ok_or(Denied::MissingClub)?;
            Scope::Club(CoachScope::new(club_id))
        }
        Role::Player => Scope::StorePolicy,
    };

    Ok(Access {
        identity: user.identity.clone(),
        role: required,
        scope,
    })
}
