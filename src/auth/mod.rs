// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity, authorization, and the auth provider client.

pub mod guard;
pub mod identity;
pub mod provider;

pub use guard::{authorize, Access, CoachScope, Denied, Scope};
pub use identity::{AuthUser, Claims, Identity, IdentityResolver, SESSION_COOKIE};
pub use provider::{
    AuthClient, AuthEvent, AuthProviderError, ProviderSession, SignUpOutcome, Subscription,
};
