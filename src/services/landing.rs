//! Post-sign-in landing: route a fresh session to its role's home page.

use crate::auth::AuthUser;
use crate::db::{DataAccess, SupabaseDb};
use crate::models::Profile;

pub const ROLE_NOT_SET: &str = "Logged in, but your role is not set yet.";
pub const PROFILE_MISSING: &str =
    "Logged in, but I can't find your profile yet. Ask the coach to finish setup.";

/// Where a signed-in user goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    Redirect(&'static str),
    /// Stay on the login page with this message
    Notice(String),
}

/// Decide the landing for `user` from their profile.
pub async fn resolve_landing(db: &SupabaseDb, user: &AuthUser) -> Landing {
    match DataAccess::new(db, user).get_profile().await {
        Ok(Some(Profile {
            role: Some(role), ..
        })) => Landing::Redirect(role.landing_path()),
        Ok(Some(_)) => Landing::Notice(ROLE_NOT_SET.to_string()),
        Ok(None) => Landing::Notice(PROFILE_MISSING.to_string()),
        Err(e) => {
            tracing::warn!(user_id = %user.user_id(), error = %e, "Role lookup failed");
            Landing::Notice(format!("{} ({})", PROFILE_MISSING, e.message()))
        }
    }
}
