//! Profile model: the role and club attached to a login.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Authorization role of a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Coach,
    Player,
}

impl Role {
    /// Landing page for this role.
    pub fn landing_path(self) -> &'static str {
        match self {
            Role::Coach => "/coach",
            Role::Player => "/player",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Coach => f.write_str("coach"),
            Role::Player => f.write_str("player"),
        }
    }
}

/// Row of the `users_profile` table.
///
/// Provisioned outside this application; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Auth subject id this profile belongs to
    pub user_id: String,
    /// Role, or None while setup is incomplete
    #[serde(default)]
    pub role: Option<Role>,
    /// Tenant scope, or None while setup is incomplete
    #[serde(default)]
    pub club_id: Option<String>,
}
