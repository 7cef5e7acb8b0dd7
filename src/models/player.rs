// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Player model for storage and API.

use crate::view::{Archivable, Keyed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationErrors};

/// Columns fetched for roster and edit views.
pub const PLAYER_COLUMNS: &str =
    "id,club_id,first_name,last_name,dominant_hand,level,notes,archived_at";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum DominantHand {
    Left,
    #[default]
    Right,
}

/// Player row in the `players` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Player {
    pub id: String,
    /// Club (tenant) that owns this player
    pub club_id: String,
    pub first_name: String,
    pub last_name: String,
    pub dominant_hand: DominantHand,
    /// Free-text skill grade (e.g. "3.5")
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Set when archived; None means active
    #[serde(default, with = "crate::time_utils::optional_rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Case-insensitive match of `query` against "first last".
    pub fn matches_search(&self, query: &str) -> bool {
        self.full_name()
            .to_lowercase()
            .contains(&query.trim().to_lowercase())
    }
}

impl Keyed for Player {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Archivable for Player {
    fn set_archived_at(&mut self, archived_at: Option<DateTime<Utc>>) {
        self.archived_at = archived_at;
    }
}

/// Add/edit player form as submitted by a coach.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlayerForm {
    #[validate(length(min = 1, max = 100, message = "First name is required."))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required."))]
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub dominant_hand: DominantHand,
    #[validate(length(max = 20, message = "Level must be at most 20 characters."))]
    #[serde(default)]
    pub level: String,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters."))]
    #[serde(default)]
    pub notes: String,
}

impl PlayerForm {
    /// Trim every field and check the result.
    ///
    /// Returns the first validation message on failure, suitable for inline
    /// display.
    pub fn normalized(self) -> Result<Self, String> {
        let form = Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            dominant_hand: self.dominant_hand,
            level: self.level.trim().to_string(),
            notes: self.notes.trim().to_string(),
        };
        form.validate().map_err(|e| first_message(&e))?;
        Ok(form)
    }

    /// Prefill from an existing player (for the edit page).
    pub fn from_player(player: &Player) -> Self {
        Self {
            first_name: player.first_name.clone(),
            last_name: player.last_name.clone(),
            dominant_hand: player.dominant_hand,
            level: player.level.clone().unwrap_or_default(),
            notes: player.notes.clone().unwrap_or_default(),
        }
    }

    /// Store payload. Empty optional text is written as null.
    pub fn to_write(&self) -> PlayerWrite<'_> {
        PlayerWrite {
            first_name: &self.first_name,
            last_name: &self.last_name,
            dominant_hand: self.dominant_hand,
            level: non_empty(&self.level),
            notes: non_empty(&self.notes),
            club_id: None,
        }
    }
}

/// Row payload for inserts and updates of `players`.
#[derive(Debug, Serialize)]
pub struct PlayerWrite<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub dominant_hand: DominantHand,
    pub level: Option<&'a str>,
    pub notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<&'a str>,
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Pick a deterministic message out of a validation failure.
fn first_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().collect();
    fields.sort();

    fields
        .first()
        .and_then(|field| field_errors.get(*field))
        .and_then(|errs| errs.first())
        .and_then(|err| err.message.as_ref())
        .map(|msg| msg.to_string())
        .unwrap_or_else(|| "Invalid player details.".to_string())
}
