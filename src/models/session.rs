// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Practice/match session model.

use crate::view::Keyed;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Columns fetched for session listings and detail headers.
pub const SESSION_COLUMNS: &str =
    "id,club_id,date,play_format,coach_mode,location_name,opponent_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum PlayFormat {
    Practice,
    Singles,
    Doubles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum CoachMode {
    OnCourt,
    OffCourt,
}

impl CoachMode {
    /// Badge label shown next to a session.
    pub fn label(self) -> &'static str {
        match self {
            CoachMode::OnCourt => "On-court",
            CoachMode::OffCourt => "Off-court",
        }
    }
}

/// Session row in the `sessions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub club_id: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    pub play_format: PlayFormat,
    pub coach_mode: CoachMode,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub opponent_name: Option<String>,
}

impl Keyed for Session {
    fn key(&self) -> &str {
        &self.id
    }
}
