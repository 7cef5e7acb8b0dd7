//! Evaluation feedback and suggestions attached to a session.

use crate::view::Keyed;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Columns for feedback rows, embedding the evaluation item.
pub const FEEDBACK_COLUMNS: &str =
    "id,session_id,scope,player_id,rating,comment,evaluation_items(category,name)";

/// Columns for suggestion rows.
pub const SUGGESTION_COLUMNS: &str =
    "id,session_id,scope,player_id,strength_text,priority_text,drill_text";

/// Who a piece of feedback is shared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackScope {
    /// Visible to every player in the session
    Team,
    /// Visible only to the targeted player
    Individual,
}

/// Rubric item a feedback entry rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EvaluationItem {
    pub category: String,
    pub name: String,
}

/// Feedback row in the `feedback_entries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedbackEntry {
    pub id: String,
    pub session_id: String,
    pub scope: FeedbackScope,
    /// Target player for individual entries
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(rename = "evaluation_items")]
    pub item: EvaluationItem,
}

/// Suggestion row in the `suggestions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Suggestion {
    pub id: String,
    pub session_id: String,
    pub scope: FeedbackScope,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub strength_text: Option<String>,
    #[serde(default)]
    pub priority_text: Option<String>,
    #[serde(default)]
    pub drill_text: Option<String>,
}

impl Keyed for FeedbackEntry {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Suggestion {
    fn key(&self) -> &str {
        &self.id
    }
}
