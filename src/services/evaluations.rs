// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player evaluation detail: one session with its shared and private notes.

use crate::auth::AuthUser;
use crate::db::{DataAccess, SupabaseDb};
use crate::models::{FeedbackEntry, FeedbackScope, Session, Suggestion};
use crate::view::Status;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const NO_PERSONAL_NOTES: &str = "No personal notes were shared for this session.";

/// Evaluation detail page model.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EvaluationDetail {
    pub session: Option<Session>,
    pub team_feedback: Vec<FeedbackEntry>,
    pub team_suggestions: Vec<Suggestion>,
    pub personal_feedback: Vec<FeedbackEntry>,
    pub personal_suggestions: Vec<Suggestion>,
    /// Shown in place of the personal section when it is empty
    pub personal_notice: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub status: Status,
}

/// Load a session and the notes the caller may see.
///
/// Visibility is entirely the store's: team entries reach everyone in the
/// session, individual entries only their target player.
pub async fn load_evaluation(db: &SupabaseDb, user: &AuthUser, session_id: &str) -> EvaluationDetail {
    let access = DataAccess::new(db, user);

    let session = match access.get_session(session_id).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(user_id = %user.user_id(), session_id, error = %e, "Session not readable");
            return EvaluationDetail {
                session: None,
                team_feedback: Vec::new(),
                team_suggestions: Vec::new(),
                personal_feedback: Vec::new(),
                personal_suggestions: Vec::new(),
                personal_notice: None,
                status: Status::Error(e.message()),
            };
        }
    };

    let (feedback, suggestions) = futures_util::future::join(
        access.list_feedback(session_id),
        access.list_suggestions(session_id),
    )
    .await;

    let mut status = Status::Idle;
    let feedback = feedback.unwrap_or_else(|e| {
        status = Status::Error(e.message());
        Vec::new()
    });
    let suggestions = suggestions.unwrap_or_else(|e| {
        status = Status::Error(e.message());
        Vec::new()
    });

    let (team_feedback, personal_feedback): (Vec<_>, Vec<_>) = feedback
        .into_iter()
        .partition(|f| f.scope == FeedbackScope::Team);
    let (team_suggestions, personal_suggestions): (Vec<_>, Vec<_>) = suggestions
        .into_iter()
        .partition(|s| s.scope == FeedbackScope::Team);

    let personal_notice = personal_feedback
        .is_empty()
        .then(|| NO_PERSONAL_NOTES.to_string());

    EvaluationDetail {
        session: Some(session),
        team_feedback,
        team_suggestions,
        personal_feedback,
        personal_suggestions,
        personal_notice,
        status,
    }
}
