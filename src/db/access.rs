// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scoped data access.
//!
//! One operation per record kind and action. Coach operations take a
//! [`CoachScope`], which only the authorization gate can produce, and add
//! an explicit `club_id` filter on top of the store's own policies. Player
//! reads add no client-side filter: the store narrows them to what the
//! caller may see.

use crate::auth::{AuthUser, CoachScope};
use crate::db::query::Query;
use crate::db::{tables, SupabaseDb};
use crate::error::StoreError;
use crate::models::feedback::{FEEDBACK_COLUMNS, SUGGESTION_COLUMNS};
use crate::models::player::PLAYER_COLUMNS;
use crate::models::session::SESSION_COLUMNS;
use crate::models::{FeedbackEntry, Player, PlayerForm, Profile, Session, Suggestion};
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Store operations on behalf of one signed-in user.
pub struct DataAccess<'a> {
    db: &'a SupabaseDb,
    user: &'a AuthUser,
    cancel: CancellationToken,
}

impl<'a> DataAccess<'a> {
    pub fn new(db: &'a SupabaseDb, user: &'a AuthUser) -> Self {
        Self {
            db,
            user,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie every call to `cancel` (usually the owning page's token).
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    // ─── Profiles ────────────────────────────────────────────────

    /// Caller's profile. Enforcement: store policy (own row only).
    pub async fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        let query = Query::table(tables::PROFILES)
            .select("user_id,role,club_id")
            .eq("user_id", self.user.user_id());

        self.db.fetch_optional(self.user, query, &self.cancel).await
    }

    // ─── Players (coach) ─────────────────────────────────────────

    /// Club roster ordered by last then first name.
    /// Enforcement: client `club_id` filter + store.
    pub async fn list_players(
        &self,
        coach: &CoachScope,
        include_archived: bool,
    ) -> Result<Vec<Player>, StoreError> {
        let mut query = Query::table(tables::PLAYERS)
            .select(PLAYER_COLUMNS)
            .eq("club_id", coach.club_id());
        if !include_archived {
            query = query.is_null("archived_at");
        }
        let query = query.order("last_name", true).order("first_name", true);

        self.db.fetch_all(self.user, query, &self.cancel).await
    }

    /// Enforcement: client `club_id` filter + store.
    pub async fn get_player(&self, coach: &CoachScope, id: &str) -> Result<Player, StoreError> {
        let query = Query::table(tables::PLAYERS)
            .select(PLAYER_COLUMNS)
            .eq("id", id)
            .eq("club_id", coach.club_id());

        self.db.fetch_one(self.user, query, &self.cancel).await
    }

    /// Enforcement: `club_id` stamped from the scope + store.
    pub async fn insert_player(
        &self,
        coach: &CoachScope,
        form: &PlayerForm,
    ) -> Result<Player, StoreError> {
        let mut row = form.to_write();
        row.club_id = Some(coach.club_id());
        let row = serde_json::to_value(&row).map_err(|e| StoreError::Other(e.to_string()))?;

        let query = Query::table(tables::PLAYERS)
            .insert(row)
            .select(PLAYER_COLUMNS);

        let player: Player = self.db.fetch_one(self.user, query, &self.cancel).await?;
        tracing::info!(player_id = %player.id, club_id = %player.club_id, "Player added");
        Ok(player)
    }

    /// Enforcement: client `club_id` filter + store.
    pub async fn update_player(
        &self,
        coach: &CoachScope,
        id: &str,
        form: &PlayerForm,
    ) -> Result<Player, StoreError> {
        let patch =
            serde_json::to_value(form.to_write()).map_err(|e| StoreError::Other(e.to_string()))?;

        let query = Query::table(tables::PLAYERS)
            .update(patch)
            .eq("id", id)
            .eq("club_id", coach.club_id())
            .select(PLAYER_COLUMNS);

        let player: Player = self.db.fetch_one(self.user, query, &self.cancel).await?;
        tracing::info!(player_id = %player.id, "Player updated");
        Ok(player)
    }

    /// Archive (`Some`) or restore (`None`) a player.
    /// Enforcement: client `club_id` filter + store.
    pub async fn set_player_archived(
        &self,
        coach: &CoachScope,
        id: &str,
        archived_at: Option<DateTime<Utc>>,
    ) -> Result<Player, StoreError> {
        let stamp = archived_at.map(crate::time_utils::format_utc_rfc3339);
        let query = Query::table(tables::PLAYERS)
            .update(json!({ "archived_at": stamp }))
            .eq("id", id)
            .eq("club_id", coach.club_id())
            .select(PLAYER_COLUMNS);

        let player: Player = self.db.fetch_one(self.user, query, &self.cancel).await?;
        tracing::info!(
            player_id = %player.id,
            archived = player.is_archived(),
            "Player archive state changed"
        );
        Ok(player)
    }

    /// Permanently remove an archived player. Active players never match.
    /// Enforcement: client `club_id` and `archived_at` filters + store.
    pub async fn delete_player(&self, coach: &CoachScope, id: &str) -> Result<(), StoreError> {
        let query = Query::table(tables::PLAYERS)
            .delete()
            .eq("id", id)
            .eq("club_id", coach.club_id())
            .not_null("archived_at")
            .select("id");

        self.db
            .fetch_one::<serde_json::Value>(self.user, query, &self.cancel)
            .await?;
        tracing::info!(player_id = %id, "Player deleted");
        Ok(())
    }

    // ─── Sessions ────────────────────────────────────────────────

    /// Sessions the caller took part in, newest first.
    /// Enforcement: store policy only.
    pub async fn list_sessions_for_player(&self) -> Result<Vec<Session>, StoreError> {
        let query = Query::table(tables::SESSIONS)
            .select(SESSION_COLUMNS)
            .order("date", false);

        self.db.fetch_all(self.user, query, &self.cancel).await
    }

    /// All club sessions, newest first.
    /// Enforcement: client `club_id` filter + store.
    pub async fn list_club_sessions(&self, coach: &CoachScope) -> Result<Vec<Session>, StoreError> {
        let query = Query::table(tables::SESSIONS)
            .select(SESSION_COLUMNS)
            .eq("club_id", coach.club_id())
            .order("date", false);

        self.db.fetch_all(self.user, query, &self.cancel).await
    }

    /// Enforcement: store policy only.
    pub async fn get_session(&self, id: &str) -> Result<Session, StoreError> {
        let query = Query::table(tables::SESSIONS)
            .select(SESSION_COLUMNS)
            .eq("id", id);

        self.db.fetch_one(self.user, query, &self.cancel).await
    }

    // ─── Feedback ────────────────────────────────────────────────

    /// Feedback for a session, team entries first.
    /// Enforcement: store policy only.
    pub async fn list_feedback(&self, session_id: &str) -> Result<Vec<FeedbackEntry>, StoreError> {
        let query = Query::table(tables::FEEDBACK_ENTRIES)
            .select(FEEDBACK_COLUMNS)
            .eq("session_id", session_id)
            .order("scope", true);

        self.db.fetch_all(self.user, query, &self.cancel).await
    }

    /// Suggestions for a session, team entries first.
    /// Enforcement: store policy only.
    pub async fn list_suggestions(&self, session_id: &str) -> Result<Vec<Suggestion>, StoreError> {
        let query = Query::table(tables::SUGGESTIONS)
            .select(SUGGESTION_COLUMNS)
            .eq("session_id", session_id)
            .order("scope", true);

        self.db.fetch_all(self.user, query, &self.cancel).await
    }
}
