// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach roster page: load, search, archive, restore and delete.
//!
//! Remote writes are issued with the page lock released; the held records
//! are patched only after the store confirms. Lifecycle is archive first:
//! active players can only be archived, and only archived players can be
//! deleted.

use crate::auth::{AuthUser, CoachScope};
use crate::db::{DataAccess, SupabaseDb};
use crate::models::Player;
use crate::services::page_store::PageSlot;
use crate::view::{Busy, Status, ViewState};
use chrono::Utc;
use std::sync::Arc;

const NOT_LISTED: &str = "That player is not in the current list.";

/// State of one mounted roster page.
#[derive(Debug, Default)]
pub struct RosterPage {
    view: ViewState<Player>,
    show_archived: bool,
    search: String,
}

impl RosterPage {
    pub fn new(show_archived: bool) -> Self {
        Self {
            view: ViewState::new(),
            show_archived,
            search: String::new(),
        }
    }

    pub fn view(&self) -> &ViewState<Player> {
        &self.view
    }

    pub fn show_archived(&self) -> bool {
        self.show_archived
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.trim().to_string();
    }

    /// Held players matching the search text. Never touches the store.
    pub fn visible(&self) -> Vec<Player> {
        self.view
            .records()
            .iter()
            .filter(|p| self.search.is_empty() || p.matches_search(&self.search))
            .cloned()
            .collect()
    }

    /// Look up a held player for an action, reporting inline when it is
    /// not listed. Refused outright while a write is in flight.
    fn listed(&mut self, player_id: &str) -> Result<Option<Player>, Busy> {
        self.view.ensure_idle()?;
        let player = self.view.get(player_id).cloned();
        if player.is_none() {
            self.view.set_status(Status::Error(NOT_LISTED.to_string()));
        }
        Ok(player)
    }
}

/// Roster operations for one coach against their mounted page.
pub struct RosterService<'a> {
    access: DataAccess<'a>,
    coach: &'a CoachScope,
    slot: Arc<PageSlot<RosterPage>>,
}

impl<'a> RosterService<'a> {
    pub fn new(
        db: &'a SupabaseDb,
        user: &'a AuthUser,
        coach: &'a CoachScope,
        slot: Arc<PageSlot<RosterPage>>,
    ) -> Self {
        let access = DataAccess::new(db, user).with_cancel(slot.cancel_token());
        Self {
            access,
            coach,
            slot,
        }
    }

    pub fn slot(&self) -> &Arc<PageSlot<RosterPage>> {
        &self.slot
    }

    /// Fetch the roster into the page.
    pub async fn load(&self) {
        let show_archived = {
            let mut page = self.slot.lock();
            page.view.begin_load();
            page.show_archived
        };

        let result = self.access.list_players(self.coach, show_archived).await;
        if let Err(e) = &result {
            tracing::warn!(club_id = %self.coach.club_id(), error = %e, "Roster load failed");
        }

        self.slot.lock().view.finish_load(result);
    }

    /// Archive a player. Without confirmation only a prompt is shown.
    pub async fn archive(&self, player_id: &str, confirmed: bool) -> Result<(), Busy> {
        let player = {
            let mut page = self.slot.lock();
            let Some(player) = page.listed(player_id)? else {
                return Ok(());
            };
            if player.is_archived() {
                page.view.set_status(Status::Message(format!(
                    "{} is already archived.",
                    player.full_name()
                )));
                return Ok(());
            }
            if !confirmed {
                page.view.set_status(Status::Message(format!(
                    "Archive {}? They will be hidden from the roster until restored.",
                    player.full_name()
                )));
                return Ok(());
            }
            page.view.begin_mutation(Status::Archiving)?;
            player
        };

        let result = self
            .access
            .set_player_archived(self.coach, &player.id, Some(Utc::now()))
            .await;

        let mut page = self.slot.lock();
        let show_archived = page.show_archived;
        if let Some(updated) = page.view.finish_mutation(result) {
            let archived_at = updated.archived_at.unwrap_or_else(Utc::now);
            page.view.apply_archived(&player.id, archived_at, show_archived);
            page.view.set_status(Status::Message(format!(
                "Archived {}.",
                player.full_name()
            )));
        }
        Ok(())
    }

    /// Bring an archived player back onto the active roster.
    pub async fn restore(&self, player_id: &str) -> Result<(), Busy> {
        let player = {
            let mut page = self.slot.lock();
            let Some(player) = page.listed(player_id)? else {
                return Ok(());
            };
            if !player.is_archived() {
                page.view.set_status(Status::Message(format!(
                    "{} is already active.",
                    player.full_name()
                )));
                return Ok(());
            }
            page.view.begin_mutation(Status::Restoring)?;
            player
        };

        let result = self
            .access
            .set_player_archived(self.coach, &player.id, None)
            .await;

        let mut page = self.slot.lock();
        if page.view.finish_mutation(result).is_some() {
            page.view.apply_restored(&player.id);
            page.view.set_status(Status::Message(format!(
                "Restored {}.",
                player.full_name()
            )));
        }
        Ok(())
    }

    /// Permanently delete an archived player.
    pub async fn delete(&self, player_id: &str, confirmed: bool) -> Result<(), Busy> {
        let player = {
            let mut page = self.slot.lock();
            let Some(player) = page.listed(player_id)? else {
                return Ok(());
            };
            if !player.is_archived() {
                page.view.set_status(Status::Error(format!(
                    "Archive {} before deleting.",
                    player.full_name()
                )));
                return Ok(());
            }
            if !confirmed {
                page.view.set_status(Status::Message(format!(
                    "Permanently delete {}? This cannot be undone.",
                    player.full_name()
                )));
                return Ok(());
            }
            page.view.begin_mutation(Status::Deleting)?;
            player
        };

        let result = self.access.delete_player(self.coach, &player.id).await;

        let mut page = self.slot.lock();
        if page.view.finish_mutation(result).is_some() {
            page.view.remove(&player.id);
            page.view.set_status(Status::Message(format!(
                "Deleted {}.",
                player.full_name()
            )));
        }
        Ok(())
    }
}
