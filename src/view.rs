// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page-local view state.
//!
//! A [`ViewState`] holds the ordered records a page is displaying plus one
//! status line. Remote writes are issued by the caller; once a write has
//! succeeded the held records are patched in place instead of re-querying
//! the store.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Records addressable by id.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Records supporting soft delete via a nullable timestamp.
pub trait Archivable: Keyed {
    fn set_archived_at(&mut self, archived_at: Option<DateTime<Utc>>);
}

/// Single status line shown by a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Saving,
    Archiving,
    Restoring,
    Deleting,
    /// Informational text (confirmation prompts, hints)
    Message(String),
    /// Failure text, verbatim from the store where possible
    Error(String),
}

impl Status {
    /// Text rendered for this status.
    pub fn text(&self) -> &str {
        match self {
            Status::Idle => "",
            Status::Loading => "Loading...",
            Status::Saving => "Saving...",
            Status::Archiving => "Archiving...",
            Status::Restoring => "Restoring...",
            Status::Deleting => "Deleting...",
            Status::Message(text) | Status::Error(text) => text,
        }
    }

    /// Whether a request is in flight. Mutations are refused while busy.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Status::Loading
                | Status::Saving
                | Status::Archiving
                | Status::Restoring
                | Status::Deleting
        )
    }
}

impl Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.text())
    }
}

/// Returned when a mutation is attempted while another request is in flight.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Busy(pub String);

/// Local copy of fetched records plus status.
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    records: Vec<T>,
    status: Status,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            status: Status::Idle,
        }
    }
}

impl<T: Keyed> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.records.iter().find(|r| r.key() == key)
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    /// Show informational or error text without touching the records.
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Enter `Loading` (on mount or when the query changes).
    pub fn begin_load(&mut self) {
        self.status = Status::Loading;
    }

    /// Settle a load. On failure the previous records are kept.
    pub fn finish_load(&mut self, result: Result<Vec<T>, StoreError>) {
        match result {
            Ok(records) => {
                self.records = records;
                self.status = Status::Idle;
            }
            Err(StoreError::Cancelled) => self.status = Status::Idle,
            Err(err) => self.status = Status::Error(err.message()),
        }
    }

    /// Refuse while a request is in flight.
    ///
    /// Anything that would replace the status must pass this first, or a
    /// prompt could clear the in-flight marker.
    pub fn ensure_idle(&self) -> Result<(), Busy> {
        if self.status.is_busy() {
            return Err(Busy(format!(
                "Please wait: {}",
                self.status.text().trim_end_matches("...")
            )));
        }
        Ok(())
    }

    /// Claim the page for a mutation, refusing if one is in flight.
    pub fn begin_mutation(&mut self, status: Status) -> Result<(), Busy> {
        self.ensure_idle()?;
        self.status = status;
        Ok(())
    }

    /// Settle a mutation.
    ///
    /// Returns the confirmed value on success so the caller can patch the
    /// held records; on failure the records are left as they were.
    pub fn finish_mutation<R>(&mut self, result: Result<R, StoreError>) -> Option<R> {
        match result {
            Ok(value) => {
                self.status = Status::Idle;
                Some(value)
            }
            Err(StoreError::Cancelled) => {
                self.status = Status::Idle;
                None
            }
            Err(err) => {
                self.status = Status::Error(err.message());
                None
            }
        }
    }

    /// Drop a record from the held sequence.
    pub fn remove(&mut self, key: &str) {
        self.records.retain(|r| r.key() != key);
    }

    /// Replace a record in place, keeping its position.
    pub fn replace(&mut self, record: T) {
        if let Some(slot) = self.records.iter_mut().find(|r| r.key() == record.key()) {
            *slot = record;
        }
    }
}

impl<T: Archivable> ViewState<T> {
    /// Reflect a confirmed archive.
    ///
    /// With archived rows hidden the row is dropped; otherwise its
    /// `archived_at` is patched in place.
    pub fn apply_archived(&mut self, key: &str, archived_at: DateTime<Utc>, show_archived: bool) {
        if show_archived {
            if let Some(record) = self.records.iter_mut().find(|r| r.key() == key) {
                record.set_archived_at(Some(archived_at));
            }
        } else {
            self.remove(key);
        }
    }

    /// Reflect a confirmed restore.
    pub fn apply_restored(&mut self, key: &str) {
        if let Some(record) = self.records.iter_mut().find(|r| r.key() == key) {
            record.set_archived_at(None);
        }
    }
}
