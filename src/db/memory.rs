// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store with the same row-level policies as the hosted project.
//!
//! Used by tests in place of a Supabase project. Columns are not
//! projected: rows come back whole and typed decoding ignores what it
//! does not need. Embedded resources (such as the
//! evaluation item on a feedback entry) are stored pre-joined.

use crate::db::query::{Action, Query};
use crate::db::{tables, SINGLE_ROW_MESSAGE};
use crate::error::StoreError;
use crate::models::Role;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

/// Columns that must be present and non-null on insert.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        tables::PLAYERS,
        &["club_id", "first_name", "last_name", "dominant_hand"],
    ),
    (
        tables::SESSIONS,
        &["club_id", "date", "play_format", "coach_mode"],
    ),
];

/// Who is asking, as the policies see it.
struct Viewer {
    user_id: String,
    role: Option<Role>,
    club_id: Option<String>,
    /// Player rows linked to this login
    player_ids: HashSet<String>,
}

/// In-memory tables keyed by name.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    queries: Mutex<Vec<String>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert fixture rows, bypassing policies.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Current rows of a table, bypassing policies.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.get(table).cloned().unwrap_or_default()
    }

    /// Tables touched so far, in call order.
    pub fn queried_tables(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Run a query on behalf of `user_id`.
    pub fn execute(&self, user_id: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query.table_name().to_string());

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let viewer = viewer_for(&tables, user_id);
        let table = query.table_name();

        match query.action() {
            Action::Select => {
                let mut rows: Vec<Value> = tables
                    .get(table)
                    .map(|rows| {
                        rows.iter()
                            .filter(|row| query.matches(row))
                            .filter(|row| can_read(&tables, &viewer, table, row))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                query.sort(&mut rows);
                Ok(rows)
            }
            Action::Insert(row) => {
                let mut row = row.clone();
                check_required(table, &row)?;
                if !can_write(&tables, &viewer, table, &row) {
                    return Err(rls_violation(table));
                }
                if let Value::Object(fields) = &mut row {
                    if fields.get("id").map_or(true, Value::is_null) {
                        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                        fields.insert("id".to_string(), Value::String(format!("mem-{}", id)));
                    }
                }
                tables.entry(table.to_string()).or_default().push(row.clone());
                Ok(vec![row])
            }
            Action::Update(patch) => {
                let patch = patch.as_object().cloned().unwrap_or_default();
                let targets: Vec<usize> = tables
                    .get(table)
                    .map(|rows| {
                        rows.iter()
                            .enumerate()
                            .filter(|(_, row)| query.matches(row))
                            .filter(|(_, row)| can_read(&tables, &viewer, table, row))
                            .map(|(idx, _)| idx)
                            .collect()
                    })
                    .unwrap_or_default();
                check_write_cardinality(query, targets.len())?;

                let mut updated = Vec::with_capacity(targets.len());
                for idx in &targets {
                    let mut row = tables[table][*idx].clone();
                    merge(&mut row, &patch);
                    if !can_write(&tables, &viewer, table, &row) {
                        return Err(rls_violation(table));
                    }
                    updated.push(row);
                }

                if let Some(rows) = tables.get_mut(table) {
                    for (idx, row) in targets.iter().zip(&updated) {
                        rows[*idx] = row.clone();
                    }
                }
                Ok(updated)
            }
            Action::Delete => {
                let deletable: Vec<bool> = tables
                    .get(table)
                    .map(|rows| {
                        rows.iter()
                            .map(|row| {
                                query.matches(row)
                                    && can_read(&tables, &viewer, table, row)
                                    && can_write(&tables, &viewer, table, row)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                check_write_cardinality(query, deletable.iter().filter(|d| **d).count())?;

                let mut deleted = Vec::new();
                if let Some(rows) = tables.get_mut(table) {
                    let mut flags = deletable.iter();
                    rows.retain(|row| {
                        let delete = flags.next().copied().unwrap_or(false);
                        if delete {
                            deleted.push(row.clone());
                        }
                        !delete
                    });
                }
                Ok(deleted)
            }
        }
    }
}

fn merge(row: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(fields) = row {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
    }
}

fn str_field<'a>(row: &'a Value, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

/// Single-row writes are rejected before any row changes, as PostgREST
/// rolls back a write whose representation has the wrong row count.
fn check_write_cardinality(query: &Query, matched: usize) -> Result<(), StoreError> {
    if query.cardinality().accepts(matched) {
        Ok(())
    } else {
        Err(StoreError::NotFound(SINGLE_ROW_MESSAGE.to_string()))
    }
}

fn rls_violation(table: &str) -> StoreError {
    StoreError::PermissionDenied(format!(
        "new row violates row-level security policy for table \"{}\"",
        table
    ))
}

fn check_required(table: &str, row: &Value) -> Result<(), StoreError> {
    let required = REQUIRED_COLUMNS
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, columns)| *columns)
        .unwrap_or_default();

    for column in required {
        if row.get(*column).map_or(true, Value::is_null) {
            return Err(StoreError::Constraint(format!(
                "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                column, table
            )));
        }
    }
    Ok(())
}

fn viewer_for(tables: &HashMap<String, Vec<Value>>, user_id: &str) -> Viewer {
    let profile = tables
        .get(tables::PROFILES)
        .and_then(|rows| rows.iter().find(|r| str_field(r, "user_id") == Some(user_id)));

    let role = profile
        .and_then(|p| p.get("role"))
        .and_then(|r| serde_json::from_value::<Role>(r.clone()).ok());
    let club_id = profile
        .and_then(|p| str_field(p, "club_id"))
        .map(str::to_string);

    let player_ids = tables
        .get(tables::PLAYERS)
        .map(|rows| {
            rows.iter()
                .filter(|r| str_field(r, "user_id") == Some(user_id))
                .filter_map(|r| str_field(r, "id").map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Viewer {
        user_id: user_id.to_string(),
        role,
        club_id,
        player_ids,
    }
}

fn is_club_coach(viewer: &Viewer, club_id: Option<&str>) -> bool {
    viewer.role == Some(Role::Coach)
        && viewer.club_id.is_some()
        && viewer.club_id.as_deref() == club_id
}

fn session_row<'a>(tables: &'a HashMap<String, Vec<Value>>, session_id: Option<&str>) -> Option<&'a Value> {
    let session_id = session_id?;
    tables
        .get(tables::SESSIONS)?
        .iter()
        .find(|s| str_field(s, "id") == Some(session_id))
}

fn participates(tables: &HashMap<String, Vec<Value>>, viewer: &Viewer, session_id: Option<&str>) -> bool {
    let Some(session_id) = session_id else {
        return false;
    };
    tables
        .get(tables::SESSION_PLAYERS)
        .map(|rows| {
            rows.iter().any(|r| {
                str_field(r, "session_id") == Some(session_id)
                    && str_field(r, "player_id").is_some_and(|p| viewer.player_ids.contains(p))
            })
        })
        .unwrap_or(false)
}

fn can_read(tables: &HashMap<String, Vec<Value>>, viewer: &Viewer, table: &str, row: &Value) -> bool {
    match table {
        tables::PROFILES => str_field(row, "user_id") == Some(viewer.user_id.as_str()),
        tables::PLAYERS => {
            is_club_coach(viewer, str_field(row, "club_id"))
                || str_field(row, "user_id") == Some(viewer.user_id.as_str())
        }
        tables::SESSIONS => {
            is_club_coach(viewer, str_field(row, "club_id"))
                || participates(tables, viewer, str_field(row, "id"))
        }
        tables::SESSION_PLAYERS => {
            let session_id = str_field(row, "session_id");
            session_row(tables, session_id)
                .is_some_and(|s| is_club_coach(viewer, str_field(s, "club_id")))
                || str_field(row, "player_id").is_some_and(|p| viewer.player_ids.contains(p))
        }
        tables::FEEDBACK_ENTRIES | tables::SUGGESTIONS => {
            let session_id = str_field(row, "session_id");
            let coach = session_row(tables, session_id)
                .is_some_and(|s| is_club_coach(viewer, str_field(s, "club_id")));
            if coach {
                return true;
            }
            if !participates(tables, viewer, session_id) {
                return false;
            }
            match str_field(row, "scope") {
                Some("team") => true,
                Some("individual") => str_field(row, "player_id")
                    .is_some_and(|p| viewer.player_ids.contains(p)),
                _ => false,
            }
        }
        _ => true,
    }
}

fn can_write(tables: &HashMap<String, Vec<Value>>, viewer: &Viewer, table: &str, row: &Value) -> bool {
    match table {
        tables::PLAYERS | tables::SESSIONS => is_club_coach(viewer, str_field(row, "club_id")),
        tables::SESSION_PLAYERS | tables::FEEDBACK_ENTRIES | tables::SUGGESTIONS => {
            session_row(tables, str_field(row, "session_id"))
                .is_some_and(|s| is_club_coach(viewer, str_field(s, "club_id")))
        }
        _ => false,
    }
}
