// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - page logic layer.

pub mod evaluations;
pub mod landing;
pub mod page_store;
pub mod roster;

pub use evaluations::{load_evaluation, EvaluationDetail};
pub use landing::{resolve_landing, Landing};
pub use page_store::{PageSlot, PageStore};
pub use roster::{RosterPage, RosterService};
