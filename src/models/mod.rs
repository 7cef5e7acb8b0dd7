// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod feedback;
pub mod player;
pub mod profile;
pub mod session;

pub use feedback::{EvaluationItem, FeedbackEntry, FeedbackScope, Suggestion};
pub use player::{DominantHand, Player, PlayerForm};
pub use profile::{Profile, Role};
pub use session::{CoachMode, PlayFormat, Session};
