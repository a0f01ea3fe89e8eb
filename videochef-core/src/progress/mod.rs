//! Progress trail for recipe creation runs.
//!
//! A run appends `(step, detail, status, timestamp)` entries as it goes. The
//! trail is append-only; clients poll it to see how far creation got and
//! whether it failed.

mod store;
mod tracker;

pub use store::{InMemoryProgressStore, ProgressStore};
pub use tracker::ProgressTracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visible phase of a creation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStep {
    Ready,
    Caption,
    Detail,
    Step,
    Briefing,
    Finished,
}

/// Unit of work within a phase. The detail phase reports its three
/// persistence results separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressDetail {
    Ready,
    Caption,
    Detail,
    Ingredient,
    Tag,
    DetailMeta,
    Step,
    Briefing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    Started,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub step: ProgressStep,
    pub detail: ProgressDetail,
    pub status: ProgressStatus,
    pub created_at: DateTime<Utc>,
}

impl ProgressEntry {
    pub fn now(step: ProgressStep, detail: ProgressDetail, status: ProgressStatus) -> Self {
        Self {
            step,
            detail,
            status,
            created_at: Utc::now(),
        }
    }

    pub fn is(&self, step: ProgressStep, detail: ProgressDetail, status: ProgressStatus) -> bool {
        self.step == step && self.detail == detail && self.status == status
    }
}

/// Caller-visible outcome derived from a trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationState {
    InProgress,
    Finished,
    Failed,
}

impl CreationState {
    /// Any failure wins; otherwise finished once FINISHED succeeded.
    pub fn from_entries(entries: &[ProgressEntry]) -> Self {
        if entries.iter().any(|e| e.status == ProgressStatus::Failed) {
            CreationState::Failed
        } else if entries.iter().any(|e| {
            e.is(
                ProgressStep::Finished,
                ProgressDetail::Finished,
                ProgressStatus::Success,
            )
        }) {
            CreationState::Finished
        } else {
            CreationState::InProgress
        }
    }
}
