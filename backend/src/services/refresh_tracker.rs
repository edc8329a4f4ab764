//! Refresh tracking for the background sweep.
//!
//! Keeps the outcome of the most recent refresh attempt for every week, so the
//! status endpoint can show which weeks are stale or failing.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::WeekId;

/// Outcome of one refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    Updated,
    Unchanged,
    Failed,
}

/// Last known refresh status of a week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekStatus {
    pub week: WeekId,
    pub state: RefreshState,
    pub last_checked: DateTime<Utc>,
    /// When a new generation was last published, if ever.
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Totals of one full sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl SweepSummary {
    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.failed
    }
}

#[derive(Debug, Default)]
struct TrackerInner {
    weeks: BTreeMap<WeekId, WeekStatus>,
    last_sweep: Option<(DateTime<Utc>, SweepSummary)>,
}

/// In-memory refresh tracker, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct RefreshTracker {
    inner: Arc<RwLock<TrackerInner>>,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of refreshing `week`.
    pub fn record(&self, week: WeekId, state: RefreshState, message: Option<String>) {
        let now = Utc::now();
        let mut inner = self.inner.write();
        let previous_update = inner.weeks.get(&week).and_then(|s| s.last_updated);
        let last_updated = match state {
            RefreshState::Updated => Some(now),
            RefreshState::Unchanged | RefreshState::Failed => previous_update,
        };
        inner.weeks.insert(
            week,
            WeekStatus {
                week,
                state,
                last_checked: now,
                last_updated,
                message,
            },
        );
    }

    pub fn finish_sweep(&self, summary: SweepSummary) {
        self.inner.write().last_sweep = Some((Utc::now(), summary));
    }

    pub fn week(&self, week: WeekId) -> Option<WeekStatus> {
        self.inner.read().weeks.get(&week).cloned()
    }

    /// Statuses of every week seen so far, in week order.
    pub fn weeks(&self) -> Vec<WeekStatus> {
        self.inner.read().weeks.values().cloned().collect()
    }

    pub fn last_sweep(&self) -> Option<(DateTime<Utc>, SweepSummary)> {
        self.inner.read().last_sweep
    }
}
