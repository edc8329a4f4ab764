//! In-memory store of resolved weeks.
//!
//! Each week is held as an immutable `Arc<CacheEntry>`. Publishing a new
//! generation swaps that one `Arc` under the write lock; readers clone the
//! `Arc`s they need and release the lock before looking inside, so they always
//! see a complete generation of every week they touch.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::api::{DaySchedule, DaySpan, EntityKind, WeekId, WeekViews};

/// One published generation of a week.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub week: WeekId,
    /// Checksum of the raw document the views were built from.
    pub checksum: String,
    pub views: WeekViews,
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(week: WeekId, checksum: impl Into<String>, views: WeekViews) -> Self {
        Self {
            week,
            checksum: checksum.into(),
            views,
            updated_at: Utc::now(),
        }
    }
}

/// Per-week cache of resolved timetables.
#[derive(Debug, Default)]
pub struct ScheduleCache {
    weeks: RwLock<BTreeMap<WeekId, Arc<CacheEntry>>>,
}

impl ScheduleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, week: WeekId) -> Option<Arc<CacheEntry>> {
        self.weeks.read().get(&week).cloned()
    }

    pub fn checksum(&self, week: WeekId) -> Option<String> {
        self.weeks.read().get(&week).map(|e| e.checksum.clone())
    }

    /// All current entries in ascending week order.
    pub fn entries(&self) -> Vec<Arc<CacheEntry>> {
        self.weeks.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.weeks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.read().is_empty()
    }

    /// Publish `entry` unless the stored entry already has the same checksum.
    ///
    /// Returns the published entry, or `None` when the existing one was kept.
    pub fn publish_if_changed(&self, entry: CacheEntry) -> Option<Arc<CacheEntry>> {
        let mut weeks = self.weeks.write();
        if let Some(current) = weeks.get(&entry.week) {
            if current.checksum == entry.checksum {
                return None;
            }
        }
        let entry = Arc::new(entry);
        weeks.insert(entry.week, Arc::clone(&entry));
        Some(entry)
    }

    /// First week (ascending) whose view has `key` on `date`.
    pub fn find_day(&self, kind: EntityKind, key: &str, date: NaiveDate) -> Option<DaySchedule> {
        self.entries()
            .iter()
            .find_map(|entry| entry.views.view(kind).day(key, date).cloned())
    }

    /// Sorted distinct dates inside `span` on which `key` has lessons in any week.
    pub fn active_dates(&self, kind: EntityKind, key: &str, span: &DaySpan) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = self
            .entries()
            .iter()
            .flat_map(|entry| entry.views.view(kind).dates(key))
            .filter(|date| span.contains(*date))
            .collect();
        dates.into_iter().collect()
    }
}
