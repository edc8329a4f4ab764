//! Read-side operations over the cache and the entity registry.

use chrono::NaiveDate;

use crate::api::{DaySchedule, DaySpan, EntityKind, WeekInfo};
use crate::db::{EntityRegistry, ScheduleCache};
use crate::models::week_info;

/// Shortest query accepted by name search.
pub const MIN_QUERY_CHARS: usize = 2;

/// A day lookup. A miss still carries the calendar metadata of the date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLookup {
    pub schedule: Option<DaySchedule>,
    pub week: WeekInfo,
}

pub fn lookup_day(cache: &ScheduleCache, kind: EntityKind, key: &str, date: NaiveDate) -> DayLookup {
    DayLookup {
        schedule: cache.find_day(kind, key, date),
        week: week_info(date),
    }
}

pub fn active_days(
    cache: &ScheduleCache,
    kind: EntityKind,
    key: &str,
    span: &DaySpan,
) -> Vec<NaiveDate> {
    cache.active_dates(kind, key, span)
}

/// Up to 20 known names containing `query`, case-insensitively, sorted.
pub fn known_names(registry: &EntityRegistry, kind: EntityKind, query: &str) -> Vec<String> {
    registry.search(kind, query)
}

pub fn is_valid_query(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}
