//! Data Transfer Objects for the HTTP API.
//!
//! Query strings and response bodies. Lessons are serialized straight from
//! [`crate::api::ResolvedLesson`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{EntityKind, ResolvedLesson, WeekParity};
use crate::services::{DayLookup, SweepSummary, WeekStatus};

/// Picks the view a request addresses. `group` wins over `teacher`, and an
/// empty value counts as absent.
pub fn select_entity<'a>(
    group: Option<&'a str>,
    teacher: Option<&'a str>,
) -> Option<(EntityKind, &'a str)> {
    let present = |v: Option<&'a str>| v.filter(|s| !s.is_empty());
    present(group)
        .map(|g| (EntityKind::Group, g))
        .or_else(|| present(teacher).map(|t| (EntityKind::Teacher, t)))
}

/// Query parameters for `/api/schedule/day`.
#[derive(Debug, Clone, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
}

/// Query parameters for `/api/meta/active_days`.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthQuery {
    /// Month in `YYYY-MM` form
    pub month: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
}

/// Query parameters for `/api/meta/active_days_range`.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of weeks currently held in the cache
    pub weeks_cached: usize,
}

/// One day of one entity plus the calendar metadata of the date.
///
/// A miss has an empty `day_name` and no lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayResponse {
    pub day_name: String,
    pub lessons: Vec<ResolvedLesson>,
    pub week_number: u32,
    pub week_type: WeekParity,
}

impl From<DayLookup> for DayResponse {
    fn from(lookup: DayLookup) -> Self {
        let (day_name, lessons) = match lookup.schedule {
            Some(day) => (day.day_name, day.lessons),
            None => (String::new(), Vec::new()),
        };
        Self {
            day_name,
            lessons,
            week_number: lookup.week.week_number,
            week_type: lookup.week.week_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveDaysResponse {
    pub active_days: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSearchResponse {
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherSearchResponse {
    pub teachers: Vec<String>,
}

/// Background refresh status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshStatusResponse {
    pub last_sweep_at: Option<DateTime<Utc>>,
    pub last_sweep: Option<SweepSummary>,
    pub weeks: Vec<WeekStatus>,
}
