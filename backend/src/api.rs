//! Public API surface for the timetable backend.
//!
//! This file consolidates the types shared by the resolution engine, the
//! cache and the HTTP layer. Response types derive Serialize/Deserialize for JSON
//! serialization.

pub use crate::models::calendar::{WeekInfo, WeekParity};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of one weekly source document.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WeekId(pub u32);

impl WeekId {
    pub fn new(value: u32) -> Self {
        WeekId(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for WeekId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<WeekId> for u32 {
    fn from(id: WeekId) -> Self {
        id.0
    }
}

/// Which view of the timetable an entity key belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Group,
    Teacher,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Group => "group",
            EntityKind::Teacher => "teacher",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lesson status after classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Ok,
    Replacement,
    Cancellation,
}

/// The single authoritative lesson for one timetable cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLesson {
    pub lesson_number: i32,
    pub subject: String,
    pub teacher: String,
    pub subgroup: i32,
    pub is_stream: bool,
    pub status: LessonStatus,
    pub group_list: Vec<String>,
    /// Subject of the regular lesson a replacement or cancellation overrides.
    pub original_subject: Option<String>,
    /// Display label for the teacher view: the winning record's first group,
    /// or the stream label when several groups share the cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Lessons of one entity on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub day_name: String,
    pub lessons: Vec<ResolvedLesson>,
}

impl DaySchedule {
    /// Build a day from resolved lessons, ordering them by lesson number.
    ///
    /// The sort is stable, so lessons sharing a number keep their relative order.
    pub fn new(date: NaiveDate, mut lessons: Vec<ResolvedLesson>) -> Self {
        lessons.sort_by_key(|lesson| lesson.lesson_number);
        Self {
            date,
            day_name: crate::models::calendar::weekday_name(date).to_string(),
            lessons,
        }
    }
}

/// One view (group or teacher) of one week: entity -> date -> day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSnapshot {
    entities: BTreeMap<String, BTreeMap<NaiveDate, DaySchedule>>,
}

impl WeekSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_day(&mut self, entity: impl Into<String>, day: DaySchedule) {
        self.entities
            .entry(entity.into())
            .or_default()
            .insert(day.date, day);
    }

    pub fn day(&self, entity: &str, date: NaiveDate) -> Option<&DaySchedule> {
        self.entities.get(entity).and_then(|days| days.get(&date))
    }

    /// Dates on which `entity` has at least one lesson, ascending.
    pub fn dates(&self, entity: &str) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entities
            .get(entity)
            .into_iter()
            .flat_map(|days| days.keys().copied())
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// The group-indexed and teacher-indexed snapshots of one week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekViews {
    pub groups: WeekSnapshot,
    pub teachers: WeekSnapshot,
}

impl WeekViews {
    pub fn view(&self, kind: EntityKind) -> &WeekSnapshot {
        match kind {
            EntityKind::Group => &self.groups,
            EntityKind::Teacher => &self.teachers,
        }
    }
}

/// Date window for active-day queries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DaySpan {
    /// Every date of one calendar month.
    Month { year: i32, month: u32 },
    /// Inclusive date range.
    Range { start: NaiveDate, end: NaiveDate },
}

impl DaySpan {
    /// Parse a `YYYY-MM` month selector.
    pub fn parse_month(value: &str) -> Result<Self, String> {
        let invalid = || format!("Invalid month '{}', expected YYYY-MM", value);
        let (year, month) = value.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(DaySpan::Month { year, month })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DaySpan::Month { year, month } => date.year() == year && date.month() == month,
            DaySpan::Range { start, end } => start <= date && date <= end,
        }
    }
}
