//! Academic calendar helpers used to annotate responses.
//!
//! The academic year runs from September 1 to July 3 of the following year.
//! The legacy week index buckets the day offset from the year start into
//! 14-day blocks, while the numerator/denominator parity label buckets the
//! same offset into 7-day blocks. During the winter holiday window
//! (January 5-11) the offset stops advancing.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Upper bound of the legacy week index.
pub const MAX_WEEK_INDEX: i64 = 20;

const YEAR_START: (u32, u32) = (9, 1);
const YEAR_END: (u32, u32) = (7, 3);
const HOLIDAY_START: (u32, u32) = (1, 5);
const HOLIDAY_END: (u32, u32) = (1, 11);

const DAY_NAMES: [&str; 7] = [
    "Понедельник",
    "Вторник",
    "Среда",
    "Четверг",
    "Пятница",
    "Суббота",
    "Воскресенье",
];

/// Numerator / denominator week label.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekParity {
    #[serde(rename = "Числитель")]
    Numerator,
    #[serde(rename = "Знаменатель")]
    Denominator,
}

/// Calendar metadata attached to day responses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekInfo {
    pub week_number: u32,
    pub week_type: WeekParity,
}

impl Default for WeekInfo {
    fn default() -> Self {
        Self {
            week_number: 1,
            week_type: WeekParity::Numerator,
        }
    }
}

/// Russian weekday name for `date`.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    DAY_NAMES[date.weekday().num_days_from_monday() as usize]
}

/// Compute the week index and parity label for `date`.
///
/// Dates outside the academic year yield week 1 / numerator.
pub fn week_info(date: NaiveDate) -> WeekInfo {
    compute_week_info(date).unwrap_or_default()
}

fn compute_week_info(date: NaiveDate) -> Option<WeekInfo> {
    let start_year = if date.month() >= YEAR_START.0 {
        date.year()
    } else {
        date.year() - 1
    };
    let start = ymd(start_year, YEAR_START)?;
    let end = ymd(start_year + 1, YEAR_END)?;
    if date < start || date > end {
        return Some(WeekInfo::default());
    }

    let holiday_start = ymd(date.year(), HOLIDAY_START)?;
    let holiday_end = ymd(date.year(), HOLIDAY_END)?;
    let effective = if holiday_start <= date && date <= holiday_end {
        holiday_start
    } else {
        date
    };

    let offset = (effective - start).num_days();
    let week_number = (offset / 14 + 1).clamp(1, MAX_WEEK_INDEX) as u32;
    let week_type = if (offset / 7 + 1) % 2 != 0 {
        WeekParity::Numerator
    } else {
        WeekParity::Denominator
    };

    Some(WeekInfo {
        week_number,
        week_type,
    })
}

fn ymd(year: i32, (month, day): (u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}
