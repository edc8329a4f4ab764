//! Conflict resolution: one authoritative lesson per timetable cell.
//!
//! Precedence inside a bucket is cancellation > replacement > ok, each picked
//! as the first occurrence in source order. The winner is then enriched with
//! the regular lesson it overrides, the stream flag computed from every group
//! in the bucket, and (teacher view only) a display label for the groups.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::api::{DaySchedule, EntityKind, LessonStatus, ResolvedLesson, WeekSnapshot};
use crate::models::record::{is_cancellation_text, CANCELLATION_LABEL};
use crate::models::LessonCandidate;
use crate::services::aggregator::{BucketMember, SlotBuckets};

/// Streams with more groups than this are labelled by count instead of names.
pub const MAX_LISTED_STREAM_GROUPS: usize = 3;

/// Teacher-view label for a lesson shared by several groups.
pub fn stream_label(groups: &BTreeSet<&str>) -> String {
    if groups.len() > MAX_LISTED_STREAM_GROUPS {
        format!("Поток ({} гр.)", groups.len())
    } else {
        groups.iter().copied().collect::<Vec<_>>().join(", ")
    }
}

fn first_with_status<'a>(
    members: &[BucketMember<'a>],
    status: LessonStatus,
) -> Option<&'a LessonCandidate> {
    members
        .iter()
        .filter(|m| m.candidate.status == status)
        .min_by_key(|m| m.seq)
        .map(|m| m.candidate)
}

fn to_lesson(candidate: &LessonCandidate, kind: EntityKind) -> ResolvedLesson {
    ResolvedLesson {
        lesson_number: candidate.lesson_number,
        subject: candidate.subject.clone(),
        teacher: candidate.teacher.clone(),
        subgroup: candidate.subgroup,
        is_stream: candidate.stream_hint,
        status: candidate.status,
        group_list: candidate.group_list.clone(),
        original_subject: candidate.original_subject.clone(),
        group: match kind {
            EntityKind::Group => None,
            EntityKind::Teacher => Some(candidate.group_list.first().cloned().unwrap_or_default()),
        },
    }
}

/// Resolve one bucket. Returns `None` only for an empty bucket.
pub fn resolve_bucket(members: &[BucketMember<'_>], kind: EntityKind) -> Option<ResolvedLesson> {
    let participating: BTreeSet<&str> = members
        .iter()
        .flat_map(|m| m.candidate.group_list.iter().map(String::as_str))
        .collect();
    let is_stream = participating.len() > 1;

    let cancellation = first_with_status(members, LessonStatus::Cancellation);
    let replacement = first_with_status(members, LessonStatus::Replacement);
    let original = first_with_status(members, LessonStatus::Ok);

    let winner = cancellation
        .or(replacement)
        .or(original)
        .or_else(|| members.iter().max_by_key(|m| m.seq).map(|m| m.candidate))?;

    let mut lesson = to_lesson(winner, kind);

    if let Some(ok) = original {
        match lesson.status {
            LessonStatus::Cancellation => {
                lesson.original_subject = Some(ok.subject.clone());
                if lesson.teacher.is_empty() {
                    lesson.teacher = ok.teacher.clone();
                }
            }
            LessonStatus::Replacement => {
                lesson.original_subject = Some(ok.subject.clone());
            }
            LessonStatus::Ok => {}
        }
    }

    lesson.is_stream = is_stream;
    if is_stream && kind == EntityKind::Teacher {
        lesson.group = Some(stream_label(&participating));
    }

    if is_cancellation_text(&lesson.subject) {
        lesson.status = LessonStatus::Cancellation;
        lesson.subject = CANCELLATION_LABEL.to_string();
    }

    Some(lesson)
}

/// Resolve every bucket of one view into day schedules.
pub fn resolve_view(buckets: &SlotBuckets<'_>, kind: EntityKind) -> WeekSnapshot {
    let mut days: BTreeMap<(&str, NaiveDate), Vec<ResolvedLesson>> = BTreeMap::new();
    for (key, members) in buckets.iter() {
        if let Some(lesson) = resolve_bucket(members, kind) {
            days.entry((key.entity.as_str(), key.date))
                .or_default()
                .push(lesson);
        }
    }

    let mut snapshot = WeekSnapshot::new();
    for ((entity, date), lessons) in days {
        snapshot.insert_day(entity, DaySchedule::new(date, lessons));
    }
    snapshot
}
