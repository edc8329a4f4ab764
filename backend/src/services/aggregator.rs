//! Slot aggregation: files lesson candidates into per-entity timetable cells.
//!
//! Every bucket member carries the candidate's position in the source stream,
//! so the resolver's first-seen tie-break never depends on container order.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::api::EntityKind;
use crate::models::LessonCandidate;

/// One timetable cell of one entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub entity: String,
    pub date: NaiveDate,
    pub lesson_number: i32,
    pub subgroup: i32,
}

/// A candidate filed into a bucket, tagged with its source position.
#[derive(Debug, Clone, Copy)]
pub struct BucketMember<'a> {
    pub seq: usize,
    pub candidate: &'a LessonCandidate,
}

/// Buckets of one view, keyed by cell.
#[derive(Debug, Default)]
pub struct SlotBuckets<'a> {
    buckets: BTreeMap<SlotKey, Vec<BucketMember<'a>>>,
}

impl<'a> SlotBuckets<'a> {
    fn file(&mut self, entity: &str, seq: usize, candidate: &'a LessonCandidate) {
        let key = SlotKey {
            entity: entity.to_string(),
            date: candidate.date,
            lesson_number: candidate.lesson_number,
            subgroup: candidate.subgroup,
        };
        self.buckets
            .entry(key)
            .or_default()
            .push(BucketMember { seq, candidate });
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &[BucketMember<'a>])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn get(&self, key: &SlotKey) -> Option<&[BucketMember<'a>]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// File each candidate under every group it references.
pub fn aggregate_by_group(candidates: &[LessonCandidate]) -> SlotBuckets<'_> {
    let mut buckets = SlotBuckets::default();
    for (seq, candidate) in candidates.iter().enumerate() {
        let mut seen: Vec<&str> = Vec::with_capacity(candidate.group_list.len());
        for group in &candidate.group_list {
            if seen.contains(&group.as_str()) {
                continue;
            }
            seen.push(group.as_str());
            buckets.file(group, seq, candidate);
        }
    }
    buckets
}

/// File each candidate once under its teacher; candidates without one are skipped.
pub fn aggregate_by_teacher(candidates: &[LessonCandidate]) -> SlotBuckets<'_> {
    let mut buckets = SlotBuckets::default();
    for (seq, candidate) in candidates.iter().enumerate() {
        if candidate.teacher.is_empty() {
            continue;
        }
        buckets.file(&candidate.teacher, seq, candidate);
    }
    buckets
}

pub fn aggregate(kind: EntityKind, candidates: &[LessonCandidate]) -> SlotBuckets<'_> {
    match kind {
        EntityKind::Group => aggregate_by_group(candidates),
        EntityKind::Teacher => aggregate_by_teacher(candidates),
    }
}
