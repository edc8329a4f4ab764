//! Builds the group-indexed and teacher-indexed snapshots of one week.

use crate::api::{EntityKind, WeekViews};
use crate::db::registry::EntityRegistry;
use crate::models::{parse_document, DocumentError, LessonCandidate};
use crate::services::aggregator::aggregate;
use crate::services::resolver::resolve_view;

/// Counters reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub records: usize,
    pub dropped: usize,
    pub groups: usize,
    pub teachers: usize,
}

/// Parse `document` and resolve both views, recording every observed name.
pub fn build_week_views(
    document: &[u8],
    registry: &EntityRegistry,
) -> Result<(WeekViews, BuildReport), DocumentError> {
    let parsed = parse_document(document)?;
    record_names(registry, &parsed.candidates);

    let views = build_views(&parsed.candidates);
    let report = BuildReport {
        records: parsed.candidates.len(),
        dropped: parsed.dropped,
        groups: views.groups.entity_count(),
        teachers: views.teachers.entity_count(),
    };

    log::debug!(
        "Built week views: {} records ({} dropped), {} groups, {} teachers",
        report.records,
        report.dropped,
        report.groups,
        report.teachers
    );

    Ok((views, report))
}

/// Run aggregation and resolution for both views over the same candidates.
pub fn build_views(candidates: &[LessonCandidate]) -> WeekViews {
    let view = |kind| resolve_view(&aggregate(kind, candidates), kind);
    WeekViews {
        groups: view(EntityKind::Group),
        teachers: view(EntityKind::Teacher),
    }
}

fn record_names(registry: &EntityRegistry, candidates: &[LessonCandidate]) {
    registry.extend(
        EntityKind::Group,
        candidates
            .iter()
            .flat_map(|c| c.group_list.iter().map(String::as_str)),
    );
    registry.extend(
        EntityKind::Teacher,
        candidates
            .iter()
            .map(|c| c.teacher.as_str())
            .filter(|t| !t.is_empty()),
    );
}
