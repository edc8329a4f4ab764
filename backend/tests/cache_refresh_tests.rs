mod support;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use support::{document, document_with_raw, MockSource, Row};
use timetable_cache::api::{DaySpan, EntityKind, WeekId};
use timetable_cache::config::SourceSettings;
use timetable_cache::db::{EntityRegistry, ScheduleCache};
use timetable_cache::source::DocumentSource;
use timetable_cache::services::{
    lookup, RefreshError, RefreshOutcome, RefreshState, RefreshTracker, Refresher,
};

fn settings(last_week: u32) -> SourceSettings {
    SourceSettings {
        first_week: 1,
        last_week,
        fetch_delay_ms: 0,
        ..SourceSettings::default()
    }
}

fn refresher(source: Arc<MockSource>, last_week: u32) -> Refresher {
    Refresher::new(
        source,
        Arc::new(ScheduleCache::new()),
        Arc::new(EntityRegistry::new()),
        RefreshTracker::new(),
        settings(last_week),
    )
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

#[tokio::test]
async fn test_identical_content_is_not_reprocessed() {
    let source = Arc::new(MockSource::new());
    source.serve(
        1,
        document(&[Row::new("2024-09-02", 1, "Физика", "Иванов").groups(&["101"])]),
    );
    let refresher = refresher(Arc::clone(&source), 1);

    refresher.run_sweep().await;
    let first = refresher.cache().entry(WeekId(1)).unwrap();

    let summary = refresher.run_sweep().await;
    assert_eq!(summary.unchanged, 1);
    let second = refresher.cache().entry(WeekId(1)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.calls(), 2);
    assert_eq!(
        refresher.tracker().week(WeekId(1)).unwrap().state,
        RefreshState::Unchanged
    );
}

#[tokio::test]
async fn test_changed_content_is_republished() {
    let source = Arc::new(MockSource::new());
    source.serve(
        1,
        document(&[Row::new("2024-09-02", 1, "Физика", "Иванов").groups(&["101"])]),
    );
    let refresher = refresher(Arc::clone(&source), 1);
    refresher.run_sweep().await;
    let before = refresher.cache().entry(WeekId(1)).unwrap();

    source.serve(
        1,
        document(&[
            Row::new("2024-09-02", 1, "Физика", "Иванов").groups(&["101"]),
            Row::new("2024-09-02", 1, "Химия", "Петров").groups(&["101"]).replacement(),
        ]),
    );
    let outcome = refresher.refresh_week(WeekId(1)).await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Updated { records: 2 });

    let after = refresher.cache().entry(WeekId(1)).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_ne!(before.checksum, after.checksum);

    let found = lookup::lookup_day(refresher.cache(), EntityKind::Group, "101", monday());
    let lesson = &found.schedule.unwrap().lessons[0];
    assert_eq!(lesson.subject, "Химия");
    assert_eq!(lesson.original_subject.as_deref(), Some("Физика"));

    // Readers holding the old generation still see it intact.
    assert_eq!(
        before.views.groups.day("101", monday()).unwrap().lessons[0].subject,
        "Физика"
    );
}

#[tokio::test]
async fn test_failed_week_keeps_previous_entry() {
    let source = Arc::new(MockSource::new());
    source.serve(
        2,
        document(&[Row::new("2024-09-09", 1, "Физика", "Иванов").groups(&["101"])]),
    );
    let refresher = refresher(Arc::clone(&source), 3);

    let summary = refresher.run_sweep().await;
    assert_eq!((summary.updated, summary.failed), (1, 2));
    let kept = refresher.cache().entry(WeekId(2)).unwrap();

    source.fail(2, 503);
    let result = refresher.refresh_week(WeekId(2)).await;
    assert!(matches!(result, Err(RefreshError::Source(_))));
    assert!(Arc::ptr_eq(&kept, &refresher.cache().entry(WeekId(2)).unwrap()));
    assert_eq!(refresher.cache().len(), 1);
}

#[tokio::test]
async fn test_malformed_document_is_retried() {
    let source = Arc::new(MockSource::new());
    source.serve(1, b"<root><My><DAT>2024-09-02".to_vec());
    let refresher = refresher(Arc::clone(&source), 1);

    let summary = refresher.run_sweep().await;
    assert_eq!(summary.failed, 1);
    assert!(refresher.cache().checksum(WeekId(1)).is_none());
    assert!(refresher.tracker().week(WeekId(1)).unwrap().message.is_some());

    source.serve(
        1,
        document(&[Row::new("2024-09-02", 1, "Физика", "Иванов").groups(&["101"])]),
    );
    let summary = refresher.run_sweep().await;
    assert_eq!(summary.updated, 1);
}

#[tokio::test]
async fn test_week_with_broken_row_is_published() {
    let source = Arc::new(MockSource::new());
    source.serve(
        1,
        document_with_raw(
            &[Row::new("2024-09-02", 1, "Физика", "Иванов").groups(&["101"])],
            "<My><DAT>2024-09-02</DAT><DAT>2024-09-03</DAT><UR>2</UR></My>",
        ),
    );
    let refresher = refresher(Arc::clone(&source), 1);

    let outcome = refresher.refresh_week(WeekId(1)).await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Updated { records: 1 });

    let found = lookup::lookup_day(refresher.cache(), EntityKind::Group, "101", monday());
    let day = found.schedule.unwrap();
    assert_eq!(day.lessons.len(), 1);
    assert_eq!(day.lessons[0].subject, "Физика");
}

#[tokio::test]
async fn test_lookup_first_match_and_active_days_across_weeks() {
    let source = Arc::new(MockSource::new());
    source.serve(
        1,
        document(&[
            Row::new("2024-09-02", 1, "Неделя 1", "Иванов").groups(&["101"]),
            Row::new("2024-09-04", 1, "Неделя 1", "Иванов").groups(&["101"]),
        ]),
    );
    source.serve(
        2,
        document(&[
            Row::new("2024-09-02", 1, "Неделя 2", "Иванов").groups(&["101"]),
            Row::new("2024-10-01", 1, "Неделя 2", "Иванов").groups(&["101"]),
        ]),
    );
    let refresher = refresher(Arc::clone(&source), 2);
    refresher.run_sweep().await;
    let cache = refresher.cache();

    let found = lookup::lookup_day(cache, EntityKind::Teacher, "Иванов", monday());
    assert_eq!(found.schedule.unwrap().lessons[0].subject, "Неделя 1");

    let september = DaySpan::parse_month("2024-09").unwrap();
    assert_eq!(
        lookup::active_days(cache, EntityKind::Group, "101", &september),
        vec![monday(), NaiveDate::from_ymd_opt(2024, 9, 4).unwrap()]
    );
    let range = DaySpan::Range {
        start: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
    };
    assert_eq!(
        lookup::active_days(cache, EntityKind::Group, "101", &range).len(),
        2
    );
}

#[tokio::test]
async fn test_spawned_loop_keeps_sweeping() {
    let source = Arc::new(MockSource::new());
    source.serve(
        1,
        document(&[Row::new("2024-09-02", 1, "Физика", "Иванов").groups(&["101"])]),
    );
    let refresher = Arc::new(Refresher::new(
        Arc::clone(&source) as Arc<dyn DocumentSource>,
        Arc::new(ScheduleCache::new()),
        Arc::new(EntityRegistry::new()),
        RefreshTracker::new(),
        SourceSettings {
            sweep_interval_secs: 0,
            ..settings(1)
        },
    ));

    let handle = Arc::clone(&refresher).spawn();
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while source.calls() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    handle.abort();

    assert!(waited.is_ok());
    assert!(refresher.cache().entry(WeekId(1)).is_some());
    assert!(refresher.tracker().last_sweep().is_some());
}
