//! Background refresh of the schedule cache.
//!
//! A sweep walks the configured week range in order. For each week the raw
//! document is fetched and hashed; only a document whose hash differs from the
//! stored one is parsed and resolved (on the blocking pool), and the result is
//! published as a new cache generation. Any failure skips the week until the
//! next sweep.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::WeekId;
use crate::config::SourceSettings;
use crate::db::{calculate_checksum, CacheEntry, EntityRegistry, ScheduleCache};
use crate::models::DocumentError;
use crate::services::index_builder::build_week_views;
use crate::services::refresh_tracker::{RefreshState, RefreshTracker, SweepSummary};
use crate::source::{DocumentSource, SourceError};

/// Why a week could not be refreshed.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Failed to fetch document: {0}")]
    Source(#[from] SourceError),

    #[error("Failed to parse document: {0}")]
    Document(#[from] DocumentError),

    #[error("Index build task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result of refreshing one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new generation was published.
    Updated { records: usize },
    /// The document hash matched the stored one. Nothing was parsed.
    Unchanged,
}

/// Owns everything a sweep touches.
pub struct Refresher {
    source: Arc<dyn DocumentSource>,
    cache: Arc<ScheduleCache>,
    registry: Arc<EntityRegistry>,
    tracker: RefreshTracker,
    settings: SourceSettings,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        cache: Arc<ScheduleCache>,
        registry: Arc<EntityRegistry>,
        tracker: RefreshTracker,
        settings: SourceSettings,
    ) -> Self {
        Self {
            source,
            cache,
            registry,
            tracker,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<ScheduleCache> {
        &self.cache
    }

    pub fn tracker(&self) -> &RefreshTracker {
        &self.tracker
    }

    /// Fetch one week and republish it if its content changed.
    pub async fn refresh_week(&self, week: WeekId) -> Result<RefreshOutcome, RefreshError> {
        let document = self.source.fetch_week(week).await?;
        let checksum = calculate_checksum(&document);

        if self.cache.checksum(week).as_deref() == Some(checksum.as_str()) {
            log::debug!("Week {} unchanged ({})", week, checksum);
            return Ok(RefreshOutcome::Unchanged);
        }

        let registry = Arc::clone(&self.registry);
        let (views, report) =
            tokio::task::spawn_blocking(move || build_week_views(&document, &registry)).await??;

        match self
            .cache
            .publish_if_changed(CacheEntry::new(week, checksum, views))
        {
            Some(entry) => {
                log::info!(
                    "Week {} updated: {} records, {} groups, {} teachers (checksum {})",
                    week,
                    report.records,
                    report.groups,
                    report.teachers,
                    entry.checksum
                );
                Ok(RefreshOutcome::Updated {
                    records: report.records,
                })
            }
            // A concurrent refresh published the same content first.
            None => Ok(RefreshOutcome::Unchanged),
        }
    }

    /// Refresh every configured week once, in ascending order.
    pub async fn run_sweep(&self) -> SweepSummary {
        log::info!(
            "Checking for updates in weeks {}..={}",
            self.settings.first_week,
            self.settings.last_week
        );

        let delay = self.settings.fetch_delay();
        let mut summary = SweepSummary::default();

        for (i, week) in self.settings.weeks().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.refresh_week(week).await {
                Ok(RefreshOutcome::Updated { .. }) => {
                    summary.updated += 1;
                    self.tracker.record(week, RefreshState::Updated, None);
                }
                Ok(RefreshOutcome::Unchanged) => {
                    summary.unchanged += 1;
                    self.tracker.record(week, RefreshState::Unchanged, None);
                }
                Err(e) => {
                    log::warn!("Skipping week {}: {}", week, e);
                    summary.failed += 1;
                    self.tracker
                        .record(week, RefreshState::Failed, Some(e.to_string()));
                }
            }
        }

        log::info!(
            "Sweep done: {} updated, {} unchanged, {} failed",
            summary.updated,
            summary.unchanged,
            summary.failed
        );
        self.tracker.finish_sweep(summary);
        summary
    }

    /// Run sweeps forever, sleeping the configured interval between them.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                self.run_sweep().await;
                log::info!(
                    "Next sweep in {} s",
                    self.settings.sweep_interval().as_secs()
                );
                tokio::time::sleep(self.settings.sweep_interval()).await;
            }
        })
    }
}
