//! Service layer: the resolution pipeline, the refresh loop and read queries.
//!
//! ```text
//! bytes ─► models::record ─► aggregator ─► resolver ─► index_builder ─► db::cache
//!                                                                          ▲
//!                               refresh (fetch, hash, publish) ────────────┘
//! ```

pub mod aggregator;
pub mod index_builder;
pub mod lookup;
pub mod refresh;
pub mod refresh_tracker;
pub mod resolver;

pub use index_builder::{build_views, build_week_views, BuildReport};
pub use lookup::{active_days, known_names, lookup_day, DayLookup};
pub use refresh::{RefreshError, RefreshOutcome, Refresher};
pub use refresh_tracker::{RefreshState, RefreshTracker, SweepSummary, WeekStatus};
