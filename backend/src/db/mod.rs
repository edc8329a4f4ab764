//! In-memory storage for resolved timetables.
//!
//! Nothing here is persisted: every entry can be rebuilt from the source
//! documents, and a restarted process starts empty until the next sweep.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Readers (HTTP handlers, services::lookup)               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │ clone Arc<CacheEntry>, release lock
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  ScheduleCache (cache.rs)                                │
//! │  - one Arc<CacheEntry> per week                          │
//! │  - whole-entry swap on checksum change                   │
//! └───────────────────▲─────────────────────────────────────┘
//!                     │ publish_if_changed
//! ┌───────────────────┴─────────────────────────────────────┐
//! │  Refresh sweep (services::refresh)                       │
//! │  - checksum.rs gates rebuilds                            │
//! │  - registry.rs collects every observed name              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod checksum;
pub mod registry;

pub use cache::{CacheEntry, ScheduleCache};
pub use checksum::calculate_checksum;
pub use registry::{EntityRegistry, MAX_SEARCH_RESULTS};
