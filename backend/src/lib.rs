//! # Timetable Cache
//!
//! Turns weekly timetable documents into per-group and per-teacher day
//! schedules and keeps them in an incrementally refreshed in-memory cache.
//!
//! ## Features
//!
//! - **Parsing**: Tolerant row-level parsing of the weekly XML documents
//! - **Resolution**: One authoritative lesson per timetable cell, with
//!   replacements, cancellations and streams resolved
//! - **Caching**: Hash-gated refresh and atomic per-week republication
//! - **Calendar**: Academic week number and numerator/denominator parity
//! - **HTTP API**: REST endpoints for the timetable frontend
//!
//! ## Architecture
//!
//! - [`api`]: Shared types for resolved schedules and API responses
//! - [`models`]: Source document parsing and the academic calendar
//! - [`services`]: Aggregation, conflict resolution, refresh and lookups
//! - [`db`]: In-memory cache, entity registry and content checksums
//! - [`source`]: Providers of raw weekly documents
//! - [`config`]: TOML configuration
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod source;

#[cfg(feature = "http-server")]
pub mod http;
