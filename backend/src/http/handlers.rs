//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to
//! [`crate::services::lookup`].

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use super::dto::{
    select_entity, ActiveDaysResponse, DayQuery, DayResponse, GroupSearchResponse,
    HealthResponse, MonthQuery, RangeQuery, RefreshStatusResponse, SearchQuery,
    TeacherSearchResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{DaySpan, EntityKind};
use crate::services::lookup::{self, MIN_QUERY_CHARS};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type QueryResult<T> = Result<Query<T>, QueryRejection>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        weeks_cached: state.cache.len(),
    }))
}

// =============================================================================
// Schedule
// =============================================================================

/// GET /api/schedule/day
///
/// Schedule of a group or teacher on one date. A miss is not an error.
pub async fn get_day_schedule(
    State(state): State<AppState>,
    query: QueryResult<DayQuery>,
) -> HandlerResult<DayResponse> {
    let Query(query) = query?;
    let (kind, key) = select_entity(query.group.as_deref(), query.teacher.as_deref())
        .ok_or_else(|| AppError::BadRequest("Group or teacher required".to_string()))?;

    let found = lookup::lookup_day(&state.cache, kind, key, query.date);
    Ok(Json(found.into()))
}

// =============================================================================
// Calendar Metadata
// =============================================================================

/// GET /api/meta/active_days
///
/// Dates in a `YYYY-MM` month on which the entity has lessons.
pub async fn get_active_days(
    State(state): State<AppState>,
    query: QueryResult<MonthQuery>,
) -> HandlerResult<ActiveDaysResponse> {
    let Query(query) = query?;
    let span = DaySpan::parse_month(&query.month).map_err(AppError::BadRequest)?;
    Ok(Json(active_days_for(
        &state,
        query.group.as_deref(),
        query.teacher.as_deref(),
        &span,
    )))
}

/// GET /api/meta/active_days_range
///
/// Dates in an inclusive range on which the entity has lessons.
pub async fn get_active_days_range(
    State(state): State<AppState>,
    query: QueryResult<RangeQuery>,
) -> HandlerResult<ActiveDaysResponse> {
    let Query(query) = query?;
    let span = DaySpan::Range {
        start: query.start_date,
        end: query.end_date,
    };
    Ok(Json(active_days_for(
        &state,
        query.group.as_deref(),
        query.teacher.as_deref(),
        &span,
    )))
}

fn active_days_for(
    state: &AppState,
    group: Option<&str>,
    teacher: Option<&str>,
    span: &DaySpan,
) -> ActiveDaysResponse {
    let active_days = match select_entity(group, teacher) {
        Some((kind, key)) => lookup::active_days(&state.cache, kind, key, span),
        None => Vec::new(),
    };
    ActiveDaysResponse { active_days }
}

/// GET /api/meta/refresh_status
pub async fn get_refresh_status(
    State(state): State<AppState>,
) -> HandlerResult<RefreshStatusResponse> {
    let last = state.tracker.last_sweep();
    Ok(Json(RefreshStatusResponse {
        last_sweep_at: last.map(|(at, _)| at),
        last_sweep: last.map(|(_, summary)| summary),
        weeks: state.tracker.weeks(),
    }))
}

// =============================================================================
// Search
// =============================================================================

fn search(state: &AppState, kind: EntityKind, query: &str) -> Result<Vec<String>, AppError> {
    if !lookup::is_valid_query(query) {
        return Err(AppError::BadRequest(format!(
            "query must be at least {} characters",
            MIN_QUERY_CHARS
        )));
    }
    Ok(lookup::known_names(&state.registry, kind, query))
}

/// GET /api/groups/search
pub async fn search_groups(
    State(state): State<AppState>,
    query: QueryResult<SearchQuery>,
) -> HandlerResult<GroupSearchResponse> {
    let Query(query) = query?;
    let groups = search(&state, EntityKind::Group, &query.query)?;
    Ok(Json(GroupSearchResponse { groups }))
}

/// GET /api/teachers/search
pub async fn search_teachers(
    State(state): State<AppState>,
    query: QueryResult<SearchQuery>,
) -> HandlerResult<TeacherSearchResponse> {
    let Query(query) = query?;
    let teachers = search(&state, EntityKind::Teacher, &query.query)?;
    Ok(Json(TeacherSearchResponse { teachers }))
}
