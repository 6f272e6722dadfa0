/// Analytics endpoints
///
/// - `GET /api/analytics/tasks` - Per-day completions over a date range
/// - `GET /api/analytics/daily-completions` - Chart series for the last N days
/// - `GET /api/analytics/focus` - Focus session totals
/// - `GET /api/analytics/streak` - Current and longest completion streak
///
/// Days are UTC calendar days, the same days completions are counted on.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiQuery,
    middleware::auth::CurrentUser,
};
use axum::{
    extract::State,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use swamp_shared::{
    analytics::{daily_counts, daily_series, streaks, DailyCount, DailySeries, DateRange, Streaks},
    models::{daily_stats::DailyTaskStats, focus_session::FocusSession},
};

/// Range used when `start_date` is omitted
const DEFAULT_RANGE_DAYS: i64 = 30;
const DEFAULT_SERIES_DAYS: i64 = 7;
const MAX_SERIES_DAYS: i64 = 90;

#[derive(Debug, Deserialize)]
pub struct TaskStatsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TaskStatsQuery {
    fn range(&self, today: NaiveDate) -> ApiResult<DateRange> {
        let end = self.end_date.unwrap_or(today);
        let range = match self.start_date {
            Some(start) => DateRange::new(start, end)?,
            None => DateRange::last_days(end, DEFAULT_RANGE_DAYS)?,
        };

        Ok(range)
    }
}

#[derive(Debug, Serialize)]
pub struct TaskStatsResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_completed: i64,
    pub total_focus_sessions: i64,
    pub daily: Vec<DailyCount>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub days: Option<i64>,
}

impl SeriesQuery {
    fn days(&self) -> ApiResult<i64> {
        let days = self.days.unwrap_or(DEFAULT_SERIES_DAYS);
        if !(1..=MAX_SERIES_DAYS).contains(&days) {
            return Err(ApiError::BadRequest("days must be between 1 and 90".to_string()));
        }
        Ok(days)
    }
}

#[derive(Debug, Serialize)]
pub struct FocusStatsResponse {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub total_focus_minutes: i64,
    pub average_session_minutes: f64,
}

/// Per-day completions between `start_date` and `end_date` inclusive
///
/// # Errors
///
/// - `400 Bad Request`: start after end, or more than 366 days
pub async fn task_stats(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TaskStatsQuery>,
    current: CurrentUser,
) -> ApiResult<Json<TaskStatsResponse>> {
    let range = query.range(Utc::now().date_naive())?;

    let stats = DailyTaskStats::list_range(&state.db, current.id(), range.start, range.end).await?;
    let daily = daily_counts(&range, &stats);

    Ok(Json(TaskStatsResponse {
        start_date: range.start,
        end_date: range.end,
        total_completed: daily.iter().map(|d| i64::from(d.tasks_completed)).sum(),
        total_focus_sessions: daily.iter().map(|d| i64::from(d.focus_sessions_completed)).sum(),
        daily,
    }))
}

pub async fn daily_completions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SeriesQuery>,
    current: CurrentUser,
) -> ApiResult<Json<DailySeries>> {
    let range = DateRange::last_days(Utc::now().date_naive(), query.days()?)?;

    let stats = DailyTaskStats::list_range(&state.db, current.id(), range.start, range.end).await?;

    Ok(Json(daily_series(&range, &stats)))
}

pub async fn focus_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<FocusStatsResponse>> {
    let summary = FocusSession::summary(&state.db, current.id()).await?;

    Ok(Json(FocusStatsResponse {
        average_session_minutes: summary.average_session_minutes(),
        total_sessions: summary.total_sessions,
        completed_sessions: summary.completed_sessions,
        total_focus_minutes: summary.total_focus_minutes,
    }))
}

pub async fn streak(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Streaks>> {
    let dates = DailyTaskStats::active_dates(&state.db, current.id()).await?;

    Ok(Json(streaks(&dates, Utc::now().date_naive())))
}
