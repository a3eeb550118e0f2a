//! HTTP handlers for staff analytics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::AdminUser;
use crate::services::analytics::{MonthlyReport, SummaryReport};
use crate::AppState;

/// Query parameters for the monthly report
#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
}

/// Application counts by status and member type
pub async fn analytics_summary(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<SummaryReport>> {
    let report = state.analytics.summary().await?;
    Ok(Json(report))
}

/// Applications submitted per month
pub async fn analytics_monthly(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<MonthlyQuery>,
) -> AppResult<Json<MonthlyReport>> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let report = state.analytics.monthly(year).await?;
    Ok(Json(report))
}
