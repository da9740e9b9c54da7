//! Reporting handlers: dual valuation, periodic report, dashboard

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::EntityId;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardMetrics, PeriodicFilter};
use crate::services::{ReportingService, ValuationService};
use crate::AppState;

#[derive(Deserialize)]
pub struct ValuationQuery {
    /// Alert threshold override for this report, e.g. `0.2`
    pub threshold: Option<Decimal>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Deserialize)]
pub struct PeriodicQuery {
    pub warehouse_id: Option<EntityId>,
    pub stagnant_days: Option<i64>,
    pub as_of: Option<NaiveDate>,
    pub format: Option<String>,
}

fn csv_response<T: Serialize>(rows: &[T], filename: &str) -> AppResult<Response> {
    let csv = ReportingService::export_to_csv(rows)?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// Dual valuation report
pub async fn get_dual_valuation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ValuationQuery>,
) -> AppResult<Response> {
    let service = ValuationService::new(&state).with_threshold(query.threshold)?;
    let report = service.report(&current_user).await?;

    if query.format.as_deref() == Some("csv") {
        csv_response(&report.rows, "dual_valuation.csv")
    } else {
        Ok(Json(report).into_response())
    }
}

/// Periodic stock status report
pub async fn get_periodic_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PeriodicQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(&state);
    let filter = PeriodicFilter {
        warehouse_id: query.warehouse_id,
        stagnant_days: query.stagnant_days,
        as_of: query.as_of,
    };
    let response = service.periodic(&current_user, &filter).await?;

    if query.format.as_deref() == Some("csv") {
        csv_response(&response.report.rows, "periodic_report.csv")
    } else {
        Ok(Json(response).into_response())
    }
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(&state);
    Ok(Json(service.dashboard(&current_user).await?))
}
