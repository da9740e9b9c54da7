//! Periodic stock report, dashboard metrics and CSV export

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{periodic_report, EntityId, Notice, PeriodicReport, ReportOptions};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{
    cancellable, settle, CatalogService, DispatchService, ReceivingService, StockService,
};
use crate::AppState;

/// Periodic report together with the notices of sources that failed
#[derive(Debug, Serialize)]
pub struct PeriodicReportResponse {
    #[serde(flatten)]
    pub report: PeriodicReport,
    pub notices: Vec<Notice>,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub item_count: usize,
    pub active_warehouses: usize,
    pub below_minimum: usize,
    pub pending_grns: usize,
    pub pending_issue_notes: usize,
    pub total_stock_value: Decimal,
    pub notices: Vec<Notice>,
}

/// Filters accepted by the periodic report
#[derive(Debug, Clone, Default)]
pub struct PeriodicFilter {
    pub warehouse_id: Option<EntityId>,
    pub stagnant_days: Option<i64>,
    pub as_of: Option<NaiveDate>,
}

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    catalog: CatalogService,
    stock: StockService,
    receiving: ReceivingService,
    dispatch: DispatchService,
    stagnant_days: i64,
    shutdown: CancellationToken,
}

impl ReportingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: CatalogService::new(state),
            stock: StockService::new(state),
            receiving: ReceivingService::new(state),
            dispatch: DispatchService::new(state),
            stagnant_days: state.config.reports.stagnant_days,
            shutdown: state.shutdown.clone(),
        }
    }

    pub async fn periodic(
        &self,
        user: &CurrentUser,
        filter: &PeriodicFilter,
    ) -> AppResult<PeriodicReportResponse> {
        let cancel = self.shutdown.child_token();
        let (balances, items) = cancellable(&cancel, async {
            tokio::join!(self.stock.all_stocks(user), self.catalog.all_items(user))
        })
        .await?;

        let mut notices = Vec::new();
        let balances = settle("stocks", balances, &mut notices);
        let items = settle("items", items, &mut notices);

        let options = ReportOptions {
            warehouse_id: filter.warehouse_id,
            stagnant_days: filter.stagnant_days.unwrap_or(self.stagnant_days),
            as_of: filter.as_of.unwrap_or_else(|| Utc::now().date_naive()),
        };
        let report = periodic_report(&balances, &items, &options);
        tracing::info!(
            rows = report.rows.len(),
            warehouse_id = ?options.warehouse_id,
            "Periodic report computed"
        );

        Ok(PeriodicReportResponse { report, notices })
    }

    pub async fn dashboard(&self, user: &CurrentUser) -> AppResult<DashboardMetrics> {
        let cancel = self.shutdown.child_token();
        let (items, warehouses, balances, grns, issue_notes) = cancellable(&cancel, async {
            tokio::join!(
                self.catalog.all_items(user),
                self.catalog.all_warehouses(user),
                self.stock.all_stocks(user),
                self.receiving.all_grns(user),
                self.dispatch.all_issue_notes(user),
            )
        })
        .await?;

        let mut notices = Vec::new();
        let items = settle("items", items, &mut notices);
        let warehouses = settle("warehouses", warehouses, &mut notices);
        let balances = settle("stocks", balances, &mut notices);
        let grns = settle("grn", grns, &mut notices);
        let issue_notes = settle("issue-notes", issue_notes, &mut notices);

        let stock = periodic_report(
            &balances,
            &items,
            &ReportOptions::new(Utc::now().date_naive()),
        );

        Ok(DashboardMetrics {
            item_count: items.iter().filter(|i| i.is_active).count(),
            active_warehouses: warehouses.iter().filter(|w| w.is_active).count(),
            below_minimum: stock.summary.below_minimum,
            pending_grns: grns.iter().filter(|g| g.status.is_open()).count(),
            pending_issue_notes: issue_notes.iter().filter(|n| n.status.is_open()).count(),
            total_stock_value: stock.summary.total_value,
            notices,
        })
    }

    /// Export report rows as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
