//! Dual inventory valuation
//!
//! Balances and the item master are fetched concurrently. A source that
//! fails is reported as a notice and treated as empty, so the report still
//! renders from whatever did arrive.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    dual_valuation, summarize, validate_alert_threshold, DualValuationRow, Notice,
    ValuationOptions, ValuationSummary,
};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{cancellable, settle, CatalogService, StockService};
use crate::AppState;

/// Dual valuation report as served to the screen
#[derive(Debug, Serialize)]
pub struct ValuationReport {
    pub generated_at: DateTime<Utc>,
    pub alert_threshold: Decimal,
    pub rows: Vec<DualValuationRow>,
    pub summary: ValuationSummary,
    pub notices: Vec<Notice>,
}

/// Valuation service
#[derive(Clone)]
pub struct ValuationService {
    catalog: CatalogService,
    stock: StockService,
    options: ValuationOptions,
    shutdown: CancellationToken,
}

impl ValuationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: CatalogService::new(state),
            stock: StockService::new(state),
            options: ValuationOptions {
                alert_threshold: state.config.valuation.alert_threshold,
            },
            shutdown: state.shutdown.clone(),
        }
    }

    /// Override the alert threshold for one report
    pub fn with_threshold(mut self, threshold: Option<Decimal>) -> AppResult<Self> {
        if let Some(t) = threshold {
            validate_alert_threshold(t).map_err(|m| AppError::Validation {
                field: "threshold".to_string(),
                message: m.to_string(),
            })?;
            self.options.alert_threshold = t;
        }
        Ok(self)
    }

    pub async fn report(&self, user: &CurrentUser) -> AppResult<ValuationReport> {
        let cancel = self.shutdown.child_token();
        let (balances, items) = cancellable(&cancel, async {
            tokio::join!(self.stock.all_stocks(user), self.catalog.all_items(user))
        })
        .await?;

        let mut notices = Vec::new();
        let balances = settle("stocks", balances, &mut notices);
        let items = settle("items", items, &mut notices);

        let rows = dual_valuation(&balances, &items, &self.options);
        let summary = summarize(&rows);
        tracing::info!(
            rows = summary.row_count,
            alerts = summary.alert_count,
            notices = notices.len(),
            "Dual valuation computed"
        );

        Ok(ValuationReport {
            generated_at: Utc::now(),
            alert_threshold: self.options.alert_threshold,
            rows,
            summary,
            notices,
        })
    }
}
