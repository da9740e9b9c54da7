//! Physical inventory counts
//!
//! A count sheet lists the system quantities of one warehouse. Submitted
//! counts are compared against it and each discrepancy is posted back as a
//! stock record update. Posting is line by line, not atomic: a failed line
//! is reported and the rest still go through.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    validate_stock_input, CountEntry, CountSheet, EntityId, Notice, StockBalance, StockInput,
};

use crate::error::{AppError, AppResult};
use crate::external::ErpApiClient;
use crate::middleware::CurrentUser;
use crate::services::{CatalogService, Stores};
use crate::AppState;

/// Outcome of applying a count
#[derive(Debug, Serialize)]
pub struct CountResult {
    pub sheet: CountSheet,
    /// Stock records updated to the counted quantity
    pub adjusted: Vec<EntityId>,
    pub net_variance_value: Decimal,
    pub notices: Vec<Notice>,
}

/// Counting service
#[derive(Clone)]
pub struct CountingService {
    api: ErpApiClient,
    stores: Arc<Stores>,
    catalog: CatalogService,
}

impl CountingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            stores: state.stores.clone(),
            catalog: CatalogService::new(state),
        }
    }

    async fn balances(
        &self,
        user: &CurrentUser,
        warehouse_id: EntityId,
    ) -> AppResult<Vec<StockBalance>> {
        self.api.list_stocks(&user.token, Some(warehouse_id)).await
    }

    /// Blank count sheet with the current system quantities
    pub async fn sheet(&self, user: &CurrentUser, warehouse_id: EntityId) -> AppResult<CountSheet> {
        let (balances, items) = tokio::join!(
            self.balances(user, warehouse_id),
            self.catalog.all_items(user)
        );
        let balances = balances?;
        // Item names are cosmetic on the sheet
        let items = items.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Count sheet without item names");
            Vec::new()
        });
        Ok(CountSheet::from_balances(warehouse_id, &balances, &items))
    }

    pub async fn apply(
        &self,
        user: &CurrentUser,
        warehouse_id: EntityId,
        entries: Vec<CountEntry>,
    ) -> AppResult<CountResult> {
        if let Some(bad) = entries.iter().position(|e| e.counted_quantity < Decimal::ZERO) {
            return Err(AppError::Validation {
                field: format!("entries[{}].counted_quantity", bad),
                message: "Counted quantity cannot be negative".to_string(),
            });
        }

        let balances = self.balances(user, warehouse_id).await?;
        let items = self.catalog.all_items(user).await.unwrap_or_default();
        let mut sheet = CountSheet::from_balances(warehouse_id, &balances, &items);

        let unknown = sheet.apply_counts(&entries);
        if let Some(id) = unknown.first() {
            return Err(AppError::Validation {
                field: "stock_id".to_string(),
                message: format!("Stock record {} is not in warehouse {}", id, warehouse_id),
            });
        }

        let by_id: HashMap<EntityId, &StockBalance> = balances
            .iter()
            .filter_map(|b| b.id.map(|id| (id, b)))
            .collect();

        let mut adjusted = Vec::new();
        let mut notices = Vec::new();
        for line in sheet.discrepancies() {
            let (Some(stock_id), Some(counted)) = (line.stock_id, line.counted_quantity) else {
                continue;
            };
            let Some(balance) = by_id.get(&stock_id) else {
                continue;
            };
            let input = StockInput {
                item_id: balance.item_id,
                warehouse_id: balance.warehouse_id,
                location_id: balance.location_id,
                quantity_on_hand: counted,
                average_cost: balance.average_cost,
                quantity_reserved: balance.quantity_reserved,
            };
            // A count below the reserved quantity cannot be posted as is
            if let Err(e) = validate_stock_input(&input) {
                tracing::warn!(stock_id, field = %e.field, "Count adjustment rejected");
                notices.push(Notice::save_failed(
                    &format!("stock {}", stock_id),
                    Some(&e.message),
                ));
                continue;
            }
            match self.api.update_stock(&user.token, stock_id, &input).await {
                Ok(_) => adjusted.push(stock_id),
                Err(e) => {
                    tracing::warn!(stock_id, error = %e, "Count adjustment failed");
                    notices.push(Notice::save_failed(
                        &format!("stock {}", stock_id),
                        e.upstream_message(),
                    ));
                }
            }
        }

        if !adjusted.is_empty() {
            self.stores.invalidate_stock().await;
        }
        tracing::info!(
            warehouse_id,
            adjusted = adjusted.len(),
            failed = notices.len(),
            "Count applied"
        );

        Ok(CountResult {
            net_variance_value: sheet.net_variance_value(),
            sheet,
            adjusted,
            notices,
        })
    }
}
