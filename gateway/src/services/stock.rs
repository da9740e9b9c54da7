//! Stock balances and per-warehouse availability snapshots

use std::collections::HashSet;
use std::sync::Arc;

use shared::{
    filter_list, paginate, validate_stock_input, EntityId, ListQuery, PaginatedResponse,
    StockBalance, StockInput, StockSnapshot,
};

use crate::error::AppResult;
use crate::external::ErpApiClient;
use crate::middleware::CurrentUser;
use crate::services::catalog::not_found;
use crate::services::{CatalogService, Stores};
use crate::AppState;

/// Stock service
#[derive(Clone)]
pub struct StockService {
    api: ErpApiClient,
    stores: Arc<Stores>,
    catalog: CatalogService,
    page_size: u32,
}

impl StockService {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            stores: state.stores.clone(),
            catalog: CatalogService::new(state),
            page_size: state.config.listing.page_size,
        }
    }

    /// Every balance record across all warehouses
    pub async fn all_stocks(&self, user: &CurrentUser) -> AppResult<Vec<StockBalance>> {
        self.stores
            .stocks
            .get_or_load(user.id(), || self.api.list_stocks(&user.token, None))
            .await
    }

    /// Balances filtered by warehouse and by the item search box
    pub async fn list_stocks(
        &self,
        user: &CurrentUser,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<StockBalance>> {
        let stocks = self.all_stocks(user).await?;
        let mut rows: Vec<StockBalance> = stocks
            .into_iter()
            .filter(|b| query.warehouse_id.map_or(true, |w| b.warehouse_id == w))
            .collect();

        if query.search.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            let items = self.catalog.all_items(user).await?;
            let item_query = ListQuery {
                search: query.search.clone(),
                ..ListQuery::default()
            };
            let matching: HashSet<EntityId> = filter_list(&items, &item_query)
                .into_iter()
                .map(|i| i.id)
                .collect();
            rows.retain(|b| matching.contains(&b.item_id));
        }

        Ok(paginate(&rows, query.page.unwrap_or(1), self.page_size))
    }

    pub async fn get_stock(&self, user: &CurrentUser, id: EntityId) -> AppResult<StockBalance> {
        if let Some(b) = self.stores.stocks.get(user.id(), id).await {
            return Ok(b);
        }
        self.api
            .get_stock(&user.token, id)
            .await
            .map_err(not_found("Stock"))
    }

    pub async fn create_stock(
        &self,
        user: &CurrentUser,
        input: StockInput,
    ) -> AppResult<StockBalance> {
        validate_stock_input(&input)?;
        let balance = self.api.create_stock(&user.token, &input).await?;
        tracing::info!(
            item_id = balance.item_id,
            warehouse_id = balance.warehouse_id,
            "Stock record created"
        );
        self.stores.invalidate_stock().await;
        Ok(balance)
    }

    pub async fn update_stock(
        &self,
        user: &CurrentUser,
        id: EntityId,
        input: StockInput,
    ) -> AppResult<StockBalance> {
        validate_stock_input(&input)?;
        let balance = self
            .api
            .update_stock(&user.token, id, &input)
            .await
            .map_err(not_found("Stock"))?;
        self.stores.stocks.upsert(user.id(), balance.clone()).await;
        self.stores.invalidate_stock().await;
        Ok(balance)
    }

    pub async fn delete_stock(&self, user: &CurrentUser, id: EntityId) -> AppResult<()> {
        self.api
            .delete_stock(&user.token, id)
            .await
            .map_err(not_found("Stock"))?;
        self.stores.stocks.remove(id).await;
        self.stores.invalidate_stock().await;
        Ok(())
    }

    /// Availability of one warehouse, taken once and reused until stock moves
    pub async fn snapshot(
        &self,
        user: &CurrentUser,
        warehouse_id: EntityId,
    ) -> AppResult<StockSnapshot> {
        self.stores
            .snapshots
            .get_or_load(user.id(), warehouse_id, || async {
                let balances = self.api.list_stocks(&user.token, Some(warehouse_id)).await?;
                let snapshot = StockSnapshot::from_balances(warehouse_id, &balances);
                tracing::debug!(warehouse_id, items = snapshot.available.len(), "Snapshot taken");
                Ok(snapshot)
            })
            .await
    }

    /// Snapshot if it can be had; a failure only disables the local pre-check
    pub async fn try_snapshot(
        &self,
        user: &CurrentUser,
        warehouse_id: EntityId,
    ) -> Option<StockSnapshot> {
        match self.snapshot(user, warehouse_id).await {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(warehouse_id, error = %e, "No snapshot, skipping local stock check");
                None
            }
        }
    }
}
