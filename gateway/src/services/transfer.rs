//! Stock transfers between warehouses

use std::sync::Arc;

use shared::{
    list_page, validate_transfer, EntityId, ListQuery, PaginatedResponse, Transfer, TransferInput,
};

use crate::error::AppResult;
use crate::external::ErpApiClient;
use crate::middleware::CurrentUser;
use crate::services::catalog::not_found;
use crate::services::{StockService, Stores};
use crate::AppState;

/// Transfer service
#[derive(Clone)]
pub struct TransferService {
    api: ErpApiClient,
    stores: Arc<Stores>,
    stock: StockService,
    page_size: u32,
}

impl TransferService {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            stores: state.stores.clone(),
            stock: StockService::new(state),
            page_size: state.config.listing.page_size,
        }
    }

    pub async fn list_transfers(
        &self,
        user: &CurrentUser,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<Transfer>> {
        let transfers = self
            .stores
            .transfers
            .get_or_load(user.id(), || self.api.list_transfers(&user.token))
            .await?;
        Ok(list_page(&transfers, query, self.page_size))
    }

    pub async fn get_transfer(&self, user: &CurrentUser, id: EntityId) -> AppResult<Transfer> {
        if let Some(t) = self.stores.transfers.get(user.id(), id).await {
            return Ok(t);
        }
        let t = self
            .api
            .get_transfer(&user.token, id)
            .await
            .map_err(not_found("Transfer"))?;
        self.stores.transfers.upsert(user.id(), t.clone()).await;
        Ok(t)
    }

    /// Create a transfer after checking the source warehouse can cover it
    pub async fn create_transfer(
        &self,
        user: &CurrentUser,
        input: TransferInput,
    ) -> AppResult<Transfer> {
        let snapshot = self.stock.try_snapshot(user, input.from_warehouse_id).await;
        validate_transfer(&input, snapshot.as_ref())?;

        let t = self.api.create_transfer(&user.token, &input).await?;
        tracing::info!(
            transfer_id = t.id,
            from = t.from_warehouse_id,
            to = t.to_warehouse_id,
            "Transfer created"
        );
        self.stores.transfers.upsert(user.id(), t.clone()).await;
        self.stores.transfers.invalidate_list().await;
        self.stores.invalidate_stock().await;
        Ok(t)
    }
}
