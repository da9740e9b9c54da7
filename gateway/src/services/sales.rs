//! Sales orders

use std::sync::Arc;

use shared::{
    list_page, validate_sales_order, CreditCheck, DocumentStatus, EntityId, ListQuery,
    PaginatedResponse, SalesOrder, SalesOrderInput,
};

use crate::error::AppResult;
use crate::external::ErpApiClient;
use crate::middleware::CurrentUser;
use crate::services::catalog::not_found;
use crate::services::{ensure_action, Stores};
use crate::AppState;

/// Sales service
#[derive(Clone)]
pub struct SalesService {
    api: ErpApiClient,
    stores: Arc<Stores>,
    page_size: u32,
}

impl SalesService {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            stores: state.stores.clone(),
            page_size: state.config.listing.page_size,
        }
    }

    pub async fn list_orders(
        &self,
        user: &CurrentUser,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<SalesOrder>> {
        let orders = self
            .stores
            .sales_orders
            .get_or_load(user.id(), || self.api.list_sales_orders(&user.token))
            .await?;
        Ok(list_page(&orders, query, self.page_size))
    }

    pub async fn get_order(&self, user: &CurrentUser, id: EntityId) -> AppResult<SalesOrder> {
        if let Some(o) = self.stores.sales_orders.get(user.id(), id).await {
            return Ok(o);
        }
        let o = self
            .api
            .get_sales_order(&user.token, id)
            .await
            .map_err(not_found("Sales order"))?;
        self.stores.sales_orders.upsert(user.id(), o.clone()).await;
        Ok(o)
    }

    pub async fn create_order(
        &self,
        user: &CurrentUser,
        input: SalesOrderInput,
    ) -> AppResult<SalesOrder> {
        validate_sales_order(&input)?;
        let o = self.api.create_sales_order(&user.token, &input).await?;
        tracing::info!(order_id = o.id, total = %o.total(), "Sales order created");
        self.remember(user, o.clone()).await;
        Ok(o)
    }

    pub async fn update_order(
        &self,
        user: &CurrentUser,
        id: EntityId,
        input: SalesOrderInput,
    ) -> AppResult<SalesOrder> {
        validate_sales_order(&input)?;
        let known = self
            .stores
            .sales_orders
            .get(user.id(), id)
            .await
            .map(|o| o.status);
        ensure_action(known, DocumentStatus::can_edit, "edit")?;
        let o = self
            .api
            .update_sales_order(&user.token, id, &input)
            .await
            .map_err(not_found("Sales order"))?;
        self.stores.sales_orders.upsert(user.id(), o.clone()).await;
        Ok(o)
    }

    pub async fn delete_order(&self, user: &CurrentUser, id: EntityId) -> AppResult<()> {
        self.api
            .delete_sales_order(&user.token, id)
            .await
            .map_err(not_found("Sales order"))?;
        self.stores.sales_orders.remove(id).await;
        Ok(())
    }

    /// Ask the backend whether the customer's credit covers the order
    pub async fn check_credit(&self, user: &CurrentUser, id: EntityId) -> AppResult<CreditCheck> {
        let check = self
            .api
            .check_credit(&user.token, id)
            .await
            .map_err(not_found("Sales order"))?;
        if !check.within_limit {
            tracing::info!(
                order_id = id,
                available = %check.available_credit(),
                "Order exceeds customer credit"
            );
        }
        Ok(check)
    }

    pub async fn from_quotation(
        &self,
        user: &CurrentUser,
        quotation_id: EntityId,
    ) -> AppResult<SalesOrder> {
        let o = self
            .api
            .sales_order_from_quotation(&user.token, quotation_id)
            .await
            .map_err(not_found("Quotation"))?;
        tracing::info!(order_id = o.id, quotation_id, "Sales order created from quotation");
        self.remember(user, o.clone()).await;
        Ok(o)
    }

    async fn remember(&self, user: &CurrentUser, order: SalesOrder) {
        self.stores.sales_orders.upsert(user.id(), order).await;
        self.stores.sales_orders.invalidate_list().await;
    }
}
