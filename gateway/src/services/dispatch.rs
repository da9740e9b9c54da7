//! Stock issue notes and delivery orders

use std::sync::Arc;

use shared::{
    list_page, validate_delivery_order, validate_issue_note, DeliveryOrder, DeliveryOrderInput,
    DocumentStatus, EntityId, IssueNoteInput, ListQuery, PaginatedResponse, StockCheckRequest,
    StockCheckResult, StockIssueNote,
};

use crate::error::AppResult;
use crate::external::ErpApiClient;
use crate::middleware::CurrentUser;
use crate::services::catalog::not_found;
use crate::services::{ensure_action, StockService, Stores};
use crate::AppState;

/// Dispatch service
#[derive(Clone)]
pub struct DispatchService {
    api: ErpApiClient,
    stores: Arc<Stores>,
    stock: StockService,
    page_size: u32,
}

impl DispatchService {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            stores: state.stores.clone(),
            stock: StockService::new(state),
            page_size: state.config.listing.page_size,
        }
    }

    // ------------------------------------------------------------------
    // Issue notes
    // ------------------------------------------------------------------

    pub async fn all_issue_notes(&self, user: &CurrentUser) -> AppResult<Vec<StockIssueNote>> {
        self.stores
            .issue_notes
            .get_or_load(user.id(), || self.api.list_issue_notes(&user.token))
            .await
    }

    pub async fn list_issue_notes(
        &self,
        user: &CurrentUser,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<StockIssueNote>> {
        let notes = self.all_issue_notes(user).await?;
        Ok(list_page(&notes, query, self.page_size))
    }

    pub async fn get_issue_note(
        &self,
        user: &CurrentUser,
        id: EntityId,
    ) -> AppResult<StockIssueNote> {
        if let Some(n) = self.stores.issue_notes.get(user.id(), id).await {
            return Ok(n);
        }
        let n = self
            .api
            .get_issue_note(&user.token, id)
            .await
            .map_err(not_found("Issue note"))?;
        self.stores.issue_notes.upsert(user.id(), n.clone()).await;
        Ok(n)
    }

    pub async fn create_issue_note(
        &self,
        user: &CurrentUser,
        input: IssueNoteInput,
    ) -> AppResult<StockIssueNote> {
        let snapshot = self.stock.try_snapshot(user, input.warehouse_id).await;
        validate_issue_note(&input, snapshot.as_ref())?;
        let n = self.api.create_issue_note(&user.token, &input).await?;
        tracing::info!(issue_note_id = n.id, warehouse_id = n.warehouse_id, "Issue note created");
        self.stores.issue_notes.upsert(user.id(), n.clone()).await;
        self.stores.issue_notes.invalidate_list().await;
        Ok(n)
    }

    pub async fn update_issue_note(
        &self,
        user: &CurrentUser,
        id: EntityId,
        input: IssueNoteInput,
    ) -> AppResult<StockIssueNote> {
        ensure_action(self.known_status(user, id).await, DocumentStatus::can_edit, "edit")?;
        let snapshot = self.stock.try_snapshot(user, input.warehouse_id).await;
        validate_issue_note(&input, snapshot.as_ref())?;
        let n = self
            .api
            .update_issue_note(&user.token, id, &input)
            .await
            .map_err(not_found("Issue note"))?;
        self.stores.issue_notes.upsert(user.id(), n.clone()).await;
        Ok(n)
    }

    pub async fn delete_issue_note(&self, user: &CurrentUser, id: EntityId) -> AppResult<()> {
        self.api
            .delete_issue_note(&user.token, id)
            .await
            .map_err(not_found("Issue note"))?;
        self.stores.issue_notes.remove(id).await;
        Ok(())
    }

    pub async fn submit_issue_note(
        &self,
        user: &CurrentUser,
        id: EntityId,
    ) -> AppResult<StockIssueNote> {
        ensure_action(self.known_status(user, id).await, DocumentStatus::can_submit, "submit")?;
        let n = self
            .api
            .submit_issue_note(&user.token, id)
            .await
            .map_err(not_found("Issue note"))?;
        tracing::info!(issue_note_id = id, status = %n.status, "Issue note submitted");
        self.stores.issue_notes.upsert(user.id(), n.clone()).await;
        Ok(n)
    }

    /// Approval releases the stock, so balances are stale afterwards
    pub async fn approve_issue_note(
        &self,
        user: &CurrentUser,
        id: EntityId,
    ) -> AppResult<StockIssueNote> {
        ensure_action(self.known_status(user, id).await, DocumentStatus::can_approve, "approve")?;
        let n = self
            .api
            .approve_issue_note(&user.token, id)
            .await
            .map_err(not_found("Issue note"))?;
        tracing::info!(issue_note_id = id, "Issue note approved");
        self.stores.issue_notes.upsert(user.id(), n.clone()).await;
        self.stores.invalidate_stock().await;
        Ok(n)
    }

    /// Availability check; a shortage visible locally is answered without a round trip
    pub async fn check_stock(
        &self,
        user: &CurrentUser,
        request: StockCheckRequest,
    ) -> AppResult<StockCheckResult> {
        if let Some(snapshot) = self.stock.try_snapshot(user, request.warehouse_id).await {
            let local = StockCheckResult::from_snapshot(&snapshot, &request.lines);
            if !local.all_available {
                return Ok(local);
            }
        }
        self.api.check_stock(&user.token, &request).await
    }

    async fn known_status(&self, user: &CurrentUser, id: EntityId) -> Option<DocumentStatus> {
        self.stores.issue_notes.get(user.id(), id).await.map(|n| n.status)
    }

    // ------------------------------------------------------------------
    // Delivery orders
    // ------------------------------------------------------------------

    pub async fn list_delivery_orders(
        &self,
        user: &CurrentUser,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<DeliveryOrder>> {
        let orders = self
            .stores
            .delivery_orders
            .get_or_load(user.id(), || self.api.list_delivery_orders(&user.token))
            .await?;
        Ok(list_page(&orders, query, self.page_size))
    }

    pub async fn get_delivery_order(
        &self,
        user: &CurrentUser,
        id: EntityId,
    ) -> AppResult<DeliveryOrder> {
        if let Some(d) = self.stores.delivery_orders.get(user.id(), id).await {
            return Ok(d);
        }
        let d = self
            .api
            .get_delivery_order(&user.token, id)
            .await
            .map_err(not_found("Delivery order"))?;
        self.stores.delivery_orders.upsert(user.id(), d.clone()).await;
        Ok(d)
    }

    pub async fn create_delivery_order(
        &self,
        user: &CurrentUser,
        input: DeliveryOrderInput,
    ) -> AppResult<DeliveryOrder> {
        validate_delivery_order(&input)?;
        let d = self.api.create_delivery_order(&user.token, &input).await?;
        tracing::info!(delivery_order_id = d.id, "Delivery order created");
        self.remember_delivery(user, d.clone()).await;
        Ok(d)
    }

    pub async fn update_delivery_order(
        &self,
        user: &CurrentUser,
        id: EntityId,
        input: DeliveryOrderInput,
    ) -> AppResult<DeliveryOrder> {
        validate_delivery_order(&input)?;
        let known = self
            .stores
            .delivery_orders
            .get(user.id(), id)
            .await
            .map(|d| d.status);
        ensure_action(known, DocumentStatus::can_edit, "edit")?;
        let d = self
            .api
            .update_delivery_order(&user.token, id, &input)
            .await
            .map_err(not_found("Delivery order"))?;
        self.stores.delivery_orders.upsert(user.id(), d.clone()).await;
        Ok(d)
    }

    pub async fn delete_delivery_order(&self, user: &CurrentUser, id: EntityId) -> AppResult<()> {
        self.api
            .delete_delivery_order(&user.token, id)
            .await
            .map_err(not_found("Delivery order"))?;
        self.stores.delivery_orders.remove(id).await;
        Ok(())
    }

    pub async fn delivery_from_issue_note(
        &self,
        user: &CurrentUser,
        issue_note_id: EntityId,
    ) -> AppResult<DeliveryOrder> {
        let d = self
            .api
            .delivery_order_from_issue_note(&user.token, issue_note_id)
            .await
            .map_err(not_found("Issue note"))?;
        tracing::info!(delivery_order_id = d.id, issue_note_id, "Delivery order created from issue note");
        self.remember_delivery(user, d.clone()).await;
        Ok(d)
    }

    async fn remember_delivery(&self, user: &CurrentUser, order: DeliveryOrder) {
        self.stores.delivery_orders.upsert(user.id(), order).await;
        self.stores.delivery_orders.invalidate_list().await;
    }
}
