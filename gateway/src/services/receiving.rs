//! Goods receipt notes

use std::sync::Arc;

use shared::{
    list_page, validate_grn, DocumentStatus, EntityId, GoodsReceiptNote, GrnInput, ListQuery,
    PaginatedResponse,
};

use crate::error::AppResult;
use crate::external::ErpApiClient;
use crate::middleware::CurrentUser;
use crate::services::catalog::not_found;
use crate::services::{ensure_action, Stores};
use crate::AppState;

/// Receiving service
#[derive(Clone)]
pub struct ReceivingService {
    api: ErpApiClient,
    stores: Arc<Stores>,
    page_size: u32,
}

impl ReceivingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            stores: state.stores.clone(),
            page_size: state.config.listing.page_size,
        }
    }

    pub async fn all_grns(&self, user: &CurrentUser) -> AppResult<Vec<GoodsReceiptNote>> {
        self.stores
            .grns
            .get_or_load(user.id(), || self.api.list_grns(&user.token))
            .await
    }

    pub async fn list_grns(
        &self,
        user: &CurrentUser,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<GoodsReceiptNote>> {
        let grns = self.all_grns(user).await?;
        Ok(list_page(&grns, query, self.page_size))
    }

    pub async fn get_grn(&self, user: &CurrentUser, id: EntityId) -> AppResult<GoodsReceiptNote> {
        if let Some(grn) = self.stores.grns.get(user.id(), id).await {
            return Ok(grn);
        }
        let grn = self
            .api
            .get_grn(&user.token, id)
            .await
            .map_err(not_found("GRN"))?;
        self.stores.grns.upsert(user.id(), grn.clone()).await;
        Ok(grn)
    }

    pub async fn create_grn(
        &self,
        user: &CurrentUser,
        input: GrnInput,
    ) -> AppResult<GoodsReceiptNote> {
        validate_grn(&input)?;
        let grn = self.api.create_grn(&user.token, &input).await?;
        tracing::info!(grn_id = grn.id, number = %grn.grn_number, "GRN created");
        self.stores.grns.upsert(user.id(), grn.clone()).await;
        self.stores.grns.invalidate_list().await;
        Ok(grn)
    }

    pub async fn update_grn(
        &self,
        user: &CurrentUser,
        id: EntityId,
        input: GrnInput,
    ) -> AppResult<GoodsReceiptNote> {
        validate_grn(&input)?;
        ensure_action(self.known_status(user, id).await, DocumentStatus::can_edit, "edit")?;
        let grn = self
            .api
            .update_grn(&user.token, id, &input)
            .await
            .map_err(not_found("GRN"))?;
        self.stores.grns.upsert(user.id(), grn.clone()).await;
        Ok(grn)
    }

    pub async fn submit_grn(&self, user: &CurrentUser, id: EntityId) -> AppResult<GoodsReceiptNote> {
        ensure_action(self.known_status(user, id).await, DocumentStatus::can_submit, "submit")?;
        let grn = self
            .api
            .submit_grn(&user.token, id)
            .await
            .map_err(not_found("GRN"))?;
        tracing::info!(grn_id = id, status = %grn.status, "GRN submitted");
        self.stores.grns.upsert(user.id(), grn.clone()).await;
        Ok(grn)
    }

    /// Finalizing posts the receipt into stock
    pub async fn finalize_grn(
        &self,
        user: &CurrentUser,
        id: EntityId,
    ) -> AppResult<GoodsReceiptNote> {
        ensure_action(self.known_status(user, id).await, DocumentStatus::can_finalize, "finalize")?;
        let grn = self
            .api
            .finalize_grn(&user.token, id)
            .await
            .map_err(not_found("GRN"))?;
        tracing::info!(grn_id = id, value = %grn.total_value(), "GRN finalized");
        self.stores.grns.upsert(user.id(), grn.clone()).await;
        self.stores.invalidate_stock().await;
        Ok(grn)
    }

    async fn known_status(&self, user: &CurrentUser, id: EntityId) -> Option<DocumentStatus> {
        self.stores.grns.get(user.id(), id).await.map(|g| g.status)
    }
}
