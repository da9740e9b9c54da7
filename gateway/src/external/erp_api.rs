//! REST client for the ERP backend
//!
//! Thin wrappers over the `/inventory/*` and `/sales/*` endpoints. The
//! caller's session token is forwarded on every call. There is no retry:
//! a failed call fails the user action that triggered it.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    CreditCheck, DeliveryOrder, DeliveryOrderInput, EntityId, GoodsReceiptNote, GrnInput,
    IssueNoteInput, Item, ItemInput, Location, LocationInput, SalesOrder, SalesOrderInput,
    StockBalance, StockCheckRequest, StockCheckResult, StockInput, StockIssueNote, Transfer,
    TransferInput, Warehouse, WarehouseInput,
};
use uuid::Uuid;

use super::envelope::{extract_message, unwrap_envelope};
use crate::error::{AppError, AppResult};

/// ERP backend client
#[derive(Clone)]
pub struct ErpApiClient {
    client: Client,
    base_url: String,
}

impl ErpApiClient {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header("X-Request-Id", Uuid::new_v4().to_string())
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "ERP request");

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "ERP request failed");
            AppError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            tracing::warn!(%method, %url, status = status.as_u16(), "ERP rejected request");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        unwrap_envelope(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> AppResult<T> {
        self.execute(self.request(Method::GET, path, token)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> AppResult<T> {
        self.execute(self.request(Method::POST, path, token).json(body))
            .await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str, token: &str) -> AppResult<T> {
        self.execute(self.request(Method::POST, path, token)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> AppResult<T> {
        self.execute(self.request(Method::PUT, path, token).json(body))
            .await
    }

    async fn delete(&self, path: &str, token: &str) -> AppResult<()> {
        // Body content of a delete is irrelevant as long as it is not an error
        let _: Value = self.execute(self.request(Method::DELETE, path, token)).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub async fn list_items(&self, token: &str) -> AppResult<Vec<Item>> {
        self.get("/inventory/items", token).await
    }

    pub async fn list_active_items(&self, token: &str) -> AppResult<Vec<Item>> {
        self.get("/inventory/items/active", token).await
    }

    pub async fn get_item(&self, token: &str, id: EntityId) -> AppResult<Item> {
        self.get(&format!("/inventory/items/{}", id), token).await
    }

    pub async fn create_item(&self, token: &str, input: &ItemInput) -> AppResult<Item> {
        self.post("/inventory/items", token, input).await
    }

    pub async fn update_item(&self, token: &str, id: EntityId, input: &ItemInput) -> AppResult<Item> {
        self.put(&format!("/inventory/items/{}", id), token, input).await
    }

    pub async fn delete_item(&self, token: &str, id: EntityId) -> AppResult<()> {
        self.delete(&format!("/inventory/items/{}", id), token).await
    }

    // ------------------------------------------------------------------
    // Stock balances
    // ------------------------------------------------------------------

    pub async fn list_stocks(
        &self,
        token: &str,
        warehouse_id: Option<EntityId>,
    ) -> AppResult<Vec<StockBalance>> {
        match warehouse_id {
            Some(w) => {
                self.get(&format!("/inventory/stocks?warehouseId={}", w), token)
                    .await
            }
            None => self.get("/inventory/stocks", token).await,
        }
    }

    pub async fn get_stock(&self, token: &str, id: EntityId) -> AppResult<StockBalance> {
        self.get(&format!("/inventory/stocks/{}", id), token).await
    }

    pub async fn create_stock(&self, token: &str, input: &StockInput) -> AppResult<StockBalance> {
        self.post("/inventory/stocks", token, input).await
    }

    pub async fn update_stock(
        &self,
        token: &str,
        id: EntityId,
        input: &StockInput,
    ) -> AppResult<StockBalance> {
        self.put(&format!("/inventory/stocks/{}", id), token, input).await
    }

    pub async fn delete_stock(&self, token: &str, id: EntityId) -> AppResult<()> {
        self.delete(&format!("/inventory/stocks/{}", id), token).await
    }

    // ------------------------------------------------------------------
    // Warehouses and locations
    // ------------------------------------------------------------------

    pub async fn list_warehouses(&self, token: &str) -> AppResult<Vec<Warehouse>> {
        self.get("/inventory/warehouses", token).await
    }

    pub async fn list_active_warehouses(&self, token: &str) -> AppResult<Vec<Warehouse>> {
        self.get("/inventory/warehouses/active", token).await
    }

    pub async fn get_warehouse(&self, token: &str, id: EntityId) -> AppResult<Warehouse> {
        self.get(&format!("/inventory/warehouses/{}", id), token).await
    }

    pub async fn create_warehouse(&self, token: &str, input: &WarehouseInput) -> AppResult<Warehouse> {
        self.post("/inventory/warehouses", token, input).await
    }

    pub async fn update_warehouse(
        &self,
        token: &str,
        id: EntityId,
        input: &WarehouseInput,
    ) -> AppResult<Warehouse> {
        self.put(&format!("/inventory/warehouses/{}", id), token, input)
            .await
    }

    pub async fn list_locations(&self, token: &str) -> AppResult<Vec<Location>> {
        self.get("/inventory/warehouses/locations", token).await
    }

    pub async fn get_location(&self, token: &str, id: EntityId) -> AppResult<Location> {
        self.get(&format!("/inventory/warehouses/locations/{}", id), token)
            .await
    }

    pub async fn create_location(&self, token: &str, input: &LocationInput) -> AppResult<Location> {
        self.post("/inventory/warehouses/locations", token, input).await
    }

    pub async fn update_location(
        &self,
        token: &str,
        id: EntityId,
        input: &LocationInput,
    ) -> AppResult<Location> {
        self.put(&format!("/inventory/warehouses/locations/{}", id), token, input)
            .await
    }

    // ------------------------------------------------------------------
    // Goods receipt notes
    // ------------------------------------------------------------------

    pub async fn list_grns(&self, token: &str) -> AppResult<Vec<GoodsReceiptNote>> {
        self.get("/inventory/grn", token).await
    }

    pub async fn get_grn(&self, token: &str, id: EntityId) -> AppResult<GoodsReceiptNote> {
        self.get(&format!("/inventory/grn/{}", id), token).await
    }

    pub async fn create_grn(&self, token: &str, input: &GrnInput) -> AppResult<GoodsReceiptNote> {
        self.post("/inventory/grn", token, input).await
    }

    pub async fn update_grn(
        &self,
        token: &str,
        id: EntityId,
        input: &GrnInput,
    ) -> AppResult<GoodsReceiptNote> {
        self.put(&format!("/inventory/grn/{}", id), token, input).await
    }

    pub async fn submit_grn(&self, token: &str, id: EntityId) -> AppResult<GoodsReceiptNote> {
        self.post_empty(&format!("/inventory/grn/{}/submit", id), token)
            .await
    }

    pub async fn finalize_grn(&self, token: &str, id: EntityId) -> AppResult<GoodsReceiptNote> {
        self.post_empty(&format!("/inventory/grn/{}/finalize", id), token)
            .await
    }

    // ------------------------------------------------------------------
    // Transfers
    // ------------------------------------------------------------------

    pub async fn list_transfers(&self, token: &str) -> AppResult<Vec<Transfer>> {
        self.get("/inventory/transfers", token).await
    }

    pub async fn get_transfer(&self, token: &str, id: EntityId) -> AppResult<Transfer> {
        self.get(&format!("/inventory/transfers/{}", id), token).await
    }

    pub async fn create_transfer(&self, token: &str, input: &TransferInput) -> AppResult<Transfer> {
        self.post("/inventory/transfers", token, input).await
    }

    // ------------------------------------------------------------------
    // Sales orders
    // ------------------------------------------------------------------

    pub async fn list_sales_orders(&self, token: &str) -> AppResult<Vec<SalesOrder>> {
        self.get("/sales/orders", token).await
    }

    pub async fn get_sales_order(&self, token: &str, id: EntityId) -> AppResult<SalesOrder> {
        self.get(&format!("/sales/orders/{}", id), token).await
    }

    pub async fn create_sales_order(
        &self,
        token: &str,
        input: &SalesOrderInput,
    ) -> AppResult<SalesOrder> {
        self.post("/sales/orders", token, input).await
    }

    pub async fn update_sales_order(
        &self,
        token: &str,
        id: EntityId,
        input: &SalesOrderInput,
    ) -> AppResult<SalesOrder> {
        self.put(&format!("/sales/orders/{}", id), token, input).await
    }

    pub async fn delete_sales_order(&self, token: &str, id: EntityId) -> AppResult<()> {
        self.delete(&format!("/sales/orders/{}", id), token).await
    }

    pub async fn check_credit(&self, token: &str, id: EntityId) -> AppResult<CreditCheck> {
        self.post_empty(&format!("/sales/orders/{}/check-credit", id), token)
            .await
    }

    pub async fn sales_order_from_quotation(
        &self,
        token: &str,
        quotation_id: EntityId,
    ) -> AppResult<SalesOrder> {
        self.post_empty(&format!("/sales/orders/from-quotation/{}", quotation_id), token)
            .await
    }

    // ------------------------------------------------------------------
    // Stock issue notes
    // ------------------------------------------------------------------

    pub async fn list_issue_notes(&self, token: &str) -> AppResult<Vec<StockIssueNote>> {
        self.get("/sales/issue-notes", token).await
    }

    pub async fn get_issue_note(&self, token: &str, id: EntityId) -> AppResult<StockIssueNote> {
        self.get(&format!("/sales/issue-notes/{}", id), token).await
    }

    pub async fn create_issue_note(
        &self,
        token: &str,
        input: &IssueNoteInput,
    ) -> AppResult<StockIssueNote> {
        self.post("/sales/issue-notes", token, input).await
    }

    pub async fn update_issue_note(
        &self,
        token: &str,
        id: EntityId,
        input: &IssueNoteInput,
    ) -> AppResult<StockIssueNote> {
        self.put(&format!("/sales/issue-notes/{}", id), token, input).await
    }

    pub async fn delete_issue_note(&self, token: &str, id: EntityId) -> AppResult<()> {
        self.delete(&format!("/sales/issue-notes/{}", id), token).await
    }

    pub async fn approve_issue_note(&self, token: &str, id: EntityId) -> AppResult<StockIssueNote> {
        self.post_empty(&format!("/sales/issue-notes/{}/approve", id), token)
            .await
    }

    pub async fn submit_issue_note(&self, token: &str, id: EntityId) -> AppResult<StockIssueNote> {
        self.post_empty(&format!("/sales/issue-notes/{}/submit", id), token)
            .await
    }

    pub async fn check_stock(
        &self,
        token: &str,
        request: &StockCheckRequest,
    ) -> AppResult<StockCheckResult> {
        self.post("/sales/issue-notes/check-stock", token, request).await
    }

    // ------------------------------------------------------------------
    // Delivery orders
    // ------------------------------------------------------------------

    pub async fn list_delivery_orders(&self, token: &str) -> AppResult<Vec<DeliveryOrder>> {
        self.get("/sales/delivery-orders", token).await
    }

    pub async fn get_delivery_order(&self, token: &str, id: EntityId) -> AppResult<DeliveryOrder> {
        self.get(&format!("/sales/delivery-orders/{}", id), token).await
    }

    pub async fn create_delivery_order(
        &self,
        token: &str,
        input: &DeliveryOrderInput,
    ) -> AppResult<DeliveryOrder> {
        self.post("/sales/delivery-orders", token, input).await
    }

    pub async fn update_delivery_order(
        &self,
        token: &str,
        id: EntityId,
        input: &DeliveryOrderInput,
    ) -> AppResult<DeliveryOrder> {
        self.put(&format!("/sales/delivery-orders/{}", id), token, input)
            .await
    }

    pub async fn delete_delivery_order(&self, token: &str, id: EntityId) -> AppResult<()> {
        self.delete(&format!("/sales/delivery-orders/{}", id), token).await
    }

    pub async fn delivery_order_from_issue_note(
        &self,
        token: &str,
        issue_note_id: EntityId,
    ) -> AppResult<DeliveryOrder> {
        self.post_empty(
            &format!("/sales/delivery-orders/from-issue-note/{}", issue_note_id),
            token,
        )
        .await
    }
}
