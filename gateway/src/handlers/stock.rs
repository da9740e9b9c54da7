//! HTTP handlers for stock balances

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{EntityId, ListQuery, PaginatedResponse, StockBalance, StockInput, StockSnapshot};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::StockService;
use crate::AppState;

/// List stock balances, optionally for one warehouse
pub async fn list_stocks(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<StockBalance>>> {
    let service = StockService::new(&state);
    Ok(Json(service.list_stocks(&current_user, &query).await?))
}

pub async fn get_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_id): Path<EntityId>,
) -> AppResult<Json<StockBalance>> {
    let service = StockService::new(&state);
    Ok(Json(service.get_stock(&current_user, stock_id).await?))
}

pub async fn create_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<StockInput>,
) -> AppResult<Json<StockBalance>> {
    let service = StockService::new(&state);
    Ok(Json(service.create_stock(&current_user, input).await?))
}

pub async fn update_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_id): Path<EntityId>,
    Json(input): Json<StockInput>,
) -> AppResult<Json<StockBalance>> {
    let service = StockService::new(&state);
    Ok(Json(service.update_stock(&current_user, stock_id, input).await?))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_id): Path<EntityId>,
) -> AppResult<Json<()>> {
    let service = StockService::new(&state);
    service.delete_stock(&current_user, stock_id).await?;
    Ok(Json(()))
}

/// Availability snapshot of one warehouse
pub async fn get_snapshot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<EntityId>,
) -> AppResult<Json<StockSnapshot>> {
    let service = StockService::new(&state);
    Ok(Json(service.snapshot(&current_user, warehouse_id).await?))
}
