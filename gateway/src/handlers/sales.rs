//! HTTP handlers for sales orders

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{CreditCheck, EntityId, ListQuery, PaginatedResponse, SalesOrder, SalesOrderInput};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::SalesService;
use crate::AppState;

pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<SalesOrder>>> {
    let service = SalesService::new(&state);
    Ok(Json(service.list_orders(&current_user, &query).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<EntityId>,
) -> AppResult<Json<SalesOrder>> {
    let service = SalesService::new(&state);
    Ok(Json(service.get_order(&current_user, order_id).await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SalesOrderInput>,
) -> AppResult<Json<SalesOrder>> {
    let service = SalesService::new(&state);
    Ok(Json(service.create_order(&current_user, input).await?))
}

pub async fn update_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<EntityId>,
    Json(input): Json<SalesOrderInput>,
) -> AppResult<Json<SalesOrder>> {
    let service = SalesService::new(&state);
    Ok(Json(service.update_order(&current_user, order_id, input).await?))
}

pub async fn delete_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<EntityId>,
) -> AppResult<Json<()>> {
    let service = SalesService::new(&state);
    service.delete_order(&current_user, order_id).await?;
    Ok(Json(()))
}

pub async fn check_credit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<EntityId>,
) -> AppResult<Json<CreditCheck>> {
    let service = SalesService::new(&state);
    Ok(Json(service.check_credit(&current_user, order_id).await?))
}

pub async fn create_from_quotation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(quotation_id): Path<EntityId>,
) -> AppResult<Json<SalesOrder>> {
    let service = SalesService::new(&state);
    Ok(Json(service.from_quotation(&current_user, quotation_id).await?))
}
