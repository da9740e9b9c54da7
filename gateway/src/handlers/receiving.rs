//! HTTP handlers for goods receipt notes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{EntityId, GoodsReceiptNote, GrnInput, ListQuery, PaginatedResponse};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ReceivingService;
use crate::AppState;

pub async fn list_grns(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<GoodsReceiptNote>>> {
    let service = ReceivingService::new(&state);
    Ok(Json(service.list_grns(&current_user, &query).await?))
}

pub async fn get_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<EntityId>,
) -> AppResult<Json<GoodsReceiptNote>> {
    let service = ReceivingService::new(&state);
    Ok(Json(service.get_grn(&current_user, grn_id).await?))
}

pub async fn create_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<GrnInput>,
) -> AppResult<Json<GoodsReceiptNote>> {
    let service = ReceivingService::new(&state);
    Ok(Json(service.create_grn(&current_user, input).await?))
}

pub async fn update_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<EntityId>,
    Json(input): Json<GrnInput>,
) -> AppResult<Json<GoodsReceiptNote>> {
    let service = ReceivingService::new(&state);
    Ok(Json(service.update_grn(&current_user, grn_id, input).await?))
}

pub async fn submit_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<EntityId>,
) -> AppResult<Json<GoodsReceiptNote>> {
    let service = ReceivingService::new(&state);
    Ok(Json(service.submit_grn(&current_user, grn_id).await?))
}

pub async fn finalize_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<EntityId>,
) -> AppResult<Json<GoodsReceiptNote>> {
    let service = ReceivingService::new(&state);
    Ok(Json(service.finalize_grn(&current_user, grn_id).await?))
}
