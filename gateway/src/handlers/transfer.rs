//! HTTP handlers for stock transfers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{EntityId, ListQuery, PaginatedResponse, Transfer, TransferInput};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::TransferService;
use crate::AppState;

pub async fn list_transfers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Transfer>>> {
    let service = TransferService::new(&state);
    Ok(Json(service.list_transfers(&current_user, &query).await?))
}

pub async fn get_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<EntityId>,
) -> AppResult<Json<Transfer>> {
    let service = TransferService::new(&state);
    Ok(Json(service.get_transfer(&current_user, transfer_id).await?))
}

/// Create a transfer; rejected locally when the source warehouse is short
pub async fn create_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<TransferInput>,
) -> AppResult<Json<Transfer>> {
    let service = TransferService::new(&state);
    Ok(Json(service.create_transfer(&current_user, input).await?))
}
