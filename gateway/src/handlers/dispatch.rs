//! HTTP handlers for stock issue notes and delivery orders

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{
    DeliveryOrder, DeliveryOrderInput, EntityId, IssueNoteInput, ListQuery, PaginatedResponse,
    StockCheckRequest, StockCheckResult, StockIssueNote,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::DispatchService;
use crate::AppState;

pub async fn list_issue_notes(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<StockIssueNote>>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.list_issue_notes(&current_user, &query).await?))
}

pub async fn get_issue_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(note_id): Path<EntityId>,
) -> AppResult<Json<StockIssueNote>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.get_issue_note(&current_user, note_id).await?))
}

pub async fn create_issue_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<IssueNoteInput>,
) -> AppResult<Json<StockIssueNote>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.create_issue_note(&current_user, input).await?))
}

pub async fn update_issue_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(note_id): Path<EntityId>,
    Json(input): Json<IssueNoteInput>,
) -> AppResult<Json<StockIssueNote>> {
    let service = DispatchService::new(&state);
    Ok(Json(
        service
            .update_issue_note(&current_user, note_id, input)
            .await?,
    ))
}

pub async fn delete_issue_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(note_id): Path<EntityId>,
) -> AppResult<Json<()>> {
    let service = DispatchService::new(&state);
    service.delete_issue_note(&current_user, note_id).await?;
    Ok(Json(()))
}

pub async fn approve_issue_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(note_id): Path<EntityId>,
) -> AppResult<Json<StockIssueNote>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.approve_issue_note(&current_user, note_id).await?))
}

pub async fn submit_issue_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(note_id): Path<EntityId>,
) -> AppResult<Json<StockIssueNote>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.submit_issue_note(&current_user, note_id).await?))
}

pub async fn check_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<StockCheckRequest>,
) -> AppResult<Json<StockCheckResult>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.check_stock(&current_user, request).await?))
}

pub async fn list_delivery_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<DeliveryOrder>>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.list_delivery_orders(&current_user, &query).await?))
}

pub async fn get_delivery_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<EntityId>,
) -> AppResult<Json<DeliveryOrder>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.get_delivery_order(&current_user, order_id).await?))
}

pub async fn create_delivery_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<DeliveryOrderInput>,
) -> AppResult<Json<DeliveryOrder>> {
    let service = DispatchService::new(&state);
    Ok(Json(service.create_delivery_order(&current_user, input).await?))
}

pub async fn update_delivery_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<EntityId>,
    Json(input): Json<DeliveryOrderInput>,
) -> AppResult<Json<DeliveryOrder>> {
    let service = DispatchService::new(&state);
    Ok(Json(
        service
            .update_delivery_order(&current_user, order_id, input)
            .await?,
    ))
}

pub async fn delete_delivery_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<EntityId>,
) -> AppResult<Json<()>> {
    let service = DispatchService::new(&state);
    service.delete_delivery_order(&current_user, order_id).await?;
    Ok(Json(()))
}

pub async fn create_delivery_from_issue_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(note_id): Path<EntityId>,
) -> AppResult<Json<DeliveryOrder>> {
    let service = DispatchService::new(&state);
    Ok(Json(
        service
            .delivery_from_issue_note(&current_user, note_id)
            .await?,
    ))
}
