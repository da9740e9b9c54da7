//! HTTP handlers for items, warehouses and locations

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{
    EntityId, Item, ItemInput, ListQuery, Location, LocationInput, PaginatedResponse, Warehouse,
    WarehouseInput,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::CatalogService;
use crate::AppState;

/// List items with search and pagination
pub async fn list_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Item>>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.list_items(&current_user, &query).await?))
}

pub async fn list_active_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Item>>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.active_items(&current_user).await?))
}

pub async fn get_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<EntityId>,
) -> AppResult<Json<Item>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.get_item(&current_user, item_id).await?))
}

pub async fn create_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ItemInput>,
) -> AppResult<Json<Item>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.create_item(&current_user, input).await?))
}

pub async fn update_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<EntityId>,
    Json(input): Json<ItemInput>,
) -> AppResult<Json<Item>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.update_item(&current_user, item_id, input).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<EntityId>,
) -> AppResult<Json<()>> {
    let service = CatalogService::new(&state);
    service.delete_item(&current_user, item_id).await?;
    Ok(Json(()))
}

/// List warehouses with search and pagination
pub async fn list_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Warehouse>>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.list_warehouses(&current_user, &query).await?))
}

pub async fn list_active_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.active_warehouses(&current_user).await?))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<EntityId>,
) -> AppResult<Json<Warehouse>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.get_warehouse(&current_user, warehouse_id).await?))
}

pub async fn create_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<WarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.create_warehouse(&current_user, input).await?))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<EntityId>,
    Json(input): Json<WarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let service = CatalogService::new(&state);
    Ok(Json(
        service
            .update_warehouse(&current_user, warehouse_id, input)
            .await?,
    ))
}

/// Locations of one warehouse
pub async fn list_warehouse_locations(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<EntityId>,
) -> AppResult<Json<Vec<Location>>> {
    let service = CatalogService::new(&state);
    Ok(Json(
        service
            .warehouse_locations(&current_user, warehouse_id)
            .await?,
    ))
}

pub async fn get_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(location_id): Path<EntityId>,
) -> AppResult<Json<Location>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.get_location(&current_user, location_id).await?))
}

pub async fn create_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<LocationInput>,
) -> AppResult<Json<Location>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.create_location(&current_user, input).await?))
}

pub async fn update_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(location_id): Path<EntityId>,
    Json(input): Json<LocationInput>,
) -> AppResult<Json<Location>> {
    let service = CatalogService::new(&state);
    Ok(Json(
        service
            .update_location(&current_user, location_id, input)
            .await?,
    ))
}
