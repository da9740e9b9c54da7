//! HTTP handlers for physical inventory counts

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use shared::{CountEntry, CountSheet, EntityId};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::counting::CountResult;
use crate::services::CountingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ApplyCountRequest {
    pub entries: Vec<CountEntry>,
}

pub async fn get_count_sheet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<EntityId>,
) -> AppResult<Json<CountSheet>> {
    let service = CountingService::new(&state);
    Ok(Json(service.sheet(&current_user, warehouse_id).await?))
}

/// Post counted quantities and adjust every record that differs
pub async fn apply_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<EntityId>,
    Json(request): Json<ApplyCountRequest>,
) -> AppResult<Json<CountResult>> {
    let service = CountingService::new(&state);
    Ok(Json(
        service
            .apply(&current_user, warehouse_id, request.entries)
            .await?,
    ))
}
