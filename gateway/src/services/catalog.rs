//! Item master, warehouses and storage locations

use std::sync::Arc;

use shared::{
    list_page, validate_item_input, validate_location_input, validate_warehouse_input, EntityId,
    Item, ItemInput, ListQuery, Location, LocationInput, PaginatedResponse, Warehouse,
    WarehouseInput,
};

use crate::error::{AppError, AppResult};
use crate::external::ErpApiClient;
use crate::middleware::CurrentUser;
use crate::services::Stores;
use crate::AppState;

/// Catalog service
#[derive(Clone)]
pub struct CatalogService {
    api: ErpApiClient,
    stores: Arc<Stores>,
    page_size: u32,
}

impl CatalogService {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            stores: state.stores.clone(),
            page_size: state.config.listing.page_size,
        }
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub async fn all_items(&self, user: &CurrentUser) -> AppResult<Vec<Item>> {
        self.stores
            .items
            .get_or_load(user.id(), || self.api.list_items(&user.token))
            .await
    }

    pub async fn list_items(
        &self,
        user: &CurrentUser,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<Item>> {
        let items = self.all_items(user).await?;
        Ok(list_page(&items, query, self.page_size))
    }

    /// Active items, as offered by document line pickers
    pub async fn active_items(&self, user: &CurrentUser) -> AppResult<Vec<Item>> {
        self.api.list_active_items(&user.token).await
    }

    pub async fn get_item(&self, user: &CurrentUser, id: EntityId) -> AppResult<Item> {
        if let Some(item) = self.stores.items.get(user.id(), id).await {
            return Ok(item);
        }
        let item = self.api.get_item(&user.token, id).await.map_err(not_found("Item"))?;
        self.stores.items.upsert(user.id(), item.clone()).await;
        Ok(item)
    }

    pub async fn create_item(&self, user: &CurrentUser, input: ItemInput) -> AppResult<Item> {
        validate_item_input(&input)?;
        let item = self.api.create_item(&user.token, &input).await?;
        tracing::info!(item_id = item.id, code = %item.item_code, "Item created");
        self.stores.items.upsert(user.id(), item.clone()).await;
        self.stores.items.invalidate_list().await;
        Ok(item)
    }

    pub async fn update_item(
        &self,
        user: &CurrentUser,
        id: EntityId,
        input: ItemInput,
    ) -> AppResult<Item> {
        validate_item_input(&input)?;
        let item = self
            .api
            .update_item(&user.token, id, &input)
            .await
            .map_err(not_found("Item"))?;
        self.stores.items.upsert(user.id(), item.clone()).await;
        Ok(item)
    }

    pub async fn delete_item(&self, user: &CurrentUser, id: EntityId) -> AppResult<()> {
        self.api
            .delete_item(&user.token, id)
            .await
            .map_err(not_found("Item"))?;
        tracing::info!(item_id = id, "Item deleted");
        self.stores.items.remove(id).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Warehouses
    // ------------------------------------------------------------------

    pub async fn all_warehouses(&self, user: &CurrentUser) -> AppResult<Vec<Warehouse>> {
        self.stores
            .warehouses
            .get_or_load(user.id(), || self.api.list_warehouses(&user.token))
            .await
    }

    pub async fn list_warehouses(
        &self,
        user: &CurrentUser,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<Warehouse>> {
        let warehouses = self.all_warehouses(user).await?;
        Ok(list_page(&warehouses, query, self.page_size))
    }

    pub async fn active_warehouses(&self, user: &CurrentUser) -> AppResult<Vec<Warehouse>> {
        self.api.list_active_warehouses(&user.token).await
    }

    pub async fn get_warehouse(&self, user: &CurrentUser, id: EntityId) -> AppResult<Warehouse> {
        if let Some(w) = self.stores.warehouses.get(user.id(), id).await {
            return Ok(w);
        }
        let w = self
            .api
            .get_warehouse(&user.token, id)
            .await
            .map_err(not_found("Warehouse"))?;
        self.stores.warehouses.upsert(user.id(), w.clone()).await;
        Ok(w)
    }

    pub async fn create_warehouse(
        &self,
        user: &CurrentUser,
        input: WarehouseInput,
    ) -> AppResult<Warehouse> {
        validate_warehouse_input(&input)?;
        let w = self.api.create_warehouse(&user.token, &input).await?;
        tracing::info!(warehouse_id = w.id, code = %w.code, "Warehouse created");
        self.stores.warehouses.upsert(user.id(), w.clone()).await;
        self.stores.warehouses.invalidate_list().await;
        Ok(w)
    }

    pub async fn update_warehouse(
        &self,
        user: &CurrentUser,
        id: EntityId,
        input: WarehouseInput,
    ) -> AppResult<Warehouse> {
        validate_warehouse_input(&input)?;
        let w = self
            .api
            .update_warehouse(&user.token, id, &input)
            .await
            .map_err(not_found("Warehouse"))?;
        self.stores.warehouses.upsert(user.id(), w.clone()).await;
        Ok(w)
    }

    // ------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------

    pub async fn all_locations(&self, user: &CurrentUser) -> AppResult<Vec<Location>> {
        self.stores
            .locations
            .get_or_load(user.id(), || self.api.list_locations(&user.token))
            .await
    }

    pub async fn warehouse_locations(
        &self,
        user: &CurrentUser,
        warehouse_id: EntityId,
    ) -> AppResult<Vec<Location>> {
        let locations = self.all_locations(user).await?;
        Ok(locations
            .into_iter()
            .filter(|l| l.warehouse_id == warehouse_id)
            .collect())
    }

    pub async fn get_location(&self, user: &CurrentUser, id: EntityId) -> AppResult<Location> {
        if let Some(l) = self.stores.locations.get(user.id(), id).await {
            return Ok(l);
        }
        let l = self
            .api
            .get_location(&user.token, id)
            .await
            .map_err(not_found("Location"))?;
        self.stores.locations.upsert(user.id(), l.clone()).await;
        Ok(l)
    }

    pub async fn create_location(
        &self,
        user: &CurrentUser,
        input: LocationInput,
    ) -> AppResult<Location> {
        validate_location_input(&input)?;
        let l = self.api.create_location(&user.token, &input).await?;
        self.stores.locations.upsert(user.id(), l.clone()).await;
        self.stores.locations.invalidate_list().await;
        Ok(l)
    }

    pub async fn update_location(
        &self,
        user: &CurrentUser,
        id: EntityId,
        input: LocationInput,
    ) -> AppResult<Location> {
        validate_location_input(&input)?;
        let l = self
            .api
            .update_location(&user.token, id, &input)
            .await
            .map_err(not_found("Location"))?;
        self.stores.locations.upsert(user.id(), l.clone()).await;
        Ok(l)
    }
}

/// Map a bare upstream 404 to a local not-found error; a server message wins
pub(crate) fn not_found(resource: &'static str) -> impl Fn(AppError) -> AppError {
    move |e| match e {
        AppError::Upstream {
            status: 404,
            message: None,
        } => AppError::NotFound(resource.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_only_404() {
        let e = not_found("Item")(AppError::Upstream {
            status: 404,
            message: None,
        });
        assert!(matches!(e, AppError::NotFound(r) if r == "Item"));

        let e = not_found("Item")(AppError::Upstream {
            status: 409,
            message: Some("in use".into()),
        });
        assert_eq!(e.upstream_message(), Some("in use"));
    }
}
