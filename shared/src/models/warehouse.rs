//! Warehouses and storage locations

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::item::default_true;
use crate::types::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: EntityId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A bin/shelf inside a warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: EntityId,
    pub warehouse_id: EntityId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseInput {
    #[validate(length(min = 1, max = 20, message = "Warehouse code is required"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Arabic name is required"))]
    pub name_ar: String,
    pub name_en: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub warehouse_id: EntityId,
    #[validate(length(min = 1, max = 30, message = "Location code is required"))]
    pub code: String,
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}
