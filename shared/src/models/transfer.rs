//! Inter-warehouse transfers

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::DocumentStatus;
use crate::numeric::{lenient, lenient_date_opt};
use crate::types::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: EntityId,
    #[serde(default)]
    pub transfer_number: String,
    pub from_warehouse_id: EntityId,
    pub to_warehouse_id: EntityId,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub transfer_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<TransferLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferLine {
    pub item_id: EntityId,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferInput {
    pub from_warehouse_id: EntityId,
    pub to_warehouse_id: EntityId,
    pub transfer_date: NaiveDate,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub lines: Vec<QuantityLine>,
}

/// Item and quantity pair used by outbound forms
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuantityLine {
    pub item_id: EntityId,
    pub quantity: Decimal,
}
