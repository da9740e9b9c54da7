//! Goods receipt notes (GRN)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::DocumentStatus;
use crate::numeric::{lenient, lenient_date_opt, safe_mul, safe_sum};
use crate::types::EntityId;

/// A goods receipt note as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoodsReceiptNote {
    pub id: EntityId,
    #[serde(default)]
    pub grn_number: String,
    #[serde(default)]
    pub supplier_id: Option<EntityId>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub warehouse_id: EntityId,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub receipt_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<GrnLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrnLine {
    pub item_id: EntityId,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub unit_cost: Decimal,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub manufacture_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub location_id: Option<EntityId>,
}

impl GoodsReceiptNote {
    pub fn total_value(&self) -> Decimal {
        safe_sum(self.lines.iter().map(|l| safe_mul(l.quantity, l.unit_cost)))
    }
}

/// Form input for a GRN
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GrnInput {
    pub supplier_id: Option<EntityId>,
    #[validate(length(min = 1, max = 200, message = "Supplier is required"))]
    pub supplier_name: String,
    pub warehouse_id: EntityId,
    pub receipt_date: NaiveDate,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub lines: Vec<GrnLineInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrnLineInput {
    pub item_id: EntityId,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub batch_number: Option<String>,
    pub manufacture_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub location_id: Option<EntityId>,
}
