//! Stock issue notes and delivery orders

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DocumentStatus, QuantityLine, StockSnapshot};
use crate::numeric::{lenient, lenient_date_opt, safe_add};
use crate::types::EntityId;

/// A note authorising stock to leave a warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockIssueNote {
    pub id: EntityId,
    #[serde(default)]
    pub issue_number: String,
    pub warehouse_id: EntityId,
    #[serde(default)]
    pub sales_order_id: Option<EntityId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<IssueLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueLine {
    pub item_id: EntityId,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueNoteInput {
    pub warehouse_id: EntityId,
    pub sales_order_id: Option<EntityId>,
    pub customer_name: Option<String>,
    pub issue_date: NaiveDate,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub lines: Vec<QuantityLine>,
}

/// Request body for the backend's stock availability check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckRequest {
    pub warehouse_id: EntityId,
    pub lines: Vec<QuantityLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckLine {
    pub item_id: EntityId,
    #[serde(default, deserialize_with = "lenient")]
    pub requested: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub available: Decimal,
    #[serde(default)]
    pub sufficient: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckResult {
    #[serde(default)]
    pub all_available: bool,
    #[serde(default)]
    pub lines: Vec<StockCheckLine>,
}

impl StockCheckResult {
    /// Check requested lines against a local snapshot
    ///
    /// Lines for the same item are summed first, so splitting a request over
    /// several lines cannot bypass the check.
    pub fn from_snapshot(snapshot: &StockSnapshot, lines: &[QuantityLine]) -> Self {
        let mut requested: Vec<(EntityId, Decimal)> = Vec::new();
        for line in lines {
            match requested.iter_mut().find(|(id, _)| *id == line.item_id) {
                Some((_, qty)) => *qty = safe_add(*qty, line.quantity),
                None => requested.push((line.item_id, line.quantity)),
            }
        }

        let lines: Vec<StockCheckLine> = requested
            .into_iter()
            .map(|(item_id, requested)| {
                let available = snapshot.available_for(item_id);
                StockCheckLine {
                    item_id,
                    requested,
                    available,
                    sufficient: requested <= available,
                }
            })
            .collect();

        Self {
            all_available: lines.iter().all(|l| l.sufficient),
            lines,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOrder {
    pub id: EntityId,
    #[serde(default)]
    pub delivery_number: String,
    #[serde(default)]
    pub issue_note_id: Option<EntityId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub lines: Vec<IssueLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOrderInput {
    pub issue_note_id: Option<EntityId>,
    #[validate(length(min = 1, max = 200, message = "Customer is required"))]
    pub customer_name: String,
    #[validate(length(max = 500))]
    pub delivery_address: Option<String>,
    pub delivery_date: NaiveDate,
    pub driver_name: Option<String>,
    pub vehicle_number: Option<String>,
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub lines: Vec<QuantityLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_local_stock_check_sums_duplicate_lines() {
        let snapshot = StockSnapshot {
            warehouse_id: 1,
            available: HashMap::from([(5, Decimal::from(10)), (6, Decimal::from(2))]),
        };
        let lines = vec![
            QuantityLine { item_id: 5, quantity: Decimal::from(6) },
            QuantityLine { item_id: 5, quantity: Decimal::from(6) },
            QuantityLine { item_id: 6, quantity: Decimal::from(2) },
        ];

        let result = StockCheckResult::from_snapshot(&snapshot, &lines);
        assert!(!result.all_available);
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].requested, Decimal::from(12));
        assert!(!result.lines[0].sufficient);
        assert!(result.lines[1].sufficient);
    }
}
