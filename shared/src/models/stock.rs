//! Stock balances per item and warehouse

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::{lenient, safe_add, safe_mul, safe_sub};
use crate::types::EntityId;

/// On-hand quantity and weighted-average cost of an item in one warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockBalance {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub item_id: EntityId,
    pub warehouse_id: EntityId,
    #[serde(default)]
    pub location_id: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity_on_hand: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub average_cost: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity_reserved: Decimal,
}

impl StockBalance {
    /// Quantity free to issue, never negative
    pub fn available(&self) -> Decimal {
        safe_sub(self.quantity_on_hand, self.quantity_reserved).max(Decimal::ZERO)
    }

    /// Value at weighted-average cost
    pub fn value(&self) -> Decimal {
        safe_mul(self.quantity_on_hand, self.average_cost)
    }
}

/// Form input for creating or updating a stock record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInput {
    pub item_id: EntityId,
    pub warehouse_id: EntityId,
    pub location_id: Option<EntityId>,
    pub quantity_on_hand: Decimal,
    pub average_cost: Decimal,
    #[serde(default)]
    pub quantity_reserved: Decimal,
}

/// Available quantities of one warehouse, captured once per warehouse selection
///
/// Forms check requested quantities against this snapshot instead of asking
/// the backend on every keystroke.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StockSnapshot {
    pub warehouse_id: EntityId,
    pub available: HashMap<EntityId, Decimal>,
}

impl StockSnapshot {
    pub fn from_balances(warehouse_id: EntityId, balances: &[StockBalance]) -> Self {
        let mut available: HashMap<EntityId, Decimal> = HashMap::new();
        for b in balances.iter().filter(|b| b.warehouse_id == warehouse_id) {
            let slot = available.entry(b.item_id).or_default();
            *slot = safe_add(*slot, b.available());
        }
        Self {
            warehouse_id,
            available,
        }
    }

    /// Available quantity of an item; items the warehouse does not hold have none
    pub fn available_for(&self, item_id: EntityId) -> Decimal {
        self.available.get(&item_id).copied().unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(item_id: EntityId, warehouse_id: EntityId, on_hand: i64, reserved: i64) -> StockBalance {
        StockBalance {
            id: None,
            item_id,
            warehouse_id,
            location_id: None,
            quantity_on_hand: Decimal::from(on_hand),
            average_cost: Decimal::from(2),
            quantity_reserved: Decimal::from(reserved),
        }
    }

    #[test]
    fn test_available_is_floored() {
        assert_eq!(balance(1, 1, 10, 4).available(), Decimal::from(6));
        assert_eq!(balance(1, 1, 3, 5).available(), Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_sums_locations_of_one_warehouse() {
        let balances = vec![
            balance(1, 10, 5, 0),
            balance(1, 10, 7, 2),
            balance(1, 20, 100, 0),
            balance(2, 10, 1, 0),
        ];
        let snap = StockSnapshot::from_balances(10, &balances);
        assert_eq!(snap.available_for(1), Decimal::from(10));
        assert_eq!(snap.available_for(2), Decimal::from(1));
        assert_eq!(snap.available_for(3), Decimal::ZERO);
    }
}
