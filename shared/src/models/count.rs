//! Physical inventory counts

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Item, StockBalance};
use crate::numeric::{safe_mul, safe_sub, safe_sum};
use crate::types::EntityId;

/// Count sheet for one warehouse, one line per stock record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountSheet {
    pub warehouse_id: EntityId,
    pub lines: Vec<CountLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountLine {
    pub stock_id: Option<EntityId>,
    pub item_id: EntityId,
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub location_id: Option<EntityId>,
    pub system_quantity: Decimal,
    pub average_cost: Decimal,
    pub counted_quantity: Option<Decimal>,
    pub variance: Decimal,
    pub variance_value: Decimal,
}

/// A counted quantity submitted for one stock record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountEntry {
    pub stock_id: EntityId,
    pub counted_quantity: Decimal,
}

impl CountSheet {
    pub fn from_balances(warehouse_id: EntityId, balances: &[StockBalance], items: &[Item]) -> Self {
        let by_id: HashMap<EntityId, &Item> = items.iter().map(|i| (i.id, i)).collect();
        let mut lines: Vec<CountLine> = balances
            .iter()
            .filter(|b| b.warehouse_id == warehouse_id)
            .map(|b| {
                let item = by_id.get(&b.item_id);
                CountLine {
                    stock_id: b.id,
                    item_id: b.item_id,
                    item_code: item.map(|i| i.item_code.clone()),
                    item_name: item.map(|i| i.display_name().to_string()),
                    location_id: b.location_id,
                    system_quantity: b.quantity_on_hand,
                    average_cost: b.average_cost,
                    counted_quantity: None,
                    variance: Decimal::ZERO,
                    variance_value: Decimal::ZERO,
                }
            })
            .collect();
        lines.sort_by(|a, b| {
            a.item_code
                .cmp(&b.item_code)
                .then(a.item_id.cmp(&b.item_id))
                .then(a.location_id.cmp(&b.location_id))
        });
        Self {
            warehouse_id,
            lines,
        }
    }

    /// Record counted quantities; returns the stock ids that are not on this sheet
    pub fn apply_counts(&mut self, entries: &[CountEntry]) -> Vec<EntityId> {
        let mut unknown = Vec::new();
        for entry in entries {
            match self
                .lines
                .iter_mut()
                .find(|l| l.stock_id == Some(entry.stock_id))
            {
                Some(line) => {
                    line.counted_quantity = Some(entry.counted_quantity);
                    line.variance = safe_sub(entry.counted_quantity, line.system_quantity);
                    line.variance_value = safe_mul(line.variance, line.average_cost);
                }
                None => unknown.push(entry.stock_id),
            }
        }
        unknown
    }

    /// Counted lines whose quantity differs from the system
    pub fn discrepancies(&self) -> impl Iterator<Item = &CountLine> {
        self.lines
            .iter()
            .filter(|l| l.counted_quantity.is_some() && !l.variance.is_zero())
    }

    pub fn net_variance_value(&self) -> Decimal {
        safe_sum(self.discrepancies().map(|l| l.variance_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(id: EntityId, item_id: EntityId, qty: i64, cost: i64) -> StockBalance {
        StockBalance {
            id: Some(id),
            item_id,
            warehouse_id: 3,
            location_id: None,
            quantity_on_hand: Decimal::from(qty),
            average_cost: Decimal::from(cost),
            quantity_reserved: Decimal::ZERO,
        }
    }

    #[test]
    fn test_counts_produce_variances() {
        let balances = vec![balance(100, 1, 10, 5), balance(101, 2, 4, 2)];
        let mut sheet = CountSheet::from_balances(3, &balances, &[]);
        let unknown = sheet.apply_counts(&[
            CountEntry { stock_id: 100, counted_quantity: Decimal::from(8) },
            CountEntry { stock_id: 101, counted_quantity: Decimal::from(4) },
            CountEntry { stock_id: 999, counted_quantity: Decimal::ONE },
        ]);

        assert_eq!(unknown, vec![999]);
        let diffs: Vec<_> = sheet.discrepancies().collect();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].variance, Decimal::from(-2));
        assert_eq!(sheet.net_variance_value(), Decimal::from(-10));
    }

    #[test]
    fn test_sheet_only_holds_requested_warehouse() {
        let mut other = balance(200, 1, 1, 1);
        other.warehouse_id = 9;
        let sheet = CountSheet::from_balances(3, &[balance(100, 1, 10, 5), other], &[]);
        assert_eq!(sheet.lines.len(), 1);
    }
}
