//! Periodic inventory report
//!
//! Stock status per item (below minimum, above maximum, reorder, stagnant)
//! plus per-warehouse totals.
//!
//! The stagnant flag is a heuristic. Until the backend exposes movement
//! history it is derived from the item's average monthly consumption and last
//! movement date, and the report marks it as provisional.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Item, StockBalance};
use crate::numeric::{safe_add, safe_div, safe_mul, safe_sum};
use crate::types::EntityId;

pub const DEFAULT_STAGNANT_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Only balances of this warehouse are considered when set
    pub warehouse_id: Option<EntityId>,
    /// Days without movement after which an item counts as stagnant
    pub stagnant_days: i64,
    pub as_of: NaiveDate,
}

impl ReportOptions {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            warehouse_id: None,
            stagnant_days: DEFAULT_STAGNANT_DAYS,
            as_of,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockStatusRow {
    pub item_id: EntityId,
    pub item_code: String,
    pub item_name: String,
    pub category: Option<String>,
    pub quantity: Decimal,
    pub value: Decimal,
    pub min_stock_level: Option<Decimal>,
    pub max_stock_level: Option<Decimal>,
    pub reorder_point: Option<Decimal>,
    /// Months the current quantity lasts at average consumption, zero when unknown
    pub months_of_cover: Decimal,
    pub below_minimum: bool,
    pub above_maximum: bool,
    pub needs_reorder: bool,
    pub stagnant: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseTotals {
    pub warehouse_id: EntityId,
    pub item_count: usize,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub item_count: usize,
    pub total_value: Decimal,
    pub below_minimum: usize,
    pub above_maximum: usize,
    pub needs_reorder: usize,
    pub stagnant: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicReport {
    pub as_of: NaiveDate,
    pub rows: Vec<StockStatusRow>,
    pub warehouses: Vec<WarehouseTotals>,
    pub summary: ReportSummary,
    /// The stagnant flag is a heuristic, not an authoritative rule
    pub provisional: bool,
}

/// Heuristic stagnation test
pub fn is_stagnant(item: &Item, as_of: NaiveDate, stagnant_days: i64) -> bool {
    let no_consumption = item
        .avg_monthly_consumption
        .map_or(true, |c| c <= Decimal::ZERO);
    let idle = item
        .last_movement_date
        .is_some_and(|d| (as_of - d).num_days() > stagnant_days);
    no_consumption || idle
}

pub fn periodic_report(
    balances: &[StockBalance],
    items: &[Item],
    options: &ReportOptions,
) -> PeriodicReport {
    let balances: Vec<&StockBalance> = balances
        .iter()
        .filter(|b| options.warehouse_id.map_or(true, |w| b.warehouse_id == w))
        .collect();

    let mut per_item: HashMap<EntityId, (Decimal, Decimal)> = HashMap::new();
    let mut per_warehouse: BTreeMap<EntityId, (Vec<EntityId>, Decimal, Decimal)> = BTreeMap::new();
    for b in &balances {
        let entry = per_item.entry(b.item_id).or_default();
        entry.0 = safe_add(entry.0, b.quantity_on_hand);
        entry.1 = safe_add(entry.1, b.value());

        let wh = per_warehouse.entry(b.warehouse_id).or_default();
        if !wh.0.contains(&b.item_id) {
            wh.0.push(b.item_id);
        }
        wh.1 = safe_add(wh.1, b.quantity_on_hand);
        wh.2 = safe_add(wh.2, b.value());
    }

    let mut rows: Vec<StockStatusRow> = items
        .iter()
        .filter(|i| i.is_active)
        .filter_map(|item| {
            let (quantity, value) = match per_item.get(&item.id) {
                Some(&(q, v)) => (q, v),
                // Untracked items only count for the company-wide report
                None if options.warehouse_id.is_none() => (
                    item.current_stock,
                    safe_mul(item.current_stock, item.fallback_unit_cost()),
                ),
                None => return None,
            };

            let months_of_cover = item
                .avg_monthly_consumption
                .filter(|c| *c > Decimal::ZERO)
                .map_or(Decimal::ZERO, |c| safe_div(quantity, c));

            Some(StockStatusRow {
                item_id: item.id,
                item_code: item.item_code.clone(),
                item_name: item.display_name().to_string(),
                category: item.category.clone(),
                quantity,
                value,
                min_stock_level: item.min_stock_level,
                max_stock_level: item.max_stock_level,
                reorder_point: item.reorder_point,
                months_of_cover,
                below_minimum: item.min_stock_level.is_some_and(|m| quantity < m),
                above_maximum: item
                    .max_stock_level
                    .is_some_and(|m| m > Decimal::ZERO && quantity > m),
                needs_reorder: item.reorder_point.is_some_and(|r| quantity <= r),
                stagnant: quantity > Decimal::ZERO
                    && is_stagnant(item, options.as_of, options.stagnant_days),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.item_code.cmp(&b.item_code).then(a.item_id.cmp(&b.item_id)));

    let warehouses = per_warehouse
        .into_iter()
        .map(|(warehouse_id, (ids, total_quantity, total_value))| WarehouseTotals {
            warehouse_id,
            item_count: ids.len(),
            total_quantity,
            total_value,
        })
        .collect();

    let summary = ReportSummary {
        item_count: rows.len(),
        total_value: safe_sum(rows.iter().map(|r| r.value)),
        below_minimum: rows.iter().filter(|r| r.below_minimum).count(),
        above_maximum: rows.iter().filter(|r| r.above_maximum).count(),
        needs_reorder: rows.iter().filter(|r| r.needs_reorder).count(),
        stagnant: rows.iter().filter(|r| r.stagnant).count(),
    };

    PeriodicReport {
        as_of: options.as_of,
        rows,
        warehouses,
        summary,
        provisional: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    fn balance(item_id: EntityId, warehouse_id: EntityId, qty: i64, cost: i64) -> StockBalance {
        StockBalance {
            id: None,
            item_id,
            warehouse_id,
            location_id: None,
            quantity_on_hand: Decimal::from(qty),
            average_cost: Decimal::from(cost),
            quantity_reserved: Decimal::ZERO,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_flags() {
        let items = vec![
            item(json!({"id": 1, "itemCode": "A", "minStockLevel": 20, "reorderPoint": 25,
                        "avgMonthlyConsumption": 5, "lastMovementDate": "2024-06-01"})),
            item(json!({"id": 2, "itemCode": "B", "maxStockLevel": 50,
                        "avgMonthlyConsumption": 10, "lastMovementDate": "2024-06-20"})),
        ];
        let balances = vec![balance(1, 1, 10, 2), balance(2, 1, 60, 1)];

        let report = periodic_report(&balances, &items, &ReportOptions::new(as_of()));
        let a = &report.rows[0];
        assert!(a.below_minimum);
        assert!(a.needs_reorder);
        assert!(!a.stagnant);
        assert_eq!(a.months_of_cover, Decimal::from(2));

        let b = &report.rows[1];
        assert!(b.above_maximum);
        assert!(!b.below_minimum);
        assert_eq!(report.summary.total_value, Decimal::from(80));
        assert!(report.provisional);
    }

    #[test]
    fn test_values_beyond_decimal_range_read_as_zero() {
        let items = vec![
            item(json!({"id": 1, "itemCode": "A"})),
            item(json!({"id": 2, "itemCode": "B",
                        "currentStock": "100000000000000000", "standardCost": "100000000000000"})),
        ];
        let balances: Vec<StockBalance> = serde_json::from_value(json!([
            {"itemId": 1, "warehouseId": 1, "quantityOnHand": "100000000000000000",
             "averageCost": "100000000000000"},
            {"itemId": 1, "warehouseId": 1, "quantityOnHand": 2, "averageCost": 3}
        ]))
        .unwrap();

        let report = periodic_report(&balances, &items, &ReportOptions::new(as_of()));
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].value, Decimal::from(6));
        assert_eq!(report.rows[1].value, Decimal::ZERO);
        assert_eq!(report.summary.total_value, Decimal::from(6));
    }

    #[test]
    fn test_stagnant_heuristics() {
        let no_consumption = item(json!({"id": 1}));
        assert!(is_stagnant(&no_consumption, as_of(), 90));

        let idle = item(json!({"id": 2, "avgMonthlyConsumption": 3,
                               "lastMovementDate": "2024-01-01"}));
        assert!(is_stagnant(&idle, as_of(), 90));

        let active = item(json!({"id": 3, "avgMonthlyConsumption": 3,
                                 "lastMovementDate": "2024-06-01"}));
        assert!(!is_stagnant(&active, as_of(), 90));
    }

    #[test]
    fn test_warehouse_filter_and_totals() {
        let items = vec![
            item(json!({"id": 1, "itemCode": "A", "avgMonthlyConsumption": 1})),
            item(json!({"id": 2, "itemCode": "B", "currentStock": 9, "standardCost": 1})),
        ];
        let balances = vec![balance(1, 1, 10, 2), balance(1, 2, 5, 2)];

        let mut options = ReportOptions::new(as_of());
        options.warehouse_id = Some(2);
        let report = periodic_report(&balances, &items, &options);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].quantity, Decimal::from(5));
        assert_eq!(report.warehouses.len(), 1);
        assert_eq!(report.warehouses[0].total_value, Decimal::from(10));

        // company-wide report includes the untracked item
        let report = periodic_report(&balances, &items, &ReportOptions::new(as_of()));
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.warehouses.len(), 2);
        assert_eq!(report.rows[1].value, Decimal::from(9));
    }
}
