//! Dual valuation tests
//!
//! Properties of the valuation aggregation:
//! - Row count matches the items that hold stock
//! - Historical value equals quantity times historical unit cost
//! - Zero-cost rows never alert; zero-history rows with a price always do
//! - Alerted rows come first, each partition ordered by divergence

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    dual_valuation, summarize, EntityId, Item, StockBalance, ValuationOptions,
    DEFAULT_ALERT_THRESHOLD,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(
    id: EntityId,
    current_stock: Decimal,
    standard_cost: Option<Decimal>,
    replacement_price: Option<Decimal>,
) -> Item {
    Item {
        id,
        item_code: format!("ITM-{:03}", id),
        item_name_ar: format!("صنف {}", id),
        item_name_en: None,
        category: None,
        unit: None,
        standard_cost,
        last_purchase_price: None,
        replacement_price,
        current_stock,
        min_stock_level: None,
        max_stock_level: None,
        reorder_point: None,
        avg_monthly_consumption: None,
        last_movement_date: None,
        is_active: true,
    }
}

fn balance(item_id: EntityId, warehouse_id: EntityId, qty: Decimal, cost: Decimal) -> StockBalance {
    StockBalance {
        id: None,
        item_id,
        warehouse_id,
        location_id: None,
        quantity_on_hand: qty,
        average_cost: cost,
        quantity_reserved: Decimal::ZERO,
    }
}

fn options() -> ValuationOptions {
    ValuationOptions {
        alert_threshold: DEFAULT_ALERT_THRESHOLD,
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// Non-negative amount with two decimal places
fn amount_strategy(max_cents: i64) -> impl Strategy<Value = Decimal> {
    (0..=max_cents).prop_map(|c| Decimal::new(c, 2))
}

fn balance_strategy() -> impl Strategy<Value = StockBalance> {
    (1i64..15, 1i64..4, amount_strategy(100_000), amount_strategy(50_000))
        .prop_map(|(item_id, wh, qty, cost)| balance(item_id, wh, qty, cost))
}

fn items_strategy() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::btree_map(
        1i64..20,
        (
            amount_strategy(100_000),
            prop::option::of(amount_strategy(50_000)),
            prop::option::of(amount_strategy(50_000)),
        ),
        0..12,
    )
    .prop_map(|m| {
        m.into_iter()
            .map(|(id, (stock, cost, price))| item(id, stock, cost, price))
            .collect()
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Single balance with a higher replacement price
    #[test]
    fn test_single_balance_example() {
        let balances = vec![balance(1, 1, dec("100"), dec("10"))];
        let items = vec![item(1, Decimal::ZERO, None, Some(dec("15")))];

        let rows = dual_valuation(&balances, &items, &options());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.historical_cost_per_unit, dec("10"));
        assert_eq!(row.value_historical, dec("1000"));
        assert_eq!(row.value_replacement, dec("1500"));
        assert_eq!(row.diff_pct, dec("0.5"));
        assert!(row.has_alert);
    }

    /// Item without balances falls back to its own stock figure
    #[test]
    fn test_fallback_item_example() {
        let items = vec![item(2, dec("50"), Some(dec("4")), Some(dec("4.2")))];

        let rows = dual_valuation(&[], &items, &options());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_id, 2);
        assert_eq!(rows[0].historical_cost_per_unit, dec("4"));
        assert_eq!(rows[0].diff_pct, dec("0.05"));
        assert!(!rows[0].has_alert);
    }

    #[test]
    fn test_empty_inputs_give_empty_report() {
        let rows = dual_valuation(&[], &[], &options());
        assert!(rows.is_empty());
        let summary = summarize(&rows);
        assert_eq!(summary.row_count, 0);
        assert_eq!(summary.difference_pct, Decimal::ZERO);
    }

    /// Balances for items missing from the master still produce rows
    #[test]
    fn test_balance_without_item_has_zero_replacement() {
        let balances = vec![balance(9, 1, dec("5"), dec("2"))];
        let rows = dual_valuation(&balances, &[], &options());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].replacement_price_per_unit, Decimal::ZERO);
        assert_eq!(rows[0].item_code, None);
        // Historical cost with no replacement: full divergence
        assert_eq!(rows[0].diff_pct, Decimal::ONE);
        assert!(rows[0].has_alert);
    }

    /// Quantities across warehouses are summed with a weighted cost
    #[test]
    fn test_weighted_average_across_warehouses() {
        let balances = vec![
            balance(3, 1, dec("10"), dec("2")),
            balance(3, 2, dec("30"), dec("6")),
        ];
        let items = vec![item(3, Decimal::ZERO, None, Some(dec("5")))];

        let rows = dual_valuation(&balances, &items, &options());
        assert_eq!(rows[0].qty, dec("40"));
        assert_eq!(rows[0].value_historical, dec("200"));
        assert_eq!(rows[0].historical_cost_per_unit, dec("5"));
        assert_eq!(rows[0].diff_pct, Decimal::ZERO);
    }

    #[test]
    fn test_custom_threshold() {
        let items = vec![item(2, dec("50"), Some(dec("4")), Some(dec("4.2")))];
        let strict = ValuationOptions {
            alert_threshold: dec("0.05"),
        };
        let rows = dual_valuation(&[], &items, &strict);
        assert!(rows[0].has_alert);
    }

    #[test]
    fn test_summary_totals() {
        let balances = vec![
            balance(1, 1, dec("100"), dec("10")),
            balance(2, 1, dec("10"), dec("4")),
        ];
        let items = vec![
            item(1, Decimal::ZERO, None, Some(dec("15"))),
            item(2, Decimal::ZERO, None, Some(dec("4"))),
        ];
        let summary = summarize(&dual_valuation(&balances, &items, &options()));
        assert_eq!(summary.row_count, 2);
        assert_eq!(summary.alert_count, 1);
        assert_eq!(summary.total_historical, dec("1040"));
        assert_eq!(summary.total_replacement, dec("1540"));
        assert_eq!(summary.difference, dec("500"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// One row per item holding stock, from balances or the fallback
    #[test]
    fn test_row_count_matches_stocked_items(
        balances in prop::collection::vec(balance_strategy(), 0..30),
        items in items_strategy(),
    ) {
        let mut per_item: HashMap<EntityId, Decimal> = HashMap::new();
        for b in &balances {
            *per_item.entry(b.item_id).or_default() += b.quantity_on_hand;
        }
        let mut expected: HashSet<EntityId> = per_item
            .iter()
            .filter(|(_, q)| **q > Decimal::ZERO)
            .map(|(id, _)| *id)
            .collect();
        for i in &items {
            if !per_item.contains_key(&i.id) && i.current_stock > Decimal::ZERO {
                expected.insert(i.id);
            }
        }

        let rows = dual_valuation(&balances, &items, &options());
        prop_assert_eq!(rows.len(), expected.len());
        let ids: HashSet<EntityId> = rows.iter().map(|r| r.item_id).collect();
        prop_assert_eq!(ids, expected);
    }

    /// Historical value equals quantity times unit cost within rounding
    #[test]
    fn test_historical_value_identity(
        balances in prop::collection::vec(balance_strategy(), 0..30),
        items in items_strategy(),
    ) {
        let tolerance = dec("0.000001");
        for row in dual_valuation(&balances, &items, &options()) {
            let recomputed = row.qty * row.historical_cost_per_unit;
            prop_assert!((recomputed - row.value_historical).abs() <= tolerance);
            prop_assert_eq!(row.value_replacement, row.qty * row.replacement_price_per_unit);
        }
    }

    /// Zero on both sides never alerts; zero history with a price always does
    #[test]
    fn test_zero_cost_rules(
        qty in 1i64..1000,
        price in amount_strategy(10_000),
    ) {
        let balances = vec![balance(1, 1, Decimal::from(qty), Decimal::ZERO)];
        let items = vec![item(1, Decimal::ZERO, None, Some(price))];
        let rows = dual_valuation(&balances, &items, &options());
        prop_assert_eq!(rows.len(), 1);

        if price.is_zero() {
            prop_assert_eq!(rows[0].diff_pct, Decimal::ZERO);
            prop_assert!(!rows[0].has_alert);
        } else {
            prop_assert_eq!(rows[0].diff_pct, Decimal::ONE);
            prop_assert!(rows[0].has_alert);
        }
    }

    /// Alerted rows first, divergence non-increasing inside each group
    #[test]
    fn test_output_ordering(
        balances in prop::collection::vec(balance_strategy(), 0..30),
        items in items_strategy(),
    ) {
        let rows = dual_valuation(&balances, &items, &options());
        for pair in rows.windows(2) {
            prop_assert!(pair[0].has_alert || !pair[1].has_alert);
            if pair[0].has_alert == pair[1].has_alert {
                prop_assert!(pair[0].diff_pct >= pair[1].diff_pct);
            }
        }
    }

    /// The alert flag agrees with the threshold rule on every row
    #[test]
    fn test_alert_flag_matches_threshold(
        balances in prop::collection::vec(balance_strategy(), 0..30),
        items in items_strategy(),
    ) {
        for row in dual_valuation(&balances, &items, &options()) {
            let priced = row.historical_cost_per_unit > Decimal::ZERO
                || row.replacement_price_per_unit > Decimal::ZERO;
            prop_assert_eq!(row.has_alert, row.diff_pct >= DEFAULT_ALERT_THRESHOLD && priced);
            prop_assert!(row.diff_pct >= Decimal::ZERO);
        }
    }
}
