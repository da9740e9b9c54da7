//! Dual inventory valuation
//!
//! Puts two values side by side for every stocked item: the historical value
//! at weighted-average cost, and the value at current replacement price.
//! Items whose two unit values drift apart by more than a threshold are
//! flagged so purchasing can review them.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Item, StockBalance};
use crate::numeric::{safe_add, safe_div, safe_mul, safe_sub, safe_sum};
use crate::types::EntityId;

/// Relative divergence at which a row is flagged (15%)
pub const DEFAULT_ALERT_THRESHOLD: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationOptions {
    pub alert_threshold: Decimal,
}

impl Default for ValuationOptions {
    fn default() -> Self {
        Self {
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

/// One row of the dual valuation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualValuationRow {
    pub item_id: EntityId,
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub qty: Decimal,
    pub historical_cost_per_unit: Decimal,
    pub replacement_price_per_unit: Decimal,
    pub value_historical: Decimal,
    pub value_replacement: Decimal,
    pub diff_pct: Decimal,
    pub has_alert: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub row_count: usize,
    pub alert_count: usize,
    pub total_historical: Decimal,
    pub total_replacement: Decimal,
    /// `total_replacement - total_historical`
    pub difference: Decimal,
    /// `difference / total_historical`, zero when there is no historical value
    pub difference_pct: Decimal,
}

#[derive(Default)]
struct Accumulator {
    qty: Decimal,
    value: Decimal,
}

/// Relative divergence of replacement price from historical cost
///
/// A zero historical cost with a positive replacement price counts as a full
/// (100%) divergence; both zero is no divergence at all.
pub fn divergence(historical: Decimal, replacement: Decimal) -> Decimal {
    if historical.is_zero() {
        if replacement > Decimal::ZERO {
            Decimal::ONE
        } else {
            Decimal::ZERO
        }
    } else {
        safe_div(safe_sub(replacement, historical).abs(), historical.abs())
    }
}

/// Build the valuation rows from stock balances and the item master
///
/// Pure and total: empty inputs give an empty report, and a partially loaded
/// input simply yields fewer rows.
pub fn dual_valuation(
    balances: &[StockBalance],
    items: &[Item],
    options: &ValuationOptions,
) -> Vec<DualValuationRow> {
    // BTreeMap keeps the pre-sort order stable across runs
    let mut grouped: BTreeMap<EntityId, Accumulator> = BTreeMap::new();
    for b in balances {
        let acc = grouped.entry(b.item_id).or_default();
        acc.qty = safe_add(acc.qty, b.quantity_on_hand);
        acc.value = safe_add(acc.value, b.value());
    }

    let by_id: HashMap<EntityId, &Item> = items.iter().map(|i| (i.id, i)).collect();

    // Items not tracked per warehouse yet
    for item in items {
        if grouped.contains_key(&item.id) {
            continue;
        }
        grouped.insert(
            item.id,
            Accumulator {
                qty: item.current_stock,
                value: safe_mul(item.current_stock, item.fallback_unit_cost()),
            },
        );
    }

    let mut rows: Vec<DualValuationRow> = grouped
        .into_iter()
        .filter(|(_, acc)| acc.qty > Decimal::ZERO)
        .map(|(item_id, acc)| {
            let item = by_id.get(&item_id).copied();
            let historical = safe_div(acc.value, acc.qty);
            let replacement = item
                .and_then(|i| i.replacement_price)
                .unwrap_or(Decimal::ZERO);
            let diff_pct = divergence(historical, replacement);
            let has_alert = diff_pct >= options.alert_threshold
                && (historical > Decimal::ZERO || replacement > Decimal::ZERO);

            DualValuationRow {
                item_id,
                item_code: item.map(|i| i.item_code.clone()),
                item_name: item.map(|i| i.display_name().to_string()),
                qty: acc.qty,
                historical_cost_per_unit: historical,
                replacement_price_per_unit: replacement,
                value_historical: acc.value,
                value_replacement: safe_mul(acc.qty, replacement),
                diff_pct,
                has_alert,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.has_alert
            .cmp(&a.has_alert)
            .then_with(|| b.diff_pct.cmp(&a.diff_pct))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    rows
}

pub fn summarize(rows: &[DualValuationRow]) -> ValuationSummary {
    let total_historical = safe_sum(rows.iter().map(|r| r.value_historical));
    let total_replacement = safe_sum(rows.iter().map(|r| r.value_replacement));
    let difference = safe_sub(total_replacement, total_historical);
    ValuationSummary {
        row_count: rows.len(),
        alert_count: rows.iter().filter(|r| r.has_alert).count(),
        total_historical,
        total_replacement,
        difference,
        difference_pct: safe_div(difference, total_historical),
    }
}
