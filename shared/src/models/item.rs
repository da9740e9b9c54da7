//! Item master data

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::numeric::{lenient, lenient_date_opt, lenient_opt};
use crate::types::EntityId;

/// An item in the master catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: EntityId,
    #[serde(default)]
    pub item_code: String,
    #[serde(default)]
    pub item_name_ar: String,
    #[serde(default)]
    pub item_name_en: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub standard_cost: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub last_purchase_price: Option<Decimal>,
    /// Current replacement value per unit, tracked apart from historical cost
    #[serde(default, deserialize_with = "lenient_opt")]
    pub replacement_price: Option<Decimal>,
    /// Stock figure kept on the item itself, used for items not yet tracked per warehouse
    #[serde(default, deserialize_with = "lenient")]
    pub current_stock: Decimal,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub min_stock_level: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub max_stock_level: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub reorder_point: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub avg_monthly_consumption: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub last_movement_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

pub(crate) fn default_true() -> bool {
    true
}

impl Item {
    /// Unit cost used when the item has no per-warehouse balance
    pub fn fallback_unit_cost(&self) -> Decimal {
        self.standard_cost
            .or(self.last_purchase_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Display name, Arabic first
    pub fn display_name(&self) -> &str {
        if !self.item_name_ar.trim().is_empty() {
            &self.item_name_ar
        } else {
            self.item_name_en.as_deref().unwrap_or(&self.item_code)
        }
    }
}

/// Form input for creating or updating an item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    #[validate(length(min = 1, max = 30, message = "Item code is required"))]
    pub item_code: String,
    #[validate(length(min = 1, max = 200, message = "Arabic name is required"))]
    pub item_name_ar: String,
    #[validate(length(max = 200))]
    pub item_name_en: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub standard_cost: Option<Decimal>,
    pub last_purchase_price: Option<Decimal>,
    pub replacement_price: Option<Decimal>,
    pub min_stock_level: Option<Decimal>,
    pub max_stock_level: Option<Decimal>,
    pub reorder_point: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_tolerates_loose_payload() {
        let item: Item = serde_json::from_value(json!({
            "id": 7,
            "itemCode": "BOLT-10",
            "itemNameAr": "مسمار",
            "standardCost": "4.5",
            "replacementPrice": null,
            "currentStock": "n/a"
        }))
        .unwrap();

        assert_eq!(item.standard_cost, Some(Decimal::new(45, 1)));
        assert_eq!(item.replacement_price, None);
        assert_eq!(item.current_stock, Decimal::ZERO);
        assert!(item.is_active);
    }

    #[test]
    fn test_fallback_unit_cost_prefers_standard_cost() {
        let mut item: Item = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(item.fallback_unit_cost(), Decimal::ZERO);

        item.last_purchase_price = Some(Decimal::from(6));
        assert_eq!(item.fallback_unit_cost(), Decimal::from(6));

        // a present zero standard cost still wins over the purchase price
        item.standard_cost = Some(Decimal::ZERO);
        assert_eq!(item.fallback_unit_cost(), Decimal::ZERO);
    }

    #[test]
    fn test_display_name() {
        let item: Item =
            serde_json::from_value(json!({"id": 1, "itemCode": "X1", "itemNameEn": "Widget"}))
                .unwrap();
        assert_eq!(item.display_name(), "Widget");
    }
}
