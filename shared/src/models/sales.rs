//! Sales orders and customer credit checks

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::DocumentStatus;
use crate::numeric::{lenient, lenient_date_opt, safe_div, safe_mul, safe_sub, safe_sum};
use crate::types::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    pub id: EntityId,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub customer_id: Option<EntityId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub quotation_id: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<SalesOrderLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderLine {
    pub item_id: EntityId,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub discount_percent: Decimal,
}

impl SalesOrderLine {
    /// Line amount after discount
    pub fn net_amount(&self) -> Decimal {
        let gross = safe_mul(self.quantity, self.unit_price);
        let discount = safe_div(safe_mul(gross, self.discount_percent), Decimal::ONE_HUNDRED);
        safe_sub(gross, discount)
    }
}

impl SalesOrder {
    pub fn total(&self) -> Decimal {
        safe_sum(self.lines.iter().map(SalesOrderLine::net_amount))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderInput {
    pub customer_id: Option<EntityId>,
    #[validate(length(min = 1, max = 200, message = "Customer is required"))]
    pub customer_name: String,
    pub quotation_id: Option<EntityId>,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub lines: Vec<SalesOrderLineInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderLineInput {
    pub item_id: EntityId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
}

/// Outcome of the backend's customer credit check for an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditCheck {
    #[serde(default, alias = "approved")]
    pub within_limit: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub credit_limit: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub outstanding_balance: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub order_total: Decimal,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreditCheck {
    pub fn available_credit(&self) -> Decimal {
        safe_sub(self.credit_limit, self.outstanding_balance).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_amount_applies_discount() {
        let line = SalesOrderLine {
            item_id: 1,
            quantity: Decimal::from(10),
            unit_price: Decimal::from(20),
            discount_percent: Decimal::from(10),
        };
        assert_eq!(line.net_amount(), Decimal::from(180));
    }

    #[test]
    fn test_credit_check_accepts_approved_alias() {
        let check: CreditCheck = serde_json::from_value(serde_json::json!({
            "approved": true,
            "creditLimit": "1000",
            "outstandingBalance": 1200
        }))
        .unwrap();
        assert!(check.within_limit);
        assert_eq!(check.available_credit(), Decimal::ZERO);
    }
}
