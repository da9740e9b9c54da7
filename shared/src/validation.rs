//! Form validation for inventory and sales documents
//!
//! Field-level rules live on the input types as `validator` derives. The
//! rules here cover what a derive cannot express: decimal ranges, cross-field
//! date ordering, and quantities checked against a stock snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::models::{
    DeliveryOrderInput, GrnInput, IssueNoteInput, ItemInput, LocationInput, QuantityLine,
    SalesOrderInput, StockCheckResult, StockInput, StockSnapshot, TransferInput, WarehouseInput,
};

/// First problem found on a form, pointing at the offending field
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationErrors> for FieldError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(name, _)| *name);
        fields
            .into_iter()
            .find_map(|(name, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code));
                    FieldError::new(name, message)
                })
            })
            .unwrap_or_else(|| FieldError::new("form", "Invalid input"))
    }
}

fn field<T>(name: &str, result: Result<T, &'static str>) -> Result<T, FieldError> {
    result.map_err(|m| FieldError::new(name, m))
}

// ============================================================================
// Single-value rules
// ============================================================================

/// Required text field: must contain something other than whitespace
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

/// Item code: 1-30 characters of letters, digits, `-` or `_`
pub fn validate_item_code(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if code.is_empty() {
        return Err("Item code is required");
    }
    if code.chars().count() > 30 {
        return Err("Item code must be at most 30 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Item code may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

pub fn validate_non_negative(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Value cannot be negative");
    }
    Ok(())
}

pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Valuation alert threshold: a fraction in (0, 1]
pub fn validate_alert_threshold(threshold: Decimal) -> Result<(), &'static str> {
    if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
        return Err("Alert threshold must be greater than 0 and at most 1");
    }
    Ok(())
}

pub fn validate_discount(percent: Decimal) -> Result<(), &'static str> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err("Discount must be between 0 and 100%");
    }
    Ok(())
}

/// Manufacture date must come before the expiry date when both are given
pub fn validate_date_order(
    manufacture: Option<NaiveDate>,
    expiry: Option<NaiveDate>,
) -> Result<(), &'static str> {
    match (manufacture, expiry) {
        (Some(m), Some(e)) if m >= e => Err("Expiry date must be after the manufacture date"),
        _ => Ok(()),
    }
}

pub fn validate_stock_levels(
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Result<(), &'static str> {
    if let Some(min) = min {
        validate_non_negative(min)?;
    }
    if let Some(max) = max {
        validate_non_negative(max)?;
    }
    match (min, max) {
        (Some(min), Some(max)) if max > Decimal::ZERO && min > max => {
            Err("Minimum stock level cannot exceed the maximum")
        }
        _ => Ok(()),
    }
}

/// Requested quantities must not exceed what the snapshot shows as available
pub fn validate_against_snapshot(
    lines: &[QuantityLine],
    snapshot: &StockSnapshot,
) -> Result<(), FieldError> {
    let check = StockCheckResult::from_snapshot(snapshot, lines);
    match check.lines.iter().find(|l| !l.sufficient) {
        Some(short) => {
            let index = lines
                .iter()
                .position(|l| l.item_id == short.item_id)
                .unwrap_or_default();
            Err(FieldError::new(
                format!("lines[{}].quantity", index),
                format!(
                    "Requested {} exceeds available stock {}",
                    short.requested.normalize(),
                    short.available.normalize()
                ),
            ))
        }
        None => Ok(()),
    }
}

fn validate_quantity_lines(lines: &[QuantityLine]) -> Result<(), FieldError> {
    for (i, line) in lines.iter().enumerate() {
        field(
            &format!("lines[{}].quantity", i),
            validate_positive_quantity(line.quantity),
        )?;
    }
    Ok(())
}

// ============================================================================
// Forms
// ============================================================================

pub fn validate_item_input(input: &ItemInput) -> Result<(), FieldError> {
    input.validate()?;
    field("itemCode", validate_item_code(&input.item_code))?;
    field("itemNameAr", validate_required(&input.item_name_ar))?;
    for (name, value) in [
        ("standardCost", input.standard_cost),
        ("lastPurchasePrice", input.last_purchase_price),
        ("replacementPrice", input.replacement_price),
        ("reorderPoint", input.reorder_point),
    ] {
        if let Some(v) = value {
            field(name, validate_non_negative(v))?;
        }
    }
    field(
        "minStockLevel",
        validate_stock_levels(input.min_stock_level, input.max_stock_level),
    )
}

pub fn validate_warehouse_input(input: &WarehouseInput) -> Result<(), FieldError> {
    input.validate()?;
    field("code", validate_required(&input.code))?;
    field("nameAr", validate_required(&input.name_ar))
}

pub fn validate_location_input(input: &LocationInput) -> Result<(), FieldError> {
    input.validate()?;
    if input.warehouse_id <= 0 {
        return Err(FieldError::new("warehouseId", "Warehouse is required"));
    }
    field("code", validate_required(&input.code))
}

pub fn validate_stock_input(input: &StockInput) -> Result<(), FieldError> {
    if input.item_id <= 0 {
        return Err(FieldError::new("itemId", "Item is required"));
    }
    if input.warehouse_id <= 0 {
        return Err(FieldError::new("warehouseId", "Warehouse is required"));
    }
    field("quantityOnHand", validate_non_negative(input.quantity_on_hand))?;
    field("averageCost", validate_non_negative(input.average_cost))?;
    field("quantityReserved", validate_non_negative(input.quantity_reserved))?;
    if input.quantity_reserved > input.quantity_on_hand {
        return Err(FieldError::new(
            "quantityReserved",
            "Reserved quantity cannot exceed quantity on hand",
        ));
    }
    Ok(())
}

pub fn validate_grn(input: &GrnInput) -> Result<(), FieldError> {
    input.validate()?;
    field("supplierName", validate_required(&input.supplier_name))?;
    if input.warehouse_id <= 0 {
        return Err(FieldError::new("warehouseId", "Warehouse is required"));
    }
    for (i, line) in input.lines.iter().enumerate() {
        if line.item_id <= 0 {
            return Err(FieldError::new(format!("lines[{}].itemId", i), "Item is required"));
        }
        field(
            &format!("lines[{}].quantity", i),
            validate_positive_quantity(line.quantity),
        )?;
        field(
            &format!("lines[{}].unitCost", i),
            validate_non_negative(line.unit_cost),
        )?;
        field(
            &format!("lines[{}].expiryDate", i),
            validate_date_order(line.manufacture_date, line.expiry_date),
        )?;
    }
    Ok(())
}

/// Validate a transfer; the snapshot is the source warehouse's stock when known
pub fn validate_transfer(
    input: &TransferInput,
    snapshot: Option<&StockSnapshot>,
) -> Result<(), FieldError> {
    input.validate()?;
    if input.from_warehouse_id == input.to_warehouse_id {
        return Err(FieldError::new(
            "toWarehouseId",
            "Source and destination warehouses must differ",
        ));
    }
    validate_quantity_lines(&input.lines)?;
    match snapshot {
        Some(s) => validate_against_snapshot(&input.lines, s),
        None => Ok(()),
    }
}

pub fn validate_issue_note(
    input: &IssueNoteInput,
    snapshot: Option<&StockSnapshot>,
) -> Result<(), FieldError> {
    input.validate()?;
    if input.warehouse_id <= 0 {
        return Err(FieldError::new("warehouseId", "Warehouse is required"));
    }
    validate_quantity_lines(&input.lines)?;
    match snapshot {
        Some(s) => validate_against_snapshot(&input.lines, s),
        None => Ok(()),
    }
}

pub fn validate_sales_order(input: &SalesOrderInput) -> Result<(), FieldError> {
    input.validate()?;
    field("customerName", validate_required(&input.customer_name))?;
    if let Some(delivery) = input.delivery_date {
        if delivery < input.order_date {
            return Err(FieldError::new(
                "deliveryDate",
                "Delivery date cannot be before the order date",
            ));
        }
    }
    for (i, line) in input.lines.iter().enumerate() {
        field(
            &format!("lines[{}].quantity", i),
            validate_positive_quantity(line.quantity),
        )?;
        field(
            &format!("lines[{}].unitPrice", i),
            validate_non_negative(line.unit_price),
        )?;
        field(
            &format!("lines[{}].discountPercent", i),
            validate_discount(line.discount_percent),
        )?;
    }
    Ok(())
}

pub fn validate_delivery_order(input: &DeliveryOrderInput) -> Result<(), FieldError> {
    input.validate()?;
    field("customerName", validate_required(&input.customer_name))?;
    validate_quantity_lines(&input.lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GrnLineInput, SalesOrderLineInput};
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn grn_line(qty: i64) -> GrnLineInput {
        GrnLineInput {
            item_id: 1,
            quantity: Decimal::from(qty),
            unit_cost: Decimal::from(3),
            batch_number: None,
            manufacture_date: None,
            expiry_date: None,
            location_id: None,
        }
    }

    fn grn(lines: Vec<GrnLineInput>) -> GrnInput {
        GrnInput {
            supplier_id: None,
            supplier_name: "Al Noor Trading".to_string(),
            warehouse_id: 1,
            receipt_date: date(2024, 5, 1),
            notes: None,
            lines,
        }
    }

    #[test]
    fn test_item_code() {
        assert!(validate_item_code("BOLT-10_A").is_ok());
        assert!(validate_item_code("").is_err());
        assert!(validate_item_code("bad code").is_err());
        assert!(validate_item_code(&"X".repeat(31)).is_err());
    }

    #[test]
    fn test_date_order() {
        assert!(validate_date_order(Some(date(2024, 1, 1)), Some(date(2025, 1, 1))).is_ok());
        assert!(validate_date_order(Some(date(2024, 1, 1)), Some(date(2024, 1, 1))).is_err());
        assert!(validate_date_order(None, Some(date(2024, 1, 1))).is_ok());
    }

    #[test]
    fn test_alert_threshold_range() {
        assert!(validate_alert_threshold(Decimal::new(15, 2)).is_ok());
        assert!(validate_alert_threshold(Decimal::ONE).is_ok());
        assert!(validate_alert_threshold(Decimal::ZERO).is_err());
        assert!(validate_alert_threshold(Decimal::new(-1, 1)).is_err());
        assert!(validate_alert_threshold(Decimal::new(11, 1)).is_err());
    }

    #[test]
    fn test_stock_levels() {
        assert!(validate_stock_levels(Some(Decimal::from(5)), Some(Decimal::from(10))).is_ok());
        assert!(validate_stock_levels(Some(Decimal::from(15)), Some(Decimal::from(10))).is_err());
        assert!(validate_stock_levels(Some(Decimal::from(-1)), None).is_err());
        // a zero maximum means "no maximum"
        assert!(validate_stock_levels(Some(Decimal::from(15)), Some(Decimal::ZERO)).is_ok());
    }

    #[test]
    fn test_grn_requires_lines() {
        let err = validate_grn(&grn(vec![])).unwrap_err();
        assert_eq!(err.field, "lines");
        assert_eq!(err.message, "At least one line is required");
    }

    #[test]
    fn test_grn_line_rules() {
        assert!(validate_grn(&grn(vec![grn_line(5)])).is_ok());

        let err = validate_grn(&grn(vec![grn_line(5), grn_line(0)])).unwrap_err();
        assert_eq!(err.field, "lines[1].quantity");

        let mut line = grn_line(5);
        line.manufacture_date = Some(date(2024, 6, 1));
        line.expiry_date = Some(date(2024, 1, 1));
        let err = validate_grn(&grn(vec![line])).unwrap_err();
        assert_eq!(err.field, "lines[0].expiryDate");
    }

    #[test]
    fn test_grn_blank_supplier() {
        let mut input = grn(vec![grn_line(1)]);
        input.supplier_name = "   ".to_string();
        assert_eq!(validate_grn(&input).unwrap_err().field, "supplierName");
    }

    #[test]
    fn test_transfer_rules() {
        let snapshot = StockSnapshot {
            warehouse_id: 1,
            available: HashMap::from([(7, Decimal::from(10))]),
        };
        let mut input = TransferInput {
            from_warehouse_id: 1,
            to_warehouse_id: 1,
            transfer_date: date(2024, 5, 1),
            notes: None,
            lines: vec![QuantityLine { item_id: 7, quantity: Decimal::from(4) }],
        };
        assert_eq!(
            validate_transfer(&input, Some(&snapshot)).unwrap_err().field,
            "toWarehouseId"
        );

        input.to_warehouse_id = 2;
        assert!(validate_transfer(&input, Some(&snapshot)).is_ok());

        input.lines.push(QuantityLine { item_id: 7, quantity: Decimal::from(7) });
        let err = validate_transfer(&input, Some(&snapshot)).unwrap_err();
        assert_eq!(err.field, "lines[0].quantity");
        assert!(err.message.contains("exceeds available stock 10"));

        // without a snapshot only the static rules apply
        assert!(validate_transfer(&input, None).is_ok());
    }

    #[test]
    fn test_sales_order_rules() {
        let mut input = SalesOrderInput {
            customer_id: Some(3),
            customer_name: "Gulf Retail".to_string(),
            quotation_id: None,
            order_date: date(2024, 5, 10),
            delivery_date: Some(date(2024, 5, 9)),
            notes: None,
            lines: vec![SalesOrderLineInput {
                item_id: 1,
                quantity: Decimal::from(2),
                unit_price: Decimal::from(10),
                discount_percent: Decimal::from(5),
            }],
        };
        assert_eq!(validate_sales_order(&input).unwrap_err().field, "deliveryDate");

        input.delivery_date = Some(date(2024, 5, 12));
        assert!(validate_sales_order(&input).is_ok());

        input.lines[0].discount_percent = Decimal::from(101);
        assert_eq!(
            validate_sales_order(&input).unwrap_err().field,
            "lines[0].discountPercent"
        );
    }

    #[test]
    fn test_stock_input_reserved_bound() {
        let input = StockInput {
            item_id: 1,
            warehouse_id: 1,
            location_id: None,
            quantity_on_hand: Decimal::from(5),
            average_cost: Decimal::ONE,
            quantity_reserved: Decimal::from(6),
        };
        assert_eq!(validate_stock_input(&input).unwrap_err().field, "quantityReserved");
    }
}
