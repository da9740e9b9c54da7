//! WebAssembly module for Warehouse Inventory Management
//!
//! Lets the browser run the shared computations on data it already holds:
//! - Dual inventory valuation
//! - Periodic stock status report
//! - List search and pagination
//! - Form checks (dates, item codes, stock availability)
//!
//! Payloads cross the boundary as JSON strings in the backend's camelCase shape.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{
    dual_valuation, list_page, periodic_report, summarize, DualValuationRow, ListQuery,
    ReportOptions, ValuationOptions, ValuationSummary,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct ValuationView {
    rows: Vec<DualValuationRow>,
    summary: ValuationSummary,
}

fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Dual valuation of stock balances against the item master
///
/// `threshold` overrides the default 15% alert threshold when given.
#[wasm_bindgen]
pub fn compute_dual_valuation(
    balances_json: &str,
    items_json: &str,
    threshold: Option<f64>,
) -> Result<String, JsValue> {
    let balances: Vec<StockBalance> = parse(balances_json, "balances")?;
    let items: Vec<Item> = parse(items_json, "items")?;

    let mut options = ValuationOptions::default();
    if let Some(t) = threshold {
        options.alert_threshold = to_decimal(t);
    }

    let rows = dual_valuation(&balances, &items, &options);
    let summary = summarize(&rows);
    to_json(&ValuationView { rows, summary })
}

/// Relative divergence between historical cost and replacement price
#[wasm_bindgen]
pub fn compute_divergence(historical: f64, replacement: f64) -> f64 {
    to_f64(shared::divergence(to_decimal(historical), to_decimal(replacement)))
}

/// Periodic stock status report as of a `YYYY-MM-DD` date
#[wasm_bindgen]
pub fn compute_periodic_report(
    balances_json: &str,
    items_json: &str,
    as_of: &str,
    warehouse_id: Option<i64>,
    stagnant_days: Option<i32>,
) -> Result<String, JsValue> {
    let balances: Vec<StockBalance> = parse(balances_json, "balances")?;
    let items: Vec<Item> = parse(items_json, "items")?;
    let as_of = parse_date(as_of).ok_or_else(|| JsValue::from_str("Invalid report date"))?;

    let mut options = ReportOptions::new(as_of);
    options.warehouse_id = warehouse_id;
    if let Some(days) = stagnant_days {
        options.stagnant_days = i64::from(days.max(0));
    }

    to_json(&periodic_report(&balances, &items, &options))
}

/// Search and paginate the item list
#[wasm_bindgen]
pub fn search_items(
    items_json: &str,
    search: &str,
    page: u32,
    per_page: u32,
) -> Result<String, JsValue> {
    let items: Vec<Item> = parse(items_json, "items")?;
    let query = ListQuery {
        search: Some(search.to_string()),
        page: Some(page),
        ..Default::default()
    };
    to_json(&list_page(&items, &query, per_page))
}

/// Check requested lines against the available stock of one warehouse
#[wasm_bindgen]
pub fn check_stock_availability(
    balances_json: &str,
    warehouse_id: i64,
    lines_json: &str,
) -> Result<String, JsValue> {
    let balances: Vec<StockBalance> = parse(balances_json, "balances")?;
    let lines: Vec<QuantityLine> = parse(lines_json, "lines")?;
    let snapshot = StockSnapshot::from_balances(warehouse_id, &balances);
    to_json(&StockCheckResult::from_snapshot(&snapshot, &lines))
}

/// Validate that expiry comes after manufacture (empty strings are ignored)
#[wasm_bindgen]
pub fn validate_expiry_after_manufacture(manufacture: &str, expiry: &str) -> bool {
    validate_date_order(parse_date(manufacture), parse_date(expiry)).is_ok()
}

#[wasm_bindgen]
pub fn is_valid_item_code(code: &str) -> bool {
    validate_item_code(code).is_ok()
}

/// Log a warning to the browser console
#[wasm_bindgen]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// Today's date from the browser clock, as `YYYY-MM-DD`
#[wasm_bindgen]
pub fn today() -> String {
    let now = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    )
}
