//! Shared types and logic for the Warehouse Inventory Management module
//!
//! This crate contains the domain models read from the ERP backend and the
//! pure computations run over them (valuation, periodic report, listing,
//! form validation). It is used by the gateway and, via WASM, by the browser.

pub mod listing;
pub mod models;
pub mod numeric;
pub mod reports;
pub mod types;
pub mod validation;
pub mod valuation;

pub use listing::*;
pub use models::*;
pub use reports::*;
pub use types::*;
pub use validation::*;
pub use valuation::*;
