//! External API integrations

pub mod envelope;
pub mod erp_api;

pub use erp_api::ErpApiClient;
