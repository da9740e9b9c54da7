//! HTTP handlers

pub mod catalog;
pub mod counting;
pub mod dispatch;
pub mod health;
pub mod receiving;
pub mod reporting;
pub mod sales;
pub mod stock;
pub mod transfer;

pub use health::health_check;
