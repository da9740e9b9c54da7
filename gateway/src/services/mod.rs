//! Business logic services for the inventory gateway

pub mod catalog;
pub mod counting;
pub mod dispatch;
pub mod receiving;
pub mod reporting;
pub mod sales;
pub mod stock;
pub mod store;
pub mod transfer;
pub mod valuation;

pub use catalog::CatalogService;
pub use counting::CountingService;
pub use dispatch::DispatchService;
pub use receiving::ReceivingService;
pub use reporting::ReportingService;
pub use sales::SalesService;
pub use stock::StockService;
pub use store::{EntityStore, Stores};
pub use transfer::TransferService;
pub use valuation::ValuationService;

use std::future::Future;

use shared::{DocumentStatus, Notice};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};

/// Run a load under a cancellation token; a cancelled load yields no result
pub async fn cancellable<F, T>(token: &CancellationToken, load: F) -> AppResult<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AppError::Cancelled),
        out = load => Ok(out),
    }
}

/// Turn one source of a fan-out into data, degrading a failure into a notice
pub fn settle<T>(source: &str, result: AppResult<Vec<T>>, notices: &mut Vec<Notice>) -> Vec<T> {
    match result {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(source, error = %e, "Source failed, continuing without it");
            notices.push(Notice::load_failed(source, e.upstream_message()));
            Vec::new()
        }
    }
}

/// Refuse a workflow action the document's known status does not allow
///
/// Documents not held in memory, or with a status we do not recognize, are
/// passed through and the backend decides.
pub fn ensure_action(
    status: Option<DocumentStatus>,
    allowed: fn(&DocumentStatus) -> bool,
    action: &str,
) -> AppResult<()> {
    match status {
        Some(s) if s != DocumentStatus::Unknown && !allowed(&s) => Err(AppError::Validation {
            field: "status".to_string(),
            message: format!("Cannot {} a document that is {}", action, s),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_keeps_data_on_success() {
        let mut notices = Vec::new();
        let out = settle("items", Ok(vec![1, 2]), &mut notices);
        assert_eq!(out, vec![1, 2]);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_settle_degrades_failure_to_notice() {
        let mut notices = Vec::new();
        let out: Vec<i32> = settle(
            "stocks",
            Err(AppError::Upstream {
                status: 500,
                message: Some("db down".into()),
            }),
            &mut notices,
        );
        assert!(out.is_empty());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].source, "stocks");
        assert_eq!(notices[0].message_en, "Could not load stocks: db down");
    }

    #[test]
    fn test_ensure_action() {
        assert!(ensure_action(None, DocumentStatus::can_edit, "edit").is_ok());
        assert!(ensure_action(Some(DocumentStatus::Unknown), DocumentStatus::can_edit, "edit").is_ok());
        assert!(ensure_action(Some(DocumentStatus::Draft), DocumentStatus::can_submit, "submit").is_ok());

        let err = ensure_action(Some(DocumentStatus::Finalized), DocumentStatus::can_edit, "edit")
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { field, .. } if field == "status"));
    }

    #[tokio::test]
    async fn test_cancelled_token_wins() {
        let token = CancellationToken::new();
        token.cancel();
        let out = cancellable(&token, async { 5 }).await;
        assert!(matches!(out, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_live_token_passes_result() {
        let token = CancellationToken::new();
        assert_eq!(cancellable(&token, async { 5 }).await.unwrap(), 5);
    }
}
