//! Workflow status shared by inventory and sales documents

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a GRN, issue note, sales order or delivery order
///
/// The backend owns the transitions. The `can_*` helpers only decide which
/// actions a screen offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Pending,
    Submitted,
    Approved,
    Finalized,
    Delivered,
    Cancelled,
    Unknown,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Submitted => "submitted",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Finalized => "finalized",
            DocumentStatus::Delivered => "delivered",
            DocumentStatus::Cancelled => "cancelled",
            DocumentStatus::Unknown => "unknown",
        }
    }

    pub fn can_edit(&self) -> bool {
        matches!(self, DocumentStatus::Draft)
    }

    pub fn can_submit(&self) -> bool {
        matches!(self, DocumentStatus::Draft)
    }

    pub fn can_approve(&self) -> bool {
        matches!(self, DocumentStatus::Pending | DocumentStatus::Submitted)
    }

    pub fn can_finalize(&self) -> bool {
        matches!(self, DocumentStatus::Submitted | DocumentStatus::Approved)
    }

    /// Still waiting on someone, counted as pending on the dashboard
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Draft | DocumentStatus::Pending | DocumentStatus::Submitted
        )
    }
}

impl From<String> for DocumentStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => DocumentStatus::Draft,
            "pending" | "pending_approval" => DocumentStatus::Pending,
            "submitted" => DocumentStatus::Submitted,
            "approved" => DocumentStatus::Approved,
            "finalized" | "finalised" | "completed" | "posted" => DocumentStatus::Finalized,
            "delivered" => DocumentStatus::Delivered,
            "cancelled" | "canceled" | "rejected" => DocumentStatus::Cancelled,
            _ => DocumentStatus::Unknown,
        }
    }
}

impl From<DocumentStatus> for String {
    fn from(value: DocumentStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        let s: DocumentStatus = serde_json::from_str("\"SUBMITTED\"").unwrap();
        assert_eq!(s, DocumentStatus::Submitted);
        let s: DocumentStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(s, DocumentStatus::Finalized);
        let s: DocumentStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(s, DocumentStatus::Unknown);
    }

    #[test]
    fn test_actions_offered() {
        assert!(DocumentStatus::Draft.can_edit());
        assert!(DocumentStatus::Draft.can_submit());
        assert!(!DocumentStatus::Draft.can_finalize());
        assert!(DocumentStatus::Submitted.can_approve());
        assert!(DocumentStatus::Approved.can_finalize());
        assert!(!DocumentStatus::Finalized.can_edit());
        assert!(!DocumentStatus::Cancelled.is_open());
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Approved).unwrap(),
            "\"approved\""
        );
    }
}
