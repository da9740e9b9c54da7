//! Common types used across the workspace

use serde::{Deserialize, Serialize};

/// Identifier used by the ERP backend for every entity
pub type EntityId = i64;

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Arabic,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::English => "en",
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

/// Date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking notification shown alongside a result
///
/// Used when part of a view could not be loaded: the view is still rendered
/// from whatever data arrived, and the notice tells the user what is missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Which data source the notice is about, e.g. `stocks`
    pub source: String,
    pub message_en: String,
    pub message_ar: String,
}

impl Notice {
    pub fn load_failed(source: &str, detail: Option<&str>) -> Self {
        let message_en = match detail {
            Some(d) if !d.trim().is_empty() => format!("Could not load {}: {}", source, d),
            _ => format!("Could not load {}", source),
        };
        Self {
            level: NoticeLevel::Warning,
            source: source.to_string(),
            message_en,
            message_ar: format!("تعذر تحميل البيانات: {}", source),
        }
    }

    pub fn save_failed(source: &str, detail: Option<&str>) -> Self {
        let message_en = match detail {
            Some(d) if !d.trim().is_empty() => format!("Could not save {}: {}", source, d),
            _ => format!("Could not save {}", source),
        };
        Self {
            level: NoticeLevel::Error,
            source: source.to_string(),
            message_en,
            message_ar: format!("تعذر حفظ البيانات: {}", source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_falls_back_to_generic_message() {
        let n = Notice::load_failed("items", None);
        assert_eq!(n.message_en, "Could not load items");
        let n = Notice::load_failed("items", Some("  "));
        assert_eq!(n.message_en, "Could not load items");
        let n = Notice::load_failed("items", Some("timeout"));
        assert_eq!(n.message_en, "Could not load items: timeout");
        assert_eq!(n.level, NoticeLevel::Warning);
    }

    #[test]
    fn test_save_failure_is_an_error_notice() {
        let n = Notice::save_failed("stock 4", Some("locked"));
        assert_eq!(n.message_en, "Could not save stock 4: locked");
        assert_eq!(n.level, NoticeLevel::Error);
    }
}
