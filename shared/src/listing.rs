//! Client-side search, filtering and pagination for list screens

use serde::{Deserialize, Serialize};

use crate::models::{
    DeliveryOrder, DocumentStatus, GoodsReceiptNote, Item, Location, SalesOrder, StockIssueNote,
    Transfer, Warehouse,
};
use crate::types::{EntityId, PaginatedResponse, PaginationMeta};

/// Entities that can be found by the list search box
pub trait Searchable {
    /// Text fields matched by the search box
    fn search_fields(&self) -> Vec<&str>;

    fn status(&self) -> Option<DocumentStatus> {
        None
    }

    fn warehouse_id(&self) -> Option<EntityId> {
        None
    }
}

/// Query parameters accepted by every list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub warehouse_id: Option<EntityId>,
    pub page: Option<u32>,
}

/// Case-insensitive substring match over the searchable fields
pub fn matches_search<T: Searchable>(entity: &T, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    entity
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

pub fn filter_list<'a, T: Searchable>(entities: &'a [T], query: &ListQuery) -> Vec<&'a T> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| DocumentStatus::from(s.to_string()));

    entities
        .iter()
        .filter(|e| query.search.as_deref().map_or(true, |s| matches_search(*e, s)))
        .filter(|e| status.map_or(true, |s| e.status() == Some(s)))
        .filter(|e| {
            query
                .warehouse_id
                .map_or(true, |w| e.warehouse_id().map_or(true, |ew| ew == w))
        })
        .collect()
}

/// Slice one page out of a full list; pages are 1-based
pub fn paginate<T: Clone>(entities: &[T], page: u32, per_page: u32) -> PaginatedResponse<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = entities.len() as u64;
    let total_pages = total_items.div_ceil(per_page as u64) as u32;

    let start = (page as usize - 1).saturating_mul(per_page as usize);
    let data = entities
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect();

    PaginatedResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total_items,
            total_pages,
        },
    }
}

/// Filter then paginate, the full cycle a list screen runs
pub fn list_page<T: Searchable + Clone>(
    entities: &[T],
    query: &ListQuery,
    per_page: u32,
) -> PaginatedResponse<T> {
    let filtered: Vec<T> = filter_list(entities, query).into_iter().cloned().collect();
    paginate(&filtered, query.page.unwrap_or(1), per_page)
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

impl Searchable for Item {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.item_code.as_str(),
            self.item_name_ar.as_str(),
            opt(&self.item_name_en),
            opt(&self.category),
        ]
    }
}

impl Searchable for Warehouse {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.code.as_str(), self.name_ar.as_str(), opt(&self.name_en)]
    }
}

impl Searchable for Location {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.code.as_str(), opt(&self.name)]
    }

    fn warehouse_id(&self) -> Option<EntityId> {
        Some(self.warehouse_id)
    }
}

impl Searchable for GoodsReceiptNote {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.grn_number.as_str(), opt(&self.supplier_name), opt(&self.notes)]
    }

    fn status(&self) -> Option<DocumentStatus> {
        Some(self.status)
    }

    fn warehouse_id(&self) -> Option<EntityId> {
        Some(self.warehouse_id)
    }
}

impl Searchable for Transfer {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.transfer_number.as_str(), opt(&self.notes)]
    }

    fn status(&self) -> Option<DocumentStatus> {
        Some(self.status)
    }

    fn warehouse_id(&self) -> Option<EntityId> {
        Some(self.from_warehouse_id)
    }
}

impl Searchable for SalesOrder {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.order_number.as_str(), opt(&self.customer_name), opt(&self.notes)]
    }

    fn status(&self) -> Option<DocumentStatus> {
        Some(self.status)
    }
}

impl Searchable for StockIssueNote {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.issue_number.as_str(), opt(&self.customer_name), opt(&self.notes)]
    }

    fn status(&self) -> Option<DocumentStatus> {
        Some(self.status)
    }

    fn warehouse_id(&self) -> Option<EntityId> {
        Some(self.warehouse_id)
    }
}

impl Searchable for DeliveryOrder {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.delivery_number.as_str(),
            opt(&self.customer_name),
            opt(&self.driver_name),
            opt(&self.vehicle_number),
        ]
    }

    fn status(&self) -> Option<DocumentStatus> {
        Some(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items() -> Vec<Item> {
        (1..=25)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": i,
                    "itemCode": format!("ITM-{:03}", i),
                    "itemNameAr": "صنف",
                    "itemNameEn": if i % 5 == 0 { "Steel Bolt" } else { "Nut" },
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let items = items();
        let query = ListQuery {
            search: Some("steel BOLT".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_list(&items, &query).len(), 5);

        let query = ListQuery {
            search: Some("itm-01".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_list(&items, &query).len(), 10);
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let items = items();
        let query = ListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_list(&items, &query).len(), 25);
    }

    #[test]
    fn test_paginate() {
        let items = items();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.total_items, 25);

        let past_end = paginate(&items, 9, 10);
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.pagination.page, 9);

        let empty: Vec<Item> = Vec::new();
        assert_eq!(paginate(&empty, 1, 10).pagination.total_pages, 0);

        // page zero is treated as the first page
        assert_eq!(paginate(&items, 0, 10).data[0].id, 1);
    }

    #[test]
    fn test_status_filter() {
        let notes: Vec<StockIssueNote> = vec![
            serde_json::from_value(json!({"id": 1, "warehouseId": 1, "status": "draft"})).unwrap(),
            serde_json::from_value(json!({"id": 2, "warehouseId": 2, "status": "APPROVED"})).unwrap(),
        ];
        let query = ListQuery {
            status: Some("approved".to_string()),
            ..Default::default()
        };
        let found = filter_list(&notes, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);

        let query = ListQuery {
            warehouse_id: Some(1),
            ..Default::default()
        };
        assert_eq!(filter_list(&notes, &query)[0].id, 1);
    }
}
