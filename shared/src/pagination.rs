//! Pagination envelope for list endpoints
//!
//! ```json
//! { "data": [...], "metadata": { "total": 42, "page": 1, "limit": 20, "totalPages": 3 } }
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// 1-based page, never zero
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for `LIMIT ? OFFSET ?`
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub metadata: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            total.div_ceil(u64::from(limit)) as u32
        } else {
            0
        };
        Self {
            data,
            metadata: PageMeta {
                total,
                page,
                limit,
                total_pages,
            },
        }
    }

    pub fn from_query(data: Vec<T>, total: u64, query: &PageQuery) -> Self {
        Self::new(data, total, query.page(), query.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Paginated::new(vec![1, 2, 3], 41, 1, 20);
        assert_eq!(p.metadata.total_pages, 3);
        let p: Paginated<i32> = Paginated::new(vec![], 0, 1, 20);
        assert_eq!(p.metadata.total_pages, 0);
    }

    #[test]
    fn test_query_defaults_and_clamp() {
        let q = PageQuery::default();
        assert_eq!((q.page(), q.limit(), q.offset()), (1, 20, 0));

        let q = PageQuery {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!((q.page(), q.limit()), (1, MAX_PAGE_SIZE));

        let q = PageQuery {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_envelope_uses_camel_case_total_pages() {
        let json = serde_json::to_value(Paginated::new(vec!["a"], 1, 1, 20)).unwrap();
        assert_eq!(json["metadata"]["totalPages"], 1);
        assert_eq!(json["data"][0], "a");
    }
}
