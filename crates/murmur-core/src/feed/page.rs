//! Page types for paginated list endpoints.

use serde::{Deserialize, Serialize};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Parameters for fetching one page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Maximum items per page.
    pub limit: u32,
    /// Optional free-text search filter.
    pub search: Option<String>,
}

impl PageRequest {
    /// Request the first page with the given limit.
    pub fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: None,
        }
    }

    /// Set the search filter. Blank strings clear it.
    pub fn with_search(mut self, search: Option<impl Into<String>>) -> Self {
        self.search = search
            .map(Into::into)
            .filter(|s: &String| !s.trim().is_empty());
        self
    }

    /// Same parameters, different page.
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Query parameters in wire order: `page`, `limit`, then `search` if set.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_LIMIT)
    }
}

/// Pagination metadata block returned alongside each page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub total: u64,
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
}

impl PageMeta {
    /// Returns true if another page can be requested after this one.
    pub fn has_more(&self) -> bool {
        self.has_next_page && self.total_pages.is_none_or(|total| self.page < total)
    }
}

/// One fetched page of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// The page number this page was served as.
    pub page: u32,
    /// Whether a further page exists.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a page directly.
    pub fn new(items: Vec<T>, page: u32, has_more: bool) -> Self {
        Self {
            items,
            page,
            has_more,
        }
    }

    /// Build a page from the wire metadata block and its documents.
    pub fn from_meta(meta: &PageMeta, docs: Vec<T>) -> Self {
        Self::new(docs, meta.page, meta.has_more())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_pairs_skip_blank_search() {
        let request = PageRequest::first(20).with_search(Some("  "));
        assert_eq!(
            request.query_pairs(),
            vec![("page", "1".to_string()), ("limit", "20".to_string())]
        );

        let request = PageRequest::first(20).with_search(Some("rust")).at_page(3);
        assert_eq!(
            request.query_pairs(),
            vec![
                ("page", "3".to_string()),
                ("limit", "20".to_string()),
                ("search", "rust".to_string())
            ]
        );
    }

    #[test]
    fn meta_deserializes_and_reports_more() {
        let meta: PageMeta = serde_json::from_value(json!({
            "total": 25,
            "page": 1,
            "limit": 10,
            "totalPages": 3,
            "hasNextPage": true,
            "hasPreviousPage": false
        }))
        .unwrap();
        assert!(meta.has_more());

        let last = PageMeta {
            page: 3,
            has_next_page: false,
            ..meta.clone()
        };
        assert!(!last.has_more());
    }

    #[test]
    fn has_next_beyond_total_pages_is_ignored() {
        let meta = PageMeta {
            total: 20,
            page: 2,
            limit: 10,
            total_pages: Some(2),
            has_next_page: true,
            has_previous_page: true,
        };
        assert!(!meta.has_more());
    }

    #[test]
    fn page_from_meta() {
        let meta: PageMeta =
            serde_json::from_value(json!({"page": 2, "hasNextPage": false})).unwrap();
        let page = Page::from_meta(&meta, vec!["d", "e"]);
        assert_eq!(page.page, 2);
        assert!(!page.has_more);
        assert_eq!(page.len(), 2);
    }
}
