//! Page-based pagination shared by every repository `index` operation.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Page size used when the client omits `perPage` or sends something unusable
pub const DEFAULT_PER_PAGE: i64 = 10;
/// Upper bound on page size
pub const MAX_PER_PAGE: i64 = 100;

/// Raw pagination query string, e.g. `?perPage=5&page=2`.
///
/// Values are kept as strings so that garbage input falls back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Items per page (default 10)
    pub per_page: Option<String>,
    /// 1-based page number (default 1)
    pub page: Option<String>,
}

/// A normalized page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    per_page: i64,
    page: i64,
}

impl PageRequest {
    /// Build a page request, replacing missing or non-positive values with defaults.
    pub fn new(per_page: Option<i64>, page: Option<i64>) -> Self {
        let per_page = match per_page {
            Some(n) if n > 0 => n.min(MAX_PER_PAGE),
            _ => DEFAULT_PER_PAGE,
        };
        let page = match page {
            Some(n) if n > 0 => n,
            _ => 1,
        };
        Self { per_page, page }
    }

    /// Same as [`PageRequest::new`] with a caller-provided fallback page size.
    pub fn with_default(per_page: Option<i64>, page: Option<i64>, default_per_page: i64) -> Self {
        let fallback = if default_per_page > 0 {
            default_per_page.min(MAX_PER_PAGE)
        } else {
            DEFAULT_PER_PAGE
        };
        let per_page = per_page.filter(|n| *n > 0).unwrap_or(fallback);
        Self::new(Some(per_page), page)
    }

    /// Parse from the query string. Unparseable values count as omitted.
    pub fn from_query(query: &PageQuery, default_per_page: i64) -> Self {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        Self::with_default(parse(&query.per_page), parse(&query.page), default_per_page)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results together with the totals needed to render page metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub current_page: i64,
    pub per_page: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            current_page: request.page(),
            per_page: request.per_page(),
        }
    }

    /// Last page number; an empty result set still has one (empty) page.
    pub fn last_page(&self) -> i64 {
        if self.total <= 0 || self.per_page <= 0 {
            return 1;
        }
        (self.total + self.per_page - 1) / self.per_page
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Project every item, keeping order and page metadata
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            per_page: self.per_page,
        }
    }
}

/// Wire shape of a paginated `data` payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageEnvelope<T> {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub items: Vec<T>,
}

impl<T> From<Paginated<T>> for PageEnvelope<T> {
    fn from(page: Paginated<T>) -> Self {
        let last_page = page.last_page();
        PageEnvelope {
            current_page: page.current_page,
            last_page,
            per_page: page.per_page,
            total: page.total,
            items: page.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_or_invalid_values() {
        let req = PageRequest::new(None, None);
        assert_eq!(req.per_page(), 10);
        assert_eq!(req.page(), 1);

        let req = PageRequest::new(Some(0), Some(-3));
        assert_eq!(req.per_page(), 10);
        assert_eq!(req.page(), 1);

        let req = PageRequest::new(Some(1_000), Some(2));
        assert_eq!(req.per_page(), MAX_PER_PAGE);
        assert_eq!(req.offset(), MAX_PER_PAGE);
    }

    #[test]
    fn from_query_ignores_garbage() {
        let query = PageQuery {
            per_page: Some("abc".to_string()),
            page: Some(" 3 ".to_string()),
        };
        let req = PageRequest::from_query(&query, 10);
        assert_eq!(req.per_page(), 10);
        assert_eq!(req.page(), 3);
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn last_page_rounds_up() {
        let page = Paginated::new(vec![1, 2, 3, 4, 5], 12, PageRequest::new(Some(5), None));
        assert_eq!(page.last_page(), 3);

        let empty: Paginated<i32> = Paginated::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.last_page(), 1);
        assert!(empty.is_empty());
    }

    #[test]
    fn envelope_keeps_metadata_after_map() {
        let page = Paginated::new(vec![1, 2], 7, PageRequest::new(Some(2), Some(4)));
        let envelope: PageEnvelope<String> = page.map(|n| n.to_string()).into();
        assert_eq!(envelope.items, vec!["1", "2"]);
        assert_eq!(envelope.current_page, 4);
        assert_eq!(envelope.last_page, 4);
        assert_eq!(envelope.total, 7);
    }
}
