//! Page arithmetic and the paginated result model.
//!
//! [`QueryService::paginate`](crate::QueryService::paginate) emits a page
//! query plus a count query. The caller binds [`PageRequest::limit`] and
//! [`PageRequest::offset`] under the names in [`PageOptions`], reads both
//! result sets and wraps them with [`PaginatedResult::new`].

use serde::{Deserialize, Serialize};

use crate::error::{OrmError, OrmResult};

/// Sort direction and parameter naming for a paginated select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub ascending: bool,
    pub limit_param: String,
    pub offset_param: String,
}

impl PageOptions {
    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }

    pub fn with_params(
        mut self,
        limit_param: impl Into<String>,
        offset_param: impl Into<String>,
    ) -> Self {
        self.limit_param = limit_param.into();
        self.offset_param = offset_param.into();
        self
    }
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            ascending: true,
            limit_param: "limit".to_string(),
            offset_param: "offset".to_string(),
        }
    }
}

/// A 1-based page request.
///
/// Both fields are at least 1. Deserialization goes through the same checks
/// as [`PageRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u64,
    size: u64,
}

#[derive(Deserialize)]
struct RawPageRequest {
    page: u64,
    size: u64,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = OrmError;

    fn try_from(raw: RawPageRequest) -> OrmResult<Self> {
        Self::new(raw.page, raw.size)
    }
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> OrmResult<Self> {
        if page == 0 {
            return Err(OrmError::invalid_argument("page must be >= 1"));
        }
        if size == 0 {
            return Err(OrmError::invalid_argument("page size must be >= 1"));
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// Number of pages needed for `count` rows.
    pub fn pages_for(&self, count: u64) -> u64 {
        count.div_ceil(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 100 }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// Total number of pages.
    pub pages: u64,
    /// Total number of rows across all pages.
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub fn new(request: &PageRequest, count: u64, results: Vec<T>) -> Self {
        Self {
            pages: request.pages_for(count),
            count,
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            pages: self.pages,
            count: self.count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

impl<T> Default for PaginatedResult<T> {
    fn default() -> Self {
        Self {
            pages: 0,
            count: 0,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_limit() {
        let first = PageRequest::new(1, 25).unwrap();
        assert_eq!((first.limit(), first.offset()), (25, 0));
        let third = PageRequest::new(3, 25).unwrap();
        assert_eq!(third.offset(), 50);
        assert_eq!(PageRequest::default().limit(), 100);
    }

    #[test]
    fn zero_page_or_size_is_rejected() {
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(OrmError::InvalidArgument(_))
        ));
        assert!(matches!(
            PageRequest::new(1, 0),
            Err(OrmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn deserialize_applies_the_same_checks() {
        let req: PageRequest = serde_json::from_str(r#"{"page":3,"size":10}"#).unwrap();
        assert_eq!((req.page(), req.size(), req.offset()), (3, 10, 20));

        for json in [r#"{"page":0,"size":10}"#, r#"{"page":1,"size":0}"#] {
            let err = serde_json::from_str::<PageRequest>(json).unwrap_err();
            assert!(err.to_string().contains("must be >= 1"), "{err}");
        }
    }

    #[test]
    fn request_serializes_its_fields() {
        let req = PageRequest::new(2, 50).unwrap();
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            serde_json::json!({ "page": 2, "size": 50 })
        );
    }

    #[test]
    fn pages_round_up() {
        let req = PageRequest::new(1, 10).unwrap();
        assert_eq!(req.pages_for(0), 0);
        assert_eq!(req.pages_for(10), 1);
        assert_eq!(req.pages_for(11), 2);

        let result = PaginatedResult::new(&req, 21, vec![1, 2, 3]);
        assert_eq!(result.pages, 3);
        assert_eq!(result.map(|n| n * 2).results, [2, 4, 6]);
    }

    #[test]
    fn result_serializes() {
        let result = PaginatedResult {
            pages: 2,
            count: 3,
            results: vec!["a", "b"],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "pages": 2, "count": 3, "results": ["a", "b"] })
        );
    }

    #[test]
    fn options_default_and_overrides() {
        let opts = PageOptions::default();
        assert!(opts.ascending);
        assert_eq!((opts.limit_param.as_str(), opts.offset_param.as_str()), ("limit", "offset"));

        let opts = PageOptions::default().descending().with_params("take", "skip");
        assert!(!opts.ascending);
        assert_eq!(opts.limit_param, "take");
    }
}
