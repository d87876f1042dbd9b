use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

/// Pagination and sort parameters of a list query.
///
/// `sort` uses the API's `field,direction` syntax. When it is `None` the
/// service fills in the entity's default sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Fills in `default_sort` when no explicit sort was requested.
    pub fn sorted_or(mut self, default_sort: &str) -> Self {
        if self.sort.as_deref().map_or(true, str::is_empty) {
            self.sort = Some(default_sort.to_string());
        }
        self
    }
}

/// Sort metadata of a page envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortInfo {
    #[serde(default)]
    pub sorted: bool,
    #[serde(default)]
    pub unsorted: bool,
    #[serde(default)]
    pub empty: bool,
}

/// Paginated list envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub sort: Option<SortInfo>,
}

impl<T> Page<T> {
    /// A single page holding every item, as produced by unpaginated sources.
    pub fn single(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            content,
            total_elements: len as u64,
            total_pages: if len == 0 { 0 } else { 1 },
            number: 0,
            size: len as u32,
            sort: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            sort: self.sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 10);
        assert_eq!(request.sort, None);
        assert_eq!(
            request.sorted_or("executionDate,desc").sort.as_deref(),
            Some("executionDate,desc")
        );
    }

    #[test]
    fn test_explicit_sort_wins() {
        let request = PageRequest::new(2, 25).with_sort("name,asc");
        assert_eq!(
            request.sorted_or("executionDate,desc").sort.as_deref(),
            Some("name,asc")
        );
    }

    #[test]
    fn test_page_envelope_deserializes() {
        let json = r#"{
            "content": [1, 2, 3],
            "totalElements": 13,
            "totalPages": 2,
            "number": 0,
            "size": 10,
            "sort": {"sorted": true, "unsorted": false, "empty": false}
        }"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.content, vec![1, 2, 3]);
        assert_eq!(page.total_elements, 13);
        assert!(!page.is_last());
        assert!(page.sort.unwrap().sorted);
    }

    #[test]
    fn test_page_envelope_tolerates_missing_fields() {
        let page: Page<u32> = serde_json::from_str("{}").unwrap();
        assert!(page.is_empty());
        assert!(page.is_last());
    }
}
