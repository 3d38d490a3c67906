use serde::{Deserialize, Serialize};

/// One page of a paginated result, in the backend's pageable layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
    pub size: u32,
    /// Zero-based page index.
    pub number: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        !self.last
    }

    /// Index of the following page. Stops at `total_pages` even when the
    /// backend never flags a page as the last one.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        if self.last {
            return None;
        }
        self.number
            .checked_add(1)
            .filter(|next| *next < self.total_pages)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_ignores_unknown_pageable_fields() {
        let json = r#"{
            "content": [1, 2],
            "pageable": {"pageNumber": 0, "pageSize": 2},
            "totalPages": 3,
            "totalElements": 5,
            "size": 2,
            "number": 0,
            "numberOfElements": 2,
            "first": true,
            "last": false,
            "empty": false
        }"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.content, vec![1, 2]);
        assert!(page.has_next());
        assert_eq!(page.next_page(), Some(1));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = Page::<u32> {
            content: vec![],
            total_pages: 1,
            total_elements: 0,
            size: 20,
            number: 0,
            first: true,
            last: true,
            empty: true,
        };
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn test_next_page_capped_by_total_pages() {
        let mut page = Page::<u32> {
            content: vec![1],
            total_pages: 2,
            total_elements: 2,
            size: 1,
            number: 1,
            first: false,
            last: false,
            empty: false,
        };
        assert_eq!(page.next_page(), None);

        page.number = 0;
        assert_eq!(page.next_page(), Some(1));

        page.total_pages = 0;
        assert_eq!(page.next_page(), None);
    }
}
