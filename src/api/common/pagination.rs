//
//  bitbucket-ide
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination Payload Types for REST Responses
//!
//! REST endpoints paginate with an RFC 5988 style `Link` response header:
//! each page response names the request for the next page, or omits it when
//! the sequence is exhausted. [`ResponsePage`] captures one page of items
//! plus that link.
//!
//! # Termination
//!
//! The absence of a `rel="next"` link is the *sole* termination signal. An
//! intermediate page with zero items is legitimate and must not stop a walk.
//!
//! # Example
//!
//! ```rust
//! use bitbucket_ide::api::common::ResponsePage;
//!
//! let header = r#"<https://api.example.com/repos?page=2>; rel="next", <https://api.example.com/repos?page=9>; rel="last""#;
//! let page = ResponsePage::parse_from_header(vec!["repo-a", "repo-b"], Some(header));
//!
//! assert!(page.has_next());
//! assert_eq!(page.next_link(), Some("https://api.example.com/repos?page=2"));
//! ```

use serde::Deserialize;

/// Response header carrying page-link metadata.
pub const LINK_HEADER: &str = "Link";

/// One page of a link-style paginated REST result.
///
/// # Type Parameters
///
/// - `T` - the item type contained in the page
#[derive(Debug, Clone)]
pub struct ResponsePage<T> {
    /// Items in this page. May legitimately be empty mid-sequence.
    pub items: Vec<T>,

    /// Absolute URL of the next page's request. `None` means last page.
    pub next_link: Option<String>,
}

impl<T> ResponsePage<T> {
    /// Builds a page from its items and the raw `Link` response header.
    ///
    /// The header value is a comma-separated list of `<url>; rel="..."`
    /// entries; only the `rel="next"` entry matters here. A missing or
    /// unparseable header yields a terminal page.
    pub fn parse_from_header(items: Vec<T>, link_header: Option<&str>) -> Self {
        Self {
            items,
            next_link: link_header.and_then(find_next_link),
        }
    }

    /// Whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.next_link.is_some()
    }

    /// The URL of the next page's request, if any.
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }
}

/// Extracts the `rel="next"` target from a `Link` header value.
fn find_next_link(header: &str) -> Option<String> {
    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        if !(target.starts_with('<') && target.ends_with('>')) {
            continue;
        }
        let is_next = parts.any(|param| {
            let param = param.trim().replace(' ', "");
            param == r#"rel="next""# || param == "rel=next"
        });
        if is_next {
            return Some(target[1..target.len() - 1].to_string());
        }
    }
    None
}

/// Envelope returned by search endpoints.
///
/// Search results arrive wrapped rather than as a bare array; the item list
/// still paginates through the `Link` header like any other page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult<T> {
    /// Total number of matches across all pages.
    #[serde(default)]
    pub total_count: u64,

    /// Whether the search timed out and returned a partial result.
    #[serde(default)]
    pub incomplete_results: bool,

    /// Matches in the current page.
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_next_link_among_other_rels() {
        let header = r#"<https://h/x?page=3>; rel="next", <https://h/x?page=1>; rel="first", <https://h/x?page=7>; rel="last""#;
        let page = ResponsePage::parse_from_header(vec![1, 2], Some(header));
        assert_eq!(page.next_link(), Some("https://h/x?page=3"));
    }

    #[test]
    fn missing_header_means_last_page() {
        let page: ResponsePage<u32> = ResponsePage::parse_from_header(vec![], None);
        assert!(!page.has_next());
    }

    #[test]
    fn header_without_next_rel_means_last_page() {
        let header = r#"<https://h/x?page=1>; rel="prev""#;
        let page = ResponsePage::parse_from_header(vec![1], Some(header));
        assert!(!page.has_next());
    }

    #[test]
    fn tolerates_unquoted_rel_param() {
        let header = "<https://h/x?page=2>; rel=next";
        let page = ResponsePage::parse_from_header(vec![1], Some(header));
        assert_eq!(page.next_link(), Some("https://h/x?page=2"));
    }

    #[test]
    fn search_result_deserializes() {
        let json = r#"{"total_count": 2, "incomplete_results": false, "items": ["a", "b"]}"#;
        let result: SearchResult<String> = serde_json::from_str(json).unwrap();
        assert_eq!(result.total_count, 2);
        assert_eq!(result.items.len(), 2);
    }
}
