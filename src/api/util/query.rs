//
//  bitbucket-ide
//  api/util/query.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Query Builders
//!
//! [`UrlQueryBuilder`] assembles percent-encoded URL query strings;
//! [`SearchQueryBuilder`] assembles the `qualifier:value` search syntax used
//! by the issue and pull request search endpoints.

use std::fmt::Write as _;

use url::form_urlencoded::byte_serialize;

/// Builds a `?a=b&c=d` query string with percent-encoded values.
///
/// Parameters passed as `None` are skipped, so optional filters chain
/// without branching at the call site.
#[derive(Debug, Default)]
pub struct UrlQueryBuilder {
    query: String,
}

impl UrlQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name=value` when `value` is present.
    pub fn param(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.push_separator();
            let encoded: String = byte_serialize(value.as_bytes()).collect();
            let _ = write!(self.query, "{name}={encoded}");
        }
        self
    }

    /// Appends standard `page` and `per_page` parameters.
    pub fn pagination(self, page: Option<usize>, per_page: Option<usize>) -> Self {
        self.param("page", page.map(|p| p.to_string()).as_deref())
            .param("per_page", per_page.map(|p| p.to_string()).as_deref())
    }

    /// Renders the accumulated query, with its leading `?`, or an empty
    /// string when no parameter was added.
    pub fn build(self) -> String {
        self.query
    }

    fn push_separator(&mut self) {
        self.query.push(if self.query.is_empty() { '?' } else { '&' });
    }
}

/// Builds a search query in the `qualifier:value` syntax.
#[derive(Debug, Default)]
pub struct SearchQueryBuilder {
    terms: Vec<String>,
}

impl SearchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `name:value` qualifier when `value` is present.
    pub fn qualifier(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.terms.push(format!("{name}:{value}"));
        }
        self
    }

    /// Appends free search text.
    pub fn text(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.terms.push(text.to_string());
        }
        self
    }

    /// Joins all terms with single spaces.
    pub fn build(self) -> String {
        self.terms.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_builder_encodes_and_joins() {
        let query = UrlQueryBuilder::new()
            .param("q", Some("repo:acme/ide plugin"))
            .param("state", Some("open"))
            .build();
        assert_eq!(query, "?q=repo%3Aacme%2Fide+plugin&state=open");
    }

    #[test]
    fn url_builder_skips_absent_params() {
        let query = UrlQueryBuilder::new()
            .param("q", None)
            .pagination(None, Some(50))
            .build();
        assert_eq!(query, "?per_page=50");
    }

    #[test]
    fn url_builder_is_empty_without_params() {
        assert_eq!(UrlQueryBuilder::new().param("q", None).build(), "");
    }

    #[test]
    fn search_builder_joins_qualifiers_and_text() {
        let query = SearchQueryBuilder::new()
            .qualifier("repo", Some("acme/ide-plugin"))
            .qualifier("state", None)
            .qualifier("type", Some("pr"))
            .text("fix panic")
            .build();
        assert_eq!(query, "repo:acme/ide-plugin type:pr fix panic");
    }
}
