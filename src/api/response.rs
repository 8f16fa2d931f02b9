//
//  bitbucket-ide
//  api/response.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Response Abstraction
//!
//! [`ApiResponse`] is the narrow view a request's extractor gets of a
//! completed HTTP exchange: header lookup plus body access as text or raw
//! bytes. It decouples the request model from the transport, which keeps
//! extractors pure and lets tests feed canned responses straight into them.

use reqwest::header::HeaderMap;

use crate::api::common::ApiError;

/// Scoped read-only view over one completed, status-validated HTTP exchange.
///
/// Extractors receive this and nothing else; they must not perform any I/O
/// beyond reading it.
pub trait ApiResponse {
    /// Looks up a response header by name (case-insensitive).
    fn find_header(&self, name: &str) -> Option<&str>;

    /// The response body decoded as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] when the body is not valid
    /// UTF-8.
    fn body_text(&self) -> Result<&str, ApiError>;

    /// The raw response body.
    fn body_bytes(&self) -> &[u8];
}

/// [`ApiResponse`] backed by a fully-received HTTP response.
///
/// The executor drains the transport before extraction runs, so the body is
/// owned here and both access modes read the same buffer.
pub struct HttpResponse {
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpResponse {
    /// Wraps received headers and body.
    pub fn new(headers: HeaderMap, body: Vec<u8>) -> Self {
        Self { headers, body }
    }
}

impl ApiResponse for HttpResponse {
    fn find_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn body_text(&self) -> Result<&str, ApiError> {
        std::str::from_utf8(&self.body)
            .map_err(|e| ApiError::MalformedResponse(format!("response body is not UTF-8: {e}")))
    }

    fn body_bytes(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("link"),
            HeaderValue::from_static("<https://h/next>; rel=\"next\""),
        );
        let response = HttpResponse::new(headers, Vec::new());
        assert!(response.find_header("Link").is_some());
        assert!(response.find_header("LINK").is_some());
        assert!(response.find_header("ETag").is_none());
    }

    #[test]
    fn non_utf8_body_is_malformed() {
        let response = HttpResponse::new(HeaderMap::new(), vec![0xff, 0xfe]);
        assert!(matches!(
            response.body_text(),
            Err(ApiError::MalformedResponse(_))
        ));
        assert_eq!(response.body_bytes(), [0xff, 0xfe]);
    }
}
