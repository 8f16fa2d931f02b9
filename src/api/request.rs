//
//  bitbucket-ide
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Typed API Request Model
//!
//! An [`ApiRequest`] describes *what* to call and *how* to interpret the
//! result, independent of how the call is transported. It carries the URL,
//! a method descriptor, the eagerly-serialized body, MIME declarations,
//! extra headers, the authorization-header kind, and a pure extraction
//! closure that turns a completed [`ApiResponse`] into the typed result.
//!
//! ## Extraction Families
//!
//! Three JSON flavors are supported uniformly, each parametrized over the
//! item type:
//!
//! | Constructor | Result |
//! |-------------|--------|
//! | [`ApiRequest::get_json`] | single object `T` |
//! | [`ApiRequest::get_json_list`] | `Vec<T>` |
//! | [`ApiRequest::get_json_page`] | [`ResponsePage<T>`] (list + `Link` header) |
//! | [`ApiRequest::get_json_search_page`] | [`ResponsePage<T>`] from a search envelope |
//! | [`ApiRequest::get_optional_json`] | `Option<T>`, `None` on HTTP 404 |
//!
//! Body-bearing constructors (`post_json`, `put_json`, `patch_json`,
//! `delete_json`) always declare a body MIME type; body-less requests never
//! do. A GraphQL family building on `POST` lives in
//! [`crate::api::graphql::requests`].
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_ide::api::ApiRequest;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Repo { name: String }
//!
//! let request = ApiRequest::<Repo>::get_json("https://api.bitbucket.org/2.0/repositories/acme/widget")
//!     .with_operation_name("get repository");
//! assert_eq!(request.operation_name(), Some("get repository"));
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::common::{ApiError, ResponsePage, SearchResult, LINK_HEADER};
use crate::api::response::ApiResponse;

/// MIME type used for JSON request bodies and default accepts.
pub const JSON_MIME_TYPE: &str = "application/json";

/// HTTP method descriptor for a request value.
///
/// Kept as an explicit field rather than dispatching on request subtypes;
/// the executor owns a single transport-builder keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    /// HTTP GET.
    Get,
    /// HTTP HEAD.
    Head,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
}

impl ApiMethod {
    /// The corresponding transport method.
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Head => reqwest::Method::HEAD,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Kind of `Authorization` header scheme a request wants for token auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenHeaderKind {
    /// `Authorization: token <secret>` - the REST default.
    #[default]
    Token,
    /// `Authorization: Bearer <secret>` - forced by GraphQL requests.
    Bearer,
}

impl TokenHeaderKind {
    /// The scheme string placed before the secret in the header value.
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Bearer => "Bearer",
        }
    }
}

type Extractor<T> = Box<dyn Fn(&dyn ApiResponse) -> Result<T, ApiError> + Send + Sync>;
type Fallback<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Immutable description of one API call with a strictly defined response
/// type.
///
/// Constructed by the factory functions below (or the endpoint factories in
/// [`crate::api::requests`]); immutable after construction except for the
/// operation-name annotation, which may be attached once builder-style via
/// [`ApiRequest::with_operation_name`].
pub struct ApiRequest<T> {
    url: String,
    method: ApiMethod,
    body: Option<String>,
    body_mime: Option<&'static str>,
    accept: Option<String>,
    headers: Vec<(String, String)>,
    token_kind: TokenHeaderKind,
    operation_name: Option<String>,
    not_found_fallback: Option<Fallback<T>>,
    extract: Extractor<T>,
}

impl<T> ApiRequest<T> {
    pub(crate) fn new(method: ApiMethod, url: impl Into<String>, extract: Extractor<T>) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            body_mime: None,
            accept: Some(JSON_MIME_TYPE.to_string()),
            headers: Vec::new(),
            token_kind: TokenHeaderKind::default(),
            operation_name: None,
            not_found_fallback: None,
            extract,
        }
    }

    pub(crate) fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self.body_mime = Some(JSON_MIME_TYPE);
        self
    }

    /// Marks a body-less mutating request so the transport sends an explicit
    /// empty payload.
    pub(crate) fn with_empty_body_marker(mut self) -> Self {
        self.headers.push(("Content-Length".to_string(), "0".to_string()));
        self
    }

    pub(crate) fn with_token_kind(mut self, kind: TokenHeaderKind) -> Self {
        self.token_kind = kind;
        self
    }

    pub(crate) fn with_not_found_fallback(mut self, fallback: Fallback<T>) -> Self {
        self.not_found_fallback = Some(fallback);
        self
    }

    /// Attaches a human-readable operation name used only for diagnostics
    /// ("can't <name>" error enrichment and debug logging).
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Overrides the accept MIME type.
    pub fn with_accept(mut self, mime: impl Into<String>) -> Self {
        self.accept = Some(mime.into());
        self
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP method descriptor.
    pub fn method(&self) -> ApiMethod {
        self.method
    }

    /// Serialized request body, when the request carries one.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// MIME type of the body. Present iff a body is present.
    pub fn body_mime(&self) -> Option<&'static str> {
        self.body_mime
    }

    /// Accept MIME type, when declared.
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Additional headers to send with the request.
    pub fn additional_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Authorization-header scheme kind for token-based executors.
    pub fn token_kind(&self) -> TokenHeaderKind {
        self.token_kind
    }

    /// Diagnostic operation name, when attached.
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// Parses the raw response into the typed result.
    ///
    /// The response must already be status-validated; this performs no I/O
    /// beyond reading the supplied view.
    ///
    /// # Errors
    ///
    /// [`ApiError::MalformedResponse`] when the body fails to parse, or a
    /// GraphQL-classified error for GraphQL requests.
    pub fn extract_result(&self, response: &dyn ApiResponse) -> Result<T, ApiError> {
        (self.extract)(response)
    }

    /// Produces the "absent" value for optional requests.
    ///
    /// The executor calls this to convert an HTTP 404 into a successful
    /// result; only requests built by [`ApiRequest::get_optional_json`] (and
    /// kin) return `Some`.
    pub fn recover_not_found(&self) -> Option<T> {
        self.not_found_fallback.as_ref().map(|produce| produce())
    }
}

impl<T: DeserializeOwned + Send + Sync + 'static> ApiRequest<T> {
    /// GET returning a single JSON object.
    pub fn get_json(url: impl Into<String>) -> Self {
        Self::new(ApiMethod::Get, url, Box::new(parse_json_object::<T>))
    }

    /// GET returning a single JSON object, where HTTP 404 means a legitimate
    /// absence rather than an error.
    ///
    /// The 404-to-`None` conversion happens in the executor; the request
    /// only declares that it is optional.
    pub fn get_optional_json(url: impl Into<String>) -> ApiRequest<Option<T>> {
        ApiRequest::new(
            ApiMethod::Get,
            url,
            Box::new(|response: &dyn ApiResponse| parse_json_object::<T>(response).map(Some)),
        )
        .with_not_found_fallback(Box::new(|| None))
    }

    /// GET returning a JSON array of objects.
    pub fn get_json_list(url: impl Into<String>) -> ApiRequest<Vec<T>> {
        ApiRequest::new(ApiMethod::Get, url, Box::new(parse_json_object::<Vec<T>>))
    }

    /// GET returning one page of a link-paginated collection.
    pub fn get_json_page(url: impl Into<String>) -> ApiRequest<ResponsePage<T>> {
        ApiRequest::new(
            ApiMethod::Get,
            url,
            Box::new(|response: &dyn ApiResponse| {
                let items = parse_json_object::<Vec<T>>(response)?;
                Ok(ResponsePage::parse_from_header(
                    items,
                    response.find_header(LINK_HEADER),
                ))
            }),
        )
    }

    /// GET returning one page of a search result envelope.
    pub fn get_json_search_page(url: impl Into<String>) -> ApiRequest<ResponsePage<T>> {
        ApiRequest::new(
            ApiMethod::Get,
            url,
            Box::new(|response: &dyn ApiResponse| {
                let result = parse_json_object::<SearchResult<T>>(response)?;
                Ok(ResponsePage::parse_from_header(
                    result.items,
                    response.find_header(LINK_HEADER),
                ))
            }),
        )
    }

    /// POST with a JSON body, returning a single JSON object.
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self::new(ApiMethod::Post, url, Box::new(parse_json_object::<T>)).with_body(body.to_string())
    }

    /// PUT with an optional JSON body, returning a single JSON object.
    pub fn put_json(url: impl Into<String>, body: Option<Value>) -> Self {
        let request = Self::new(ApiMethod::Put, url, Box::new(parse_json_object::<T>));
        match body {
            Some(value) => request.with_body(value.to_string()),
            None => request.with_empty_body_marker(),
        }
    }

    /// PATCH with a JSON body, returning a single JSON object.
    pub fn patch_json(url: impl Into<String>, body: Value) -> Self {
        Self::new(ApiMethod::Patch, url, Box::new(parse_json_object::<T>)).with_body(body.to_string())
    }

    /// DELETE with an optional JSON body, returning a single JSON object.
    pub fn delete_json(url: impl Into<String>, body: Option<Value>) -> Self {
        let request = Self::new(ApiMethod::Delete, url, Box::new(parse_json_object::<T>));
        match body {
            Some(value) => request.with_body(value.to_string()),
            None => request.with_empty_body_marker(),
        }
    }
}

impl ApiRequest<()> {
    /// HEAD request; the result is the successful exchange itself.
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(ApiMethod::Head, url, Box::new(|_| Ok(())))
    }

    /// DELETE where the response body is irrelevant.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(ApiMethod::Delete, url, Box::new(|_| Ok(()))).with_empty_body_marker()
    }
}

/// Deserializes the whole response body as `T`.
pub(crate) fn parse_json_object<T: DeserializeOwned>(
    response: &dyn ApiResponse,
) -> Result<T, ApiError> {
    serde_json::from_str(response.body_text()?)
        .map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use serde::Deserialize;

    use crate::api::response::HttpResponse;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Item {
        id: u64,
    }

    fn response(body: &str) -> HttpResponse {
        HttpResponse::new(HeaderMap::new(), body.as_bytes().to_vec())
    }

    fn response_with_link(body: &str, link: &str) -> HttpResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("link"),
            HeaderValue::from_str(link).unwrap(),
        );
        HttpResponse::new(headers, body.as_bytes().to_vec())
    }

    #[test]
    fn get_json_extracts_single_object() {
        let request = ApiRequest::<Item>::get_json("https://h/item/1");
        let item = request.extract_result(&response(r#"{"id": 1}"#)).unwrap();
        assert_eq!(item, Item { id: 1 });
    }

    #[test]
    fn get_json_list_extracts_array() {
        let request = ApiRequest::<Item>::get_json_list("https://h/items");
        let items = request
            .extract_result(&response(r#"[{"id": 1}, {"id": 2}]"#))
            .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn get_json_page_folds_link_header() {
        let request = ApiRequest::<Item>::get_json_page("https://h/items");
        let page = request
            .extract_result(&response_with_link(
                r#"[{"id": 1}]"#,
                "<https://h/items?page=2>; rel=\"next\"",
            ))
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_link(), Some("https://h/items?page=2"));
    }

    #[test]
    fn search_page_unwraps_envelope() {
        let request = ApiRequest::<Item>::get_json_search_page("https://h/search");
        let page = request
            .extract_result(&response(
                r#"{"total_count": 1, "incomplete_results": false, "items": [{"id": 7}]}"#,
            ))
            .unwrap();
        assert_eq!(page.items, vec![Item { id: 7 }]);
        assert!(!page.has_next());
    }

    #[test]
    fn malformed_body_reports_parse_error() {
        let request = ApiRequest::<Item>::get_json("https://h/item/1");
        assert!(matches!(
            request.extract_result(&response("not json")),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn body_mime_present_iff_body_present() {
        let post = ApiRequest::<Item>::post_json("https://h/items", serde_json::json!({"id": 1}));
        assert!(post.body().is_some());
        assert_eq!(post.body_mime(), Some(JSON_MIME_TYPE));

        let get = ApiRequest::<Item>::get_json("https://h/items/1");
        assert!(get.body().is_none());
        assert!(get.body_mime().is_none());

        let put = ApiRequest::<Item>::put_json("https://h/items/1", None);
        assert!(put.body().is_none());
        assert!(put.body_mime().is_none());
        assert!(put
            .additional_headers()
            .iter()
            .any(|(name, value)| name == "Content-Length" && value == "0"));
    }

    #[test]
    fn optional_request_declares_fallback() {
        let request = ApiRequest::<Item>::get_optional_json("https://h/items/404");
        assert_eq!(request.recover_not_found(), Some(None));

        let plain = ApiRequest::<Item>::get_json("https://h/items/1");
        assert!(plain.recover_not_found().is_none());
    }
}
