//
//  bitbucket-ide
//  api/graphql/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GraphQL Support
//!
//! Envelope types and request constructors for the GraphQL endpoint. A
//! GraphQL call is an ordinary [`ApiRequest`] POST whose body is
//! `{"query": <document>, "variables": <object>}`, with the authorization
//! scheme forced to `Bearer`. The query document is resolved from the
//! registry in [`queries`] by symbolic name.
//!
//! ## Result Shapes
//!
//! Three shapes of response interpretation are supported:
//!
//! - [`query_parsed`]: the typed result *is* the `data` object
//! - [`query_traversed`]: walk a fixed path of field names below `data`;
//!   a missing or null terminal value is an error
//! - [`query_traversed_optional`]: same walk, but a missing/null terminal
//!   value with no reported errors yields `None`
//!
//! ## Error Classification
//!
//! When the envelope carries structured errors, any error whose type code is
//! `INSUFFICIENT_SCOPES` (case-insensitive) raises
//! [`ApiError::Authentication`]; anything else raises
//! [`ApiError::Unexpected`] carrying the full error list for diagnostics.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::api::common::ApiError;
use crate::api::request::{ApiMethod, ApiRequest, TokenHeaderKind};
use crate::api::response::ApiResponse;
use crate::api::settings::DEFAULT_PAGE_SIZE;

pub mod queries;
pub mod requests;

/// GraphQL connection page info: cursors plus traversal flags.
///
/// Cursors are opaque server tokens and must be round-tripped verbatim.
/// `has_next_page == false` is the sole forward-termination signal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLPageInfo {
    /// Cursor of the first node in the page.
    pub start_cursor: Option<String>,
    /// Cursor of the last node in the page; feed back as `after` to advance.
    pub end_cursor: Option<String>,
    /// Whether a forward page exists.
    pub has_next_page: bool,
    /// Whether a backward page exists.
    #[serde(default)]
    pub has_previous_page: bool,
}

/// A GraphQL connection: an ordered node list plus its page info.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLConnection<T> {
    /// Pagination metadata for this slice of the connection.
    pub page_info: GraphQLPageInfo,
    /// Nodes in this slice.
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

/// Wrapper for search queries, whose connection sits under a `search` field.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLSearchResult<T> {
    /// The connection of matches.
    pub search: GraphQLConnection<T>,
}

/// The generic `{data, errors}` GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    /// Payload; `None` or JSON null when the query failed outright.
    pub data: Option<T>,
    /// Structured errors reported by the server.
    pub errors: Option<Vec<GraphQLError>>,
}

/// One structured error from a GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Type classification code, e.g. `INSUFFICIENT_SCOPES` or `NOT_FOUND`.
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    /// Path within the query the error relates to.
    #[serde(default)]
    pub path: Option<Vec<Value>>,
}

/// Cursor- or timestamp-based pagination parameters for a GraphQL request.
///
/// The two advance strategies are mutually exclusive: a loader walking
/// forward supplies the cursor, a loader refreshing "everything changed
/// since the last sync" supplies the timestamp.
#[derive(Debug, Clone, Default)]
pub struct GraphQLRequestPagination {
    /// Opaque cursor after which to fetch, for forward walks.
    pub after_cursor: Option<String>,
    /// Lower bound on update time, for timestamp refreshes.
    pub since: Option<DateTime<Utc>>,
    /// Requested page size.
    pub page_size: usize,
}

impl GraphQLRequestPagination {
    /// Forward-walk pagination from an optional cursor.
    pub fn cursor(after_cursor: Option<String>, page_size: usize) -> Self {
        Self {
            after_cursor,
            since: None,
            page_size,
        }
    }

    /// Timestamp-refresh pagination from an optional lower bound.
    pub fn since(since: Option<DateTime<Utc>>, page_size: usize) -> Self {
        Self {
            after_cursor: None,
            since,
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    /// The `since` bound rendered for a query variable, when present.
    pub fn since_variable(&self) -> Value {
        self.since
            .map(|ts| Value::String(ts.to_rfc3339()))
            .unwrap_or(Value::Null)
    }

    /// The cursor rendered for a query variable, when present.
    pub fn cursor_variable(&self) -> Value {
        self.after_cursor
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null)
    }
}

/// GraphQL query POST whose typed result is the whole `data` object.
///
/// # Panics
///
/// Panics if `query_name` is not registered; see [`queries::load_query`].
pub fn query_parsed<T: DeserializeOwned + Send + Sync + 'static>(
    url: impl Into<String>,
    query_name: &str,
    variables: Value,
) -> ApiRequest<T> {
    gql_post(url, query_name, variables, Box::new(extract_parsed::<T>))
}

/// GraphQL query POST whose payload sits below `data` at a fixed field path.
///
/// A missing path or a null payload on an otherwise successful response is
/// reported as [`ApiError::MalformedResponse`]: the entity was declared
/// non-nullable.
///
/// # Panics
///
/// Panics if `query_name` is not registered; see [`queries::load_query`].
pub fn query_traversed<T: DeserializeOwned + Send + Sync + 'static>(
    url: impl Into<String>,
    query_name: &str,
    variables: Value,
    path_from_data: &'static [&'static str],
) -> ApiRequest<T> {
    gql_post(
        url,
        query_name,
        variables,
        Box::new(move |response: &dyn ApiResponse| {
            traverse_response::<T>(response, path_from_data)?.ok_or_else(|| {
                ApiError::MalformedResponse(
                    "Non-nullable entity is null or entity path is invalid".to_string(),
                )
            })
        }),
    )
}

/// Like [`query_traversed`], but a missing or null terminal value yields
/// `None` instead of an error.
///
/// # Panics
///
/// Panics if `query_name` is not registered; see [`queries::load_query`].
pub fn query_traversed_optional<T: DeserializeOwned + Send + Sync + 'static>(
    url: impl Into<String>,
    query_name: &str,
    variables: Value,
    path_from_data: &'static [&'static str],
) -> ApiRequest<Option<T>> {
    gql_post(
        url,
        query_name,
        variables,
        Box::new(move |response: &dyn ApiResponse| traverse_response::<T>(response, path_from_data)),
    )
}

fn gql_post<T>(
    url: impl Into<String>,
    query_name: &str,
    variables: Value,
    extract: Box<dyn Fn(&dyn ApiResponse) -> Result<T, ApiError> + Send + Sync>,
) -> ApiRequest<T> {
    let query = queries::load_query(query_name);
    let body = serde_json::json!({
        "query": query,
        "variables": variables,
    });
    ApiRequest::new(ApiMethod::Post, url, extract)
        .with_body(body.to_string())
        .with_token_kind(TokenHeaderKind::Bearer)
}

fn extract_parsed<T: DeserializeOwned>(response: &dyn ApiResponse) -> Result<T, ApiError> {
    let envelope: GraphQLResponse<T> = crate::api::request::parse_json_object(response)?;
    match (envelope.data, envelope.errors) {
        (Some(data), _) => Ok(data),
        (None, Some(errors)) => Err(classify_errors(&errors)),
        (None, None) => Err(ApiError::Unexpected(
            "Undefined request state - both data and errors are null".to_string(),
        )),
    }
}

/// Walks `path_from_data` below the envelope's `data` object.
///
/// Returns `Ok(None)` when the path is absent or terminates in null and the
/// server reported no errors.
fn traverse_response<T: DeserializeOwned>(
    response: &dyn ApiResponse,
    path_from_data: &[&str],
) -> Result<Option<T>, ApiError> {
    let envelope: GraphQLResponse<Value> = crate::api::request::parse_json_object(response)?;

    if let Some(data) = envelope.data.filter(|d| !d.is_null()) {
        let mut node = &data;
        let mut path_valid = true;
        for field in path_from_data {
            match node.get(field) {
                Some(next) => node = next,
                None => {
                    path_valid = false;
                    break;
                }
            }
        }
        if path_valid && !node.is_null() {
            let value = serde_json::from_value(node.clone())
                .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
            return Ok(Some(value));
        }
    }

    match envelope.errors {
        None => Ok(None),
        Some(errors) => Err(classify_errors(&errors)),
    }
}

/// Maps a non-empty GraphQL error list to the error taxonomy.
fn classify_errors(errors: &[GraphQLError]) -> ApiError {
    let insufficient_scopes = errors.iter().any(|e| {
        e.error_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("INSUFFICIENT_SCOPES"))
    });
    if insufficient_scopes {
        return ApiError::Authentication(
            "Access token has not been granted the required scopes.".to_string(),
        );
    }

    let rendered: Vec<String> = errors
        .iter()
        .map(|e| {
            let message = e.message.as_deref().unwrap_or("<no message>");
            match e.error_type.as_deref() {
                Some(kind) => format!("[{kind}] {message}"),
                None => message.to_string(),
            }
        })
        .collect();
    ApiError::Unexpected(rendered.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use serde::Deserialize;

    use crate::api::response::HttpResponse;

    #[derive(Deserialize, Debug, PartialEq)]
    struct PullRequest {
        number: u64,
    }

    fn response(body: &str) -> HttpResponse {
        HttpResponse::new(HeaderMap::new(), body.as_bytes().to_vec())
    }

    #[test]
    fn gql_requests_force_bearer_scheme() {
        let request = query_parsed::<Value>(
            "https://h/graphql",
            queries::FIND_PULL_REQUEST,
            serde_json::json!({}),
        );
        assert_eq!(request.token_kind(), TokenHeaderKind::Bearer);
        assert!(request.body().unwrap().contains("\"query\""));
        assert!(request.body().unwrap().contains("\"variables\""));
    }

    #[test]
    fn traversed_optional_null_payload_yields_none() {
        let request = query_traversed_optional::<PullRequest>(
            "https://h/graphql",
            queries::FIND_PULL_REQUEST,
            serde_json::json!({}),
            &["repository", "pullRequest"],
        );
        let body = r#"{"data":{"repository":{"pullRequest":null}},"errors":null}"#;
        assert_eq!(request.extract_result(&response(body)).unwrap(), None);
    }

    #[test]
    fn traversed_required_null_payload_is_malformed() {
        let request = query_traversed::<PullRequest>(
            "https://h/graphql",
            queries::FIND_PULL_REQUEST,
            serde_json::json!({}),
            &["repository", "pullRequest"],
        );
        let body = r#"{"data":{"repository":{"pullRequest":null}},"errors":null}"#;
        let err = request.extract_result(&response(body)).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
        assert!(err.to_string().contains("Non-nullable entity is null"));
    }

    #[test]
    fn traversed_extracts_payload() {
        let request = query_traversed::<PullRequest>(
            "https://h/graphql",
            queries::FIND_PULL_REQUEST,
            serde_json::json!({}),
            &["repository", "pullRequest"],
        );
        let body = r#"{"data":{"repository":{"pullRequest":{"number": 42}}}}"#;
        let pr = request.extract_result(&response(body)).unwrap();
        assert_eq!(pr, PullRequest { number: 42 });
    }

    #[test]
    fn insufficient_scopes_classifies_as_authentication() {
        let request = query_parsed::<PullRequest>(
            "https://h/graphql",
            queries::FIND_PULL_REQUEST,
            serde_json::json!({}),
        );
        let body = r#"{"data":null,"errors":[{"type":"insufficient_scopes","message":"nope"}]}"#;
        assert!(matches!(
            request.extract_result(&response(body)),
            Err(ApiError::Authentication(_))
        ));
    }

    #[test]
    fn other_gql_errors_are_unexpected_with_details() {
        let request = query_parsed::<PullRequest>(
            "https://h/graphql",
            queries::FIND_PULL_REQUEST,
            serde_json::json!({}),
        );
        let body = r#"{"data":null,"errors":[{"type":"NOT_FOUND","message":"no such repo"}]}"#;
        let err = request.extract_result(&response(body)).unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));
        assert!(err.to_string().contains("no such repo"));
    }

    #[test]
    fn missing_data_and_errors_is_protocol_violation() {
        let request = query_parsed::<PullRequest>(
            "https://h/graphql",
            queries::FIND_PULL_REQUEST,
            serde_json::json!({}),
        );
        assert!(matches!(
            request.extract_result(&response("{}")),
            Err(ApiError::Unexpected(_))
        ));
    }

    #[test]
    fn connection_deserializes_with_page_info() {
        let json = r#"{
            "pageInfo": {"startCursor": "a", "endCursor": "b", "hasNextPage": true, "hasPreviousPage": false},
            "nodes": [{"number": 1}, {"number": 2}]
        }"#;
        let connection: GraphQLConnection<PullRequest> = serde_json::from_str(json).unwrap();
        assert_eq!(connection.nodes.len(), 2);
        assert_eq!(connection.page_info.end_cursor.as_deref(), Some("b"));
        assert!(connection.page_info.has_next_page);
    }
}
