//
//  bitbucket-ide
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types
//!
//! Shared types used across the request model, executors, and page loaders:
//!
//! - [`ApiError`] - unified error taxonomy for all API operations
//! - [`ServerErrorMessage`] - parsed structured error body from the server
//! - Pagination payload types (re-exported from [`pagination`])
//!
//! # Error Taxonomy
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `Authentication` | Credentials rejected (401/402/403) |
//! | `TwoFactorRequired` | Server demands a one-time code |
//! | `RateLimitExceeded` | API rate limit hit |
//! | `MissingToken` | No secret was ever configured for the account |
//! | `MalformedResponse` | Response body failed to parse or had the wrong shape |
//! | `StatusCode` | Any other >= 400 status, with the parsed server error if available |
//! | `Network` | Transport-level failure, propagated unchanged |
//! | `Cancelled` | The caller's cancellation token fired |
//! | `Unexpected` | Unclassified failure, always carries the original message |
//!
//! Exactly one variant is raised per failed exchange. Classification is
//! derived from status code, then response headers, then the parsed error
//! body, in that order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pagination;

pub use pagination::{ResponsePage, SearchResult, LINK_HEADER};

/// Unified error type for all Bitbucket API operations.
///
/// # Example
///
/// ```rust
/// use bitbucket_ide::api::ApiError;
///
/// fn describe(err: &ApiError) -> &'static str {
///     match err {
///         ApiError::Authentication(_) => "please sign in again",
///         ApiError::RateLimitExceeded(_) => "slow down and retry later",
///         ApiError::Cancelled => "", // user cancelled, stay quiet
///         _ => "request failed",
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// Credentials were rejected by the server.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server requires a one-time code in addition to credentials.
    ///
    /// Raised when a 401/402/403 response carries the OTP challenge header.
    /// The basic-auth executor recovers this once via its code supplier;
    /// when the retry is exhausted it surfaces here.
    #[error("Two-factor authentication required: {0}")]
    TwoFactorRequired(String),

    /// The API rate limit has been exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// No secret has ever been configured for the account.
    ///
    /// Distinct from [`ApiError::Authentication`]: this means "never had
    /// one", not "rejected". The UI boundary should prompt for credential
    /// entry rather than re-authentication.
    #[error("Missing access token for account {0}")]
    MissingToken(String),

    /// The response body could not be parsed into the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A non-2xx status that classified as neither auth, two-factor, nor
    /// rate-limit trouble.
    ///
    /// Carries the parsed structured server error when the response body
    /// was JSON and parsed cleanly.
    #[error("{status}: {message}")]
    StatusCode {
        /// Numeric HTTP status code.
        status: u16,
        /// Status line plus the presentable server error, when available.
        message: String,
        /// Structured error payload parsed from the response body.
        error: Option<ServerErrorMessage>,
    },

    /// A transport-level failure (connect, DNS, TLS, timeout).
    ///
    /// Network errors are never reclassified.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The caller's cancellation token fired before the exchange finished.
    ///
    /// Distinguishable from ordinary errors so callers can suppress
    /// "user cancelled" from error surfaces.
    #[error("Operation cancelled")]
    Cancelled,

    /// Unclassified failure. Always carries the original message.
    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    /// Annotates the error with the request's operation name.
    ///
    /// Purely diagnostic enrichment: unclassified and parse failures gain a
    /// "can't <operation>" prefix so logs read in terms of what the caller
    /// was doing. All other variants pass through untouched.
    pub fn with_operation(self, operation_name: Option<&str>) -> Self {
        let Some(name) = operation_name else {
            return self;
        };
        match self {
            Self::Unexpected(msg) => Self::Unexpected(format!("Can't {name}: {msg}")),
            Self::MalformedResponse(msg) => Self::MalformedResponse(format!("Can't {name}: {msg}")),
            other => other,
        }
    }
}

/// Structured error payload returned by the server alongside a failure
/// status.
///
/// The server reports errors as a top-level `message` plus an optional list
/// of field-level detail objects:
///
/// ```json
/// {"message": "Validation Failed", "errors": [{"resource": "PullRequest", "field": "base", "code": "invalid"}]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerErrorMessage {
    /// Human-readable top-level error message.
    pub message: Option<String>,

    /// Field-level error details, when the server provides them.
    #[serde(default)]
    pub errors: Option<Vec<ServerErrorDetail>>,

    /// Link to the relevant API documentation, when provided.
    #[serde(default, rename = "documentation_url")]
    pub documentation_url: Option<String>,
}

/// One field-level entry in a [`ServerErrorMessage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerErrorDetail {
    /// The resource the error relates to (e.g. "PullRequest").
    #[serde(default)]
    pub resource: Option<String>,

    /// The offending field, when applicable.
    #[serde(default)]
    pub field: Option<String>,

    /// Machine-readable error code (e.g. "invalid", "missing_field").
    #[serde(default)]
    pub code: Option<String>,

    /// Free-form message for codes that carry one (e.g. "custom").
    #[serde(default)]
    pub message: Option<String>,
}

impl ServerErrorMessage {
    /// Produces the most useful single-line rendering of this error.
    ///
    /// Prefers the top-level message, appending the first detail message
    /// when one exists.
    pub fn presentable(&self) -> String {
        let mut text = self.message.clone().unwrap_or_default();
        if let Some(detail) = self
            .errors
            .as_ref()
            .and_then(|errors| errors.iter().find_map(|e| e.message.as_deref()))
        {
            if !text.is_empty() {
                text.push_str(": ");
            }
            text.push_str(detail);
        }
        text
    }

    /// Checks whether the top-level message or any detail message contains
    /// the given reason text.
    ///
    /// Used by the executor to spot rate-limit responses, which share their
    /// status code with authentication failures.
    pub fn contains_reason(&self, reason: &str) -> bool {
        if self
            .message
            .as_deref()
            .is_some_and(|m| m.contains(reason))
        {
            return true;
        }
        self.errors
            .as_ref()
            .is_some_and(|errors| {
                errors
                    .iter()
                    .any(|e| e.message.as_deref().is_some_and(|m| m.contains(reason)))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presentable_prefers_top_level_message() {
        let error: ServerErrorMessage = serde_json::from_str(
            r#"{"message": "Validation Failed", "errors": [{"code": "custom", "message": "base branch gone"}]}"#,
        )
        .unwrap();
        assert_eq!(error.presentable(), "Validation Failed: base branch gone");
    }

    #[test]
    fn contains_reason_scans_details() {
        let error: ServerErrorMessage = serde_json::from_str(
            r#"{"message": "Forbidden", "errors": [{"message": "API rate limit exceeded for user"}]}"#,
        )
        .unwrap();
        assert!(error.contains_reason("API rate limit exceeded"));
        assert!(!error.contains_reason("two-factor"));
    }

    #[test]
    fn operation_annotation_only_touches_diagnostic_variants() {
        let err = ApiError::Unexpected("boom".to_string()).with_operation(Some("get profile"));
        assert_eq!(err.to_string(), "Can't get profile: boom");

        let err = ApiError::Authentication("nope".to_string()).with_operation(Some("get profile"));
        assert_eq!(err.to_string(), "Authentication failed: nope");
    }
}
