//
//  bitbucket-ide
//  api/executor.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Executor
//!
//! Turns an [`ApiRequest`] into a completed, validated exchange: builds the
//! transport call from the request's method descriptor, injects the
//! authentication header, classifies non-2xx responses into the
//! [`ApiError`] taxonomy, and hands the validated response to the request's
//! extractor.
//!
//! ## Authentication Strategies
//!
//! Two strategies implement the same [`RequestExecutor`] capability:
//!
//! - [`TokenAuthExecutor`]: holds a mutable secret and sends
//!   `Authorization: <token|Bearer> <secret>` per the request's declared
//!   scheme kind. Mutating the secret notifies registered listeners so
//!   dependents can invalidate caches.
//! - [`BasicAuthExecutor`]: sends an HTTP Basic header and supports a
//!   one-shot two-factor retry: on a two-factor challenge it asks its code
//!   supplier once, attaches the code to the OTP header, and retries the
//!   exact same request exactly once.
//!
//! ## Cancellation
//!
//! Every execution checks the caller's [`CancellationToken`] at entry,
//! immediately before sending, and immediately before parsing. Cancellation
//! surfaces as [`ApiError::Cancelled`], never as an ordinary error.
//!
//! ## Error Classification
//!
//! Non-2xx statuses classify in priority order: OTP challenge header, then
//! rate-limit error body, then authentication failure (for 401/402/403),
//! then the generic status-code error carrying the parsed server error when
//! the body was JSON. Network-level failures propagate unchanged, and the
//! two-factor retry is the only automatic retry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::common::{ApiError, ServerErrorMessage};
use crate::api::request::{ApiRequest, JSON_MIME_TYPE};
use crate::api::response::HttpResponse;
use crate::api::settings::ApiSettings;

/// Header carrying the one-time code on a two-factor retry, and flagging the
/// challenge on the server's response.
pub const OTP_HEADER_NAME: &str = "X-Bitbucket-OTP";

/// Reason text the server embeds in rate-limit error bodies.
const RATE_LIMIT_REASON: &str = "API rate limit exceeded";

/// Capability of executing a typed API request.
///
/// Implementations are synchronous from the caller's perspective: `execute`
/// spans the whole network round trip (including any two-factor retry) and
/// concurrency comes from callers running independent requests on separate
/// tasks.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Performs the exchange described by `request`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] variant; see the module docs for the classification
    /// rules. [`ApiError::Cancelled`] when `ct` fires first.
    async fn execute<T: Send + 'static>(
        &self,
        ct: &CancellationToken,
        request: ApiRequest<T>,
    ) -> Result<T, ApiError>;
}

/// Handle identifying one registered auth-data-changed listener.
///
/// Returned by [`TokenAuthExecutor::subscribe_auth_data_changed`]; pass it
/// back to unsubscribe when the owning component goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(u64);

type AuthDataListener = Box<dyn Fn() + Send + Sync>;

/// Executor authenticating with a mutable secret token.
pub struct TokenAuthExecutor {
    client: Client,
    token: RwLock<String>,
    listeners: Mutex<Vec<(u64, AuthDataListener)>>,
    next_listener_id: AtomicU64,
}

impl TokenAuthExecutor {
    fn new(client: Client, token: String) -> Self {
        Self {
            client,
            token: RwLock::new(token),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Swaps the secret in place and notifies listeners.
    ///
    /// The executor instance stays valid across rotations, so references
    /// held by dependents keep working; they learn about the change through
    /// their registered listeners.
    pub fn set_token(&self, token: String) {
        {
            let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
            *slot = token;
        }
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for (_, listener) in listeners.iter() {
            listener();
        }
    }

    /// Registers a callback fired whenever the secret changes.
    ///
    /// Registration is scoped to the caller: keep the handle and pass it to
    /// [`TokenAuthExecutor::unsubscribe_auth_data_changed`] when done.
    pub fn subscribe_auth_data_changed(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> ListenerHandle {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Box::new(listener)));
        ListenerHandle(id)
    }

    /// Removes a previously registered listener.
    pub fn unsubscribe_auth_data_changed(&self, handle: ListenerHandle) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(id, _)| *id != handle.0);
    }

    fn authorization_header(&self, scheme: &str) -> String {
        let token = self.token.read().unwrap_or_else(|e| e.into_inner());
        format!("{scheme} {token}")
    }
}

#[async_trait]
impl RequestExecutor for TokenAuthExecutor {
    async fn execute<T: Send + 'static>(
        &self,
        ct: &CancellationToken,
        request: ApiRequest<T>,
    ) -> Result<T, ApiError> {
        let header = self.authorization_header(request.token_kind().scheme());
        perform(&self.client, ct, &request, &header, None).await
    }
}

type TwoFactorCodeSupplier = Box<dyn Fn() -> Option<String> + Send + Sync>;

/// Executor authenticating with login and password.
///
/// On a two-factor challenge it consults its code supplier once; the
/// obtained code is cached and attached to subsequent requests so a session
/// keeps working after a single prompt.
pub struct BasicAuthExecutor {
    client: Client,
    login: String,
    password: String,
    two_factor_code_supplier: TwoFactorCodeSupplier,
    two_factor_code: Mutex<Option<String>>,
}

impl BasicAuthExecutor {
    fn new(
        client: Client,
        login: String,
        password: String,
        two_factor_code_supplier: TwoFactorCodeSupplier,
    ) -> Self {
        Self {
            client,
            login,
            password,
            two_factor_code_supplier,
            two_factor_code: Mutex::new(None),
        }
    }

    fn authorization_header(&self) -> String {
        let value = BASE64.encode(format!("{}:{}", self.login, self.password));
        format!("Basic {value}")
    }

    fn current_code(&self) -> Option<String> {
        self.two_factor_code
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl RequestExecutor for BasicAuthExecutor {
    async fn execute<T: Send + 'static>(
        &self,
        ct: &CancellationToken,
        request: ApiRequest<T>,
    ) -> Result<T, ApiError> {
        let header = self.authorization_header();
        let code = self.current_code();
        let first = perform(&self.client, ct, &request, &header, code.as_deref()).await;

        // One bounded retry: ask the supplier for a code and resend the
        // exact same request. No code means the original error stands.
        match first {
            Err(ApiError::TwoFactorRequired(message)) => {
                let Some(fresh) = (self.two_factor_code_supplier)() else {
                    return Err(ApiError::TwoFactorRequired(message));
                };
                *self
                    .two_factor_code
                    .lock()
                    .unwrap_or_else(|e| e.into_inner()) = Some(fresh.clone());
                perform(&self.client, ct, &request, &header, Some(&fresh)).await
            }
            other => other,
        }
    }
}

/// Produces executors bound to the shared [`ApiSettings`].
pub struct RequestExecutorFactory {
    settings: ApiSettings,
}

impl RequestExecutorFactory {
    /// Builds a factory applying `settings` to every executor it creates.
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    /// Creates a token-authenticating executor.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`] when the HTTP client cannot be constructed.
    pub fn create(&self, token: String) -> Result<TokenAuthExecutor, ApiError> {
        Ok(TokenAuthExecutor::new(self.client()?, token))
    }

    /// Creates a basic-auth executor with a two-factor code supplier.
    ///
    /// The supplier is consulted at most once per challenged request; it may
    /// prompt interactively on the caller's side.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`] when the HTTP client cannot be constructed.
    pub fn create_basic(
        &self,
        login: String,
        password: String,
        two_factor_code_supplier: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Result<BasicAuthExecutor, ApiError> {
        Ok(BasicAuthExecutor::new(
            self.client()?,
            login,
            password,
            Box::new(two_factor_code_supplier),
        ))
    }

    fn client(&self) -> Result<Client, ApiError> {
        Ok(Client::builder()
            .user_agent(&self.settings.user_agent)
            .connect_timeout(self.settings.connection_timeout)
            .build()?)
    }
}

/// Single transport path shared by both strategies.
///
/// Builds the HTTP call from the request's method descriptor, runs it, and
/// either extracts the typed result or classifies the failure.
async fn perform<T>(
    client: &Client,
    ct: &CancellationToken,
    request: &ApiRequest<T>,
    auth_header: &str,
    otp_code: Option<&str>,
) -> Result<T, ApiError> {
    if ct.is_cancelled() {
        return Err(ApiError::Cancelled);
    }

    let mut builder = client.request(request.method().as_reqwest(), request.url());
    if let Some(accept) = request.accept() {
        builder = builder.header(ACCEPT, accept);
    }
    if let Some(body) = request.body() {
        if let Some(mime) = request.body_mime() {
            builder = builder.header(CONTENT_TYPE, mime);
        }
        builder = builder.body(body.to_string());
    }
    for (name, value) in request.additional_headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder = builder.header(AUTHORIZATION, auth_header);
    if let Some(code) = otp_code {
        builder = builder.header(OTP_HEADER_NAME, code);
    }

    if ct.is_cancelled() {
        return Err(ApiError::Cancelled);
    }
    debug!(
        url = request.url(),
        operation = request.operation_name(),
        "request: connecting"
    );

    let response = builder.send().await?;
    let status = response.status().as_u16();

    if status >= 400 {
        let error = classify_error(response).await;
        // The sole status-to-success conversion: optional requests recover
        // a plain 404 into their declared absence value.
        if let ApiError::StatusCode { status: 404, .. } = error {
            if let Some(fallback) = request.recover_not_found() {
                return Ok(fallback);
            }
        }
        return Err(error.with_operation(request.operation_name()));
    }

    if ct.is_cancelled() {
        return Err(ApiError::Cancelled);
    }

    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    let result = request
        .extract_result(&HttpResponse::new(headers, body))
        .map_err(|e| e.with_operation(request.operation_name()))?;
    debug!(url = request.url(), "request: result extracted");
    Ok(result)
}

/// Classifies a non-2xx response into the error taxonomy.
///
/// Precedence: status code, then response headers, then the parsed error
/// body.
async fn classify_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let status_line = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );

    let otp_challenged = response
        .headers()
        .get(OTP_HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("required"));
    let json_body = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(JSON_MIME_TYPE));

    let error_text = response.text().await.unwrap_or_default();
    let json_error: Option<ServerErrorMessage> = if json_body {
        serde_json::from_str(&error_text).ok()
    } else {
        None
    };

    debug!(status = %status_line, body = %error_text, "request: error response");

    let presentable = json_error
        .as_ref()
        .map(ServerErrorMessage::presentable)
        .filter(|text| !text.is_empty());

    match status.as_u16() {
        401..=403 => {
            if otp_challenged {
                ApiError::TwoFactorRequired(presentable.unwrap_or(error_text))
            } else if json_error
                .as_ref()
                .is_some_and(|e| e.contains_reason(RATE_LIMIT_REASON))
            {
                ApiError::RateLimitExceeded(presentable.unwrap_or(error_text))
            } else {
                let detail = presentable
                    .or_else(|| (!error_text.is_empty()).then(|| error_text.clone()))
                    .unwrap_or_else(|| status_line.clone());
                ApiError::Authentication(format!("Request response: {detail}"))
            }
        }
        code => {
            let message = match &presentable {
                Some(text) => format!("{status_line} - {text}"),
                None => format!("{status_line} - {error_text}"),
            };
            ApiError::StatusCode {
                status: code,
                message,
                error: json_error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn token_executor() -> TokenAuthExecutor {
        RequestExecutorFactory::new(ApiSettings::default())
            .create("initial".to_string())
            .unwrap()
    }

    #[test]
    fn set_token_notifies_subscribed_listeners() {
        let executor = token_executor();
        let fired = Arc::new(AtomicUsize::new(0));

        let observed = fired.clone();
        let handle = executor.subscribe_auth_data_changed(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        executor.set_token("rotated".to_string());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        executor.unsubscribe_auth_data_changed(handle);
        executor.set_token("rotated-again".to_string());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn token_scheme_follows_request_kind() {
        let executor = token_executor();
        assert_eq!(executor.authorization_header("token"), "token initial");
        assert_eq!(executor.authorization_header("Bearer"), "Bearer initial");
    }

    #[test]
    fn basic_header_encodes_login_and_password() {
        let executor = RequestExecutorFactory::new(ApiSettings::default())
            .create_basic("user".to_string(), "pass".to_string(), || None)
            .unwrap();
        assert_eq!(executor.authorization_header(), "Basic dXNlcjpwYXNz");
    }
}
