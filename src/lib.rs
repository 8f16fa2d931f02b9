//
//  bitbucket-ide
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket IDE Integration Core
//!
//! This library is the API-client core of an IDE integration for Bitbucket:
//! account management, pull-request browsing, review commenting, and
//! repository cloning are built on top of the typed client in this crate.
//!
//! ## Overview
//!
//! The crate deliberately excludes everything that belongs to the host IDE:
//! dialogs, panels, tree renderers, the VCS layer, and credential persistence
//! are collaborators, not residents. What lives here is the request pipeline:
//!
//! - **Request model**: every API call is described by a typed [`api::ApiRequest`]
//!   value carrying its URL, method, body, and a pure result extractor.
//! - **Execution**: [`api::RequestExecutor`] implementations perform the HTTP
//!   exchange, inject authentication, classify failures into [`api::ApiError`],
//!   and transparently retry once on a two-factor challenge.
//! - **Pagination**: bounded, cancellable page loaders for REST link-style
//!   pages ([`api::util::pages`]) and GraphQL cursor connections
//!   ([`api::util::GraphQLPagesLoader`]).
//!
//! ## Module Structure
//!
//! - [`api`]: request model, executors, pagination, GraphQL support
//! - [`auth`]: account identities and the credential-store collaborator
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_ide::api::{requests, ApiSettings, RequestExecutor, RequestExecutorFactory};
//! use bitbucket_ide::api::coordinates::ServerPath;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), bitbucket_ide::api::ApiError> {
//! let factory = RequestExecutorFactory::new(ApiSettings::default());
//! let executor = factory.create("access-token".to_string())?;
//!
//! let server = ServerPath::cloud();
//! let ct = CancellationToken::new();
//! let user = executor.execute(&ct, requests::current_user::get(&server)).await?;
//! println!("signed in as {}", user.login);
//! # Ok(())
//! # }
//! ```

/// API client layer: request model, executors, error taxonomy, pagination.
///
/// This is the heart of the crate. Start with [`api::ApiRequest`] and
/// [`api::RequestExecutor`].
pub mod api;

/// Account identities and credential storage collaborators.
///
/// The core never persists secrets itself; [`auth::CredentialStore`] is the
/// seam through which the host environment supplies them. A system-keyring
/// implementation is provided for hosts without their own secret storage.
pub mod auth;

/// Application name constant.
///
/// Used for the default user agent and the keyring service name.
pub const APP_NAME: &str = "bitbucket-ide";

/// Library version, derived from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
