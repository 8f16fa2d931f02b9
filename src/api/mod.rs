//
//  bitbucket-ide
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! Typed request modeling and execution for the Bitbucket REST and GraphQL
//! APIs.
//!
//! ## Architecture
//!
//! Data flows one direction at execute time, control flows the other:
//!
//! ```text
//! query registry -> ApiRequest -> RequestExecutor -> ApiResponse -> T
//!                                                                    |
//!                              page loaders  <-----------------------+
//! ```
//!
//! - [`request`]: the [`ApiRequest`] value describing one call and how to
//!   interpret its result
//! - [`response`]: the narrow [`ApiResponse`] view over a completed exchange
//! - [`executor`]: authentication strategies, error classification, and the
//!   two-factor retry
//! - [`manager`]: per-account executor cache fed by the credential store
//! - [`requests`]: REST endpoint factories
//! - [`graphql`]: GraphQL envelope types, query registry, endpoint factories
//! - [`util`]: REST and GraphQL page loaders, query-string builders
//! - [`common`]: the [`ApiError`] taxonomy and pagination payload types
//! - [`coordinates`]: server paths and repository coordinates
//!
//! ## Error Handling
//!
//! Every failure surfaces as an [`ApiError`] variant. The executor recovers
//! exactly one condition on its own (the two-factor challenge, once); optional
//! GET requests convert a 404 into their declared fallback value. Everything
//! else reaches the caller on first failure.

pub mod common;
pub mod coordinates;
pub mod data;
pub mod executor;
pub mod graphql;
pub mod manager;
pub mod request;
pub mod requests;
pub mod response;
pub mod settings;
pub mod util;

pub use common::{ApiError, ServerErrorMessage};
pub use executor::{BasicAuthExecutor, RequestExecutor, RequestExecutorFactory, TokenAuthExecutor};
pub use manager::RequestExecutorManager;
pub use request::{ApiMethod, ApiRequest, TokenHeaderKind};
pub use response::ApiResponse;
pub use settings::ApiSettings;
