//
//  bitbucket-ide
//  api/util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Utilities
//!
//! Pagination drivers and query-string builders shared by the request
//! factories.
//!
//! - [`pages`]: eager draining of Link-header REST pagination.
//! - [`gql_pages`]: incremental cursor iteration over GraphQL connections.
//! - [`query`]: URL query-string and search-qualifier builders.

pub mod gql_pages;
pub mod pages;
pub mod query;

pub use gql_pages::GraphQLPagesLoader;
pub use pages::PagesRequest;
pub use query::{SearchQueryBuilder, UrlQueryBuilder};
