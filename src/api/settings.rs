//
//  bitbucket-ide
//  api/settings.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Settings
//!
//! Plain-value configuration for executors: connection timeout, user agent,
//! and the default page size used by paginated endpoint factories. The host
//! environment owns persistence of these; the crate only consumes the
//! values.

use std::time::Duration;

/// Tunables applied to every executor built by a
/// [`crate::api::RequestExecutorFactory`].
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Timeout for establishing the HTTP connection.
    pub connection_timeout: Duration,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Page size requested by paginated endpoint factories.
    pub default_page_size: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            user_agent: format!("{}/{}", crate::APP_NAME, crate::VERSION),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;
