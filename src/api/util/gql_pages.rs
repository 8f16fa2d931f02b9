//
//  bitbucket-ide
//  api/util/gql_pages.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GraphQL Pages Loader
//!
//! Stateful, resumable iteration over one GraphQL connection. Unlike the
//! eager REST loader this advances one page per call, which lets UI layers
//! implement load-more lists.
//!
//! Two modes share the cursor state:
//!
//! - **Forward**: feed the last page's end cursor back as `after` until
//!   `hasNextPage` turns false.
//! - **Update**: once the forward walk is exhausted, a loader created with
//!   timestamp support can refetch everything changed since the last sync
//!   point. The sync timestamp is recorded *before* each request is sent,
//!   so changes racing the response are picked up next time.
//!
//! Loads are serialized: a second `load_next` waits for the in-flight one
//! instead of racing the cursor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::api::common::ApiError;
use crate::api::executor::RequestExecutor;
use crate::api::graphql::{GraphQLConnection, GraphQLRequestPagination};
use crate::api::request::ApiRequest;

type ConnectionRequestProducer<T> =
    Box<dyn Fn(&GraphQLRequestPagination) -> ApiRequest<GraphQLConnection<T>> + Send + Sync>;

#[derive(Debug, Clone)]
struct IterationData {
    has_next: bool,
    cursor: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl IterationData {
    fn initial() -> Self {
        Self {
            has_next: true,
            cursor: None,
            timestamp: None,
        }
    }
}

/// Incremental loader over one GraphQL connection.
pub struct GraphQLPagesLoader<E, T> {
    executor: Arc<E>,
    request_producer: ConnectionRequestProducer<T>,
    supports_timestamp_updates: bool,
    page_size: usize,
    load_lock: tokio::sync::Mutex<()>,
    state: std::sync::Mutex<IterationData>,
}

impl<E, T> GraphQLPagesLoader<E, T>
where
    E: RequestExecutor,
    T: Send + 'static,
{
    /// Builds a loader over `executor` for the connection produced by
    /// `request_producer`. Pass `supports_timestamp_updates` only when the
    /// underlying query takes a `since` variable.
    pub fn new(
        executor: Arc<E>,
        request_producer: impl Fn(&GraphQLRequestPagination) -> ApiRequest<GraphQLConnection<T>>
            + Send
            + Sync
            + 'static,
        supports_timestamp_updates: bool,
        page_size: usize,
    ) -> Self {
        Self {
            executor,
            request_producer: Box::new(request_producer),
            supports_timestamp_updates,
            page_size,
            load_lock: tokio::sync::Mutex::new(()),
            state: std::sync::Mutex::new(IterationData::initial()),
        }
    }

    /// Whether a forward page remains. True before the first load.
    pub fn has_next(&self) -> bool {
        self.snapshot().has_next
    }

    /// Whether an update refetch can run: the forward walk is exhausted,
    /// the query supports a `since` bound, and a sync point exists.
    pub fn ready_for_updates(&self) -> bool {
        let state = self.snapshot();
        self.supports_timestamp_updates && !state.has_next && state.timestamp.is_some()
    }

    /// Loads the next page forward, or refetches updates when `update` is
    /// set.
    ///
    /// Returns `Ok(None)` without touching the network when the walk is
    /// exhausted (forward mode) or when updates are not ready (update
    /// mode); otherwise the page's nodes, possibly empty.
    pub async fn load_next(
        &self,
        ct: &CancellationToken,
        update: bool,
    ) -> Result<Option<Vec<T>>, ApiError> {
        let _serialized = self.load_lock.lock().await;

        let state = self.snapshot();
        let pagination = if update {
            if !(self.supports_timestamp_updates && !state.has_next && state.timestamp.is_some()) {
                return Ok(None);
            }
            GraphQLRequestPagination::since(state.timestamp, self.page_size)
        } else {
            if !state.has_next {
                return Ok(None);
            }
            GraphQLRequestPagination::cursor(state.cursor, self.page_size)
        };

        // Recorded before the exchange so updates racing the response land
        // in the next refetch instead of being skipped.
        let sync_time = Utc::now();
        let request = (self.request_producer)(&pagination);
        let connection = self.executor.execute(ct, request).await?;

        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.has_next = connection.page_info.has_next_page;
            state.cursor = connection.page_info.end_cursor.clone();
            state.timestamp = Some(sync_time);
        }
        Ok(Some(connection.nodes))
    }

    /// Drains the forward walk from the current position.
    pub async fn load_all(&self, ct: &CancellationToken) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        while let Some(mut page) = self.load_next(ct, false).await? {
            items.append(&mut page);
        }
        Ok(items)
    }

    /// Forgets all iteration state; the next load starts from the first
    /// page. Idempotent.
    pub fn reset(&self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = IterationData::initial();
    }

    fn snapshot(&self) -> IterationData {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
