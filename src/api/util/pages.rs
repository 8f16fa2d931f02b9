//
//  bitbucket-ide
//  api/util/pages.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # REST Pages Loader
//!
//! Drains Link-header pagination for list endpoints. A [`PagesRequest`]
//! bundles the first page's request with a producer that rebuilds the
//! request for any follow-up link, so the loader can walk the chain without
//! knowing the endpoint.
//!
//! Iteration follows the links only: an empty page with a next link does
//! not terminate the walk.

use tokio_util::sync::CancellationToken;

use crate::api::common::{ApiError, ResponsePage};
use crate::api::executor::RequestExecutor;
use crate::api::request::ApiRequest;

type LinkRequestProducer<T> = Box<dyn Fn(&str) -> ApiRequest<ResponsePage<T>> + Send + Sync>;

/// A paged list endpoint, ready to be driven to any depth.
pub struct PagesRequest<T> {
    initial: ApiRequest<ResponsePage<T>>,
    from_link: LinkRequestProducer<T>,
}

impl<T: Send + 'static> PagesRequest<T> {
    /// Bundles the first page's request with the follow-up-link producer.
    pub fn new(
        initial: ApiRequest<ResponsePage<T>>,
        from_link: impl Fn(&str) -> ApiRequest<ResponsePage<T>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            initial,
            from_link: Box::new(from_link),
        }
    }

    /// URL of the first page's request.
    pub fn initial_url(&self) -> &str {
        self.initial.url()
    }

    /// Loads every page and returns the concatenated items.
    pub async fn load_all<E: RequestExecutor>(
        self,
        executor: &E,
        ct: &CancellationToken,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        self.load_all_into(executor, ct, |mut page_items| items.append(&mut page_items))
            .await?;
        Ok(items)
    }

    /// Loads every page, handing each page's items to `consumer` as it
    /// arrives. Useful when pages should stream into an existing sink
    /// instead of accumulating.
    pub async fn load_all_into<E: RequestExecutor>(
        self,
        executor: &E,
        ct: &CancellationToken,
        mut consumer: impl FnMut(Vec<T>),
    ) -> Result<(), ApiError> {
        let mut request = Some(self.initial);
        while let Some(current) = request.take() {
            let page = executor.execute(ct, current).await?;
            consumer(page.items);
            request = page.next_link.map(|link| (self.from_link)(&link));
        }
        Ok(())
    }

    /// Loads pages until at least `maximum` items have accumulated, then
    /// truncates to exactly `maximum`. Stops mid-chain as soon as the bound
    /// is reached.
    pub async fn load_up_to<E: RequestExecutor>(
        self,
        executor: &E,
        ct: &CancellationToken,
        maximum: usize,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut request = Some(self.initial);
        while let Some(current) = request.take() {
            let page = executor.execute(ct, current).await?;
            items.extend(page.items);
            if items.len() >= maximum {
                items.truncate(maximum);
                break;
            }
            request = page.next_link.map(|link| (self.from_link)(&link));
        }
        Ok(items)
    }

    /// Walks pages until `predicate` matches, returning the first match.
    /// Later pages are never requested once a match is found.
    pub async fn find<E: RequestExecutor>(
        self,
        executor: &E,
        ct: &CancellationToken,
        predicate: impl Fn(&T) -> bool,
    ) -> Result<Option<T>, ApiError> {
        let mut request = Some(self.initial);
        while let Some(current) = request.take() {
            let page = executor.execute(ct, current).await?;
            if let Some(found) = page.items.into_iter().find(|item| predicate(item)) {
                return Ok(Some(found));
            }
            request = page.next_link.map(|link| (self.from_link)(&link));
        }
        Ok(None)
    }
}
