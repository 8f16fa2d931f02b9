//
//  bitbucket-ide
//  api/requests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # REST Request Factories
//!
//! Endpoint catalog for the REST surface. Each factory returns a fully
//! described [`ApiRequest`] (or a [`PagesRequest`] for paged collections)
//! carrying an operation name, so failures read as "Can't load repositories"
//! rather than a bare transport error.
//!
//! URLs are rooted at the server's API base from [`ServerPath::to_api_url`],
//! which differs between cloud and self-hosted deployments.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::api::coordinates::{RepositoryPath, ServerPath};
use crate::api::data::{AuthenticatedUser, Organization, Repository};
use crate::api::request::ApiRequest;
use crate::api::util::{PagesRequest, UrlQueryBuilder};

fn pages<T: DeserializeOwned + Send + Sync + 'static>(
    url: String,
    operation: &'static str,
) -> PagesRequest<T> {
    PagesRequest::new(
        ApiRequest::get_json_page(url).with_operation_name(operation),
        move |link| ApiRequest::get_json_page(link).with_operation_name(operation),
    )
}

fn search_pages<T: DeserializeOwned + Send + Sync + 'static>(
    url: String,
    operation: &'static str,
) -> PagesRequest<T> {
    PagesRequest::new(
        ApiRequest::get_json_search_page(url).with_operation_name(operation),
        move |link| ApiRequest::get_json_search_page(link).with_operation_name(operation),
    )
}

/// Requests scoped to the authenticated user.
pub mod current_user {
    use super::*;

    /// Profile of the user the credentials authenticate as.
    pub fn get(server: &ServerPath) -> ApiRequest<AuthenticatedUser> {
        ApiRequest::get_json(format!("{}/user", server.to_api_url()))
            .with_operation_name("get profile information")
    }

    /// Repositories visible to the authenticated user.
    pub fn repos(server: &ServerPath, page_size: Option<usize>) -> PagesRequest<Repository> {
        let query = UrlQueryBuilder::new()
            .param("affiliation", Some("owner,collaborator"))
            .pagination(None, page_size)
            .build();
        pages(
            format!("{}/user/repos{query}", server.to_api_url()),
            "load repositories",
        )
    }

    /// Organizations the authenticated user belongs to.
    pub fn orgs(server: &ServerPath, page_size: Option<usize>) -> PagesRequest<Organization> {
        let query = UrlQueryBuilder::new().pagination(None, page_size).build();
        pages(
            format!("{}/user/orgs{query}", server.to_api_url()),
            "load organizations",
        )
    }
}

/// Requests scoped to an organization.
pub mod organizations {
    use super::*;

    /// Repositories owned by `organization`.
    pub fn repos(
        server: &ServerPath,
        organization: &str,
        page_size: Option<usize>,
    ) -> PagesRequest<Repository> {
        let query = UrlQueryBuilder::new()
            .param("type", Some("member"))
            .pagination(None, page_size)
            .build();
        pages(
            format!("{}/orgs/{organization}/repos{query}", server.to_api_url()),
            "load organization repositories",
        )
    }
}

/// Requests scoped to a repository.
pub mod repos {
    use super::*;

    /// A single repository; absence reads as `None`, not an error.
    pub fn get(server: &ServerPath, repo: &RepositoryPath) -> ApiRequest<Option<Repository>> {
        ApiRequest::<Repository>::get_optional_json(format!(
            "{}{}",
            server.to_api_url(),
            repo_segment(repo)
        ))
        .with_operation_name("get repository")
    }

    /// Creates a repository under the authenticated user.
    pub fn create(
        server: &ServerPath,
        name: &str,
        description: &str,
        private: bool,
    ) -> ApiRequest<Repository> {
        ApiRequest::post_json(
            format!("{}/user/repos", server.to_api_url()),
            json!({
                "name": name,
                "description": description,
                "private": private,
                "auto_init": true,
            }),
        )
        .with_operation_name("create repository")
    }

    /// Deletes a repository. Irreversible on the server side.
    pub fn delete(server: &ServerPath, repo: &RepositoryPath) -> ApiRequest<()> {
        ApiRequest::delete(format!("{}{}", server.to_api_url(), repo_segment(repo)))
            .with_operation_name("delete repository")
    }

    /// Forks of a repository.
    pub fn forks(
        server: &ServerPath,
        repo: &RepositoryPath,
        page_size: Option<usize>,
    ) -> PagesRequest<Repository> {
        let query = UrlQueryBuilder::new().pagination(None, page_size).build();
        pages(
            format!(
                "{}{}/forks{query}",
                server.to_api_url(),
                repo_segment(repo)
            ),
            "load forks",
        )
    }

    /// Forks a repository into the authenticated user's namespace.
    pub fn create_fork(server: &ServerPath, repo: &RepositoryPath) -> ApiRequest<Repository> {
        ApiRequest::post_json(
            format!(
                "{}{}/forks",
                server.to_api_url(),
                repo_segment(repo)
            ),
            json!({}),
        )
        .with_operation_name("fork repository")
    }

    fn repo_segment(repo: &RepositoryPath) -> String {
        format!("/repos/{}/{}", repo.owner, repo.repository)
    }
}

/// Search endpoints. Results arrive wrapped in a search envelope but page
/// through the `Link` header like any other collection.
pub mod search {
    use super::*;

    /// Repository search by a `qualifier:value` query string.
    pub fn repos(
        server: &ServerPath,
        query: &str,
        page_size: Option<usize>,
    ) -> PagesRequest<Repository> {
        let query_string = UrlQueryBuilder::new()
            .param("q", Some(query))
            .pagination(None, page_size)
            .build();
        search_pages(
            format!("{}/search/repositories{query_string}", server.to_api_url()),
            "search repositories",
        )
    }
}
