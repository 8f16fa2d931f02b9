//
//  bitbucket-ide
//  api/graphql/requests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GraphQL Request Factories
//!
//! Endpoint catalog for the GraphQL surface, mirroring [`crate::api::requests`]
//! for REST. Each factory resolves its query document by name from the
//! registry, binds the variables, and declares where in the `data` tree its
//! typed payload lives.

use serde_json::{json, Value};

use crate::api::coordinates::{RepositoryPath, ServerPath};
use crate::api::data::{
    PullRequest, PullRequestCommit, PullRequestMergeability, PullRequestShort,
    RepositoryViewerPermission, ReviewCommentBody, ReviewThread, Team, TimelineItem,
};
use crate::api::graphql::{
    queries, query_parsed, query_traversed, query_traversed_optional, GraphQLConnection,
    GraphQLRequestPagination, GraphQLSearchResult,
};
use crate::api::request::ApiRequest;

/// Requests scoped to an organization.
pub mod organization {
    use super::*;

    /// Teams of an organization, optionally filtered to ones containing the
    /// given member logins.
    pub fn find_teams(
        server: &ServerPath,
        organization: &str,
        member_logins: Option<&[String]>,
        pagination: &GraphQLRequestPagination,
    ) -> ApiRequest<GraphQLConnection<Team>> {
        query_traversed(
            server.to_graphql_url(),
            queries::FIND_ORGANIZATION_TEAMS,
            json!({
                "organization": organization,
                "logins": member_logins,
                "pageSize": pagination.page_size,
                "cursor": pagination.cursor_variable(),
            }),
            &["organization", "teams"],
        )
        .with_operation_name("load teams")
    }
}

/// Requests scoped to a repository.
pub mod repo {
    use super::*;

    /// The viewer's effective permission on a repository. `None` when the
    /// repository is invisible to the viewer.
    pub fn find_permission(
        server: &ServerPath,
        repo: &RepositoryPath,
    ) -> ApiRequest<Option<RepositoryViewerPermission>> {
        query_traversed_optional(
            server.to_graphql_url(),
            queries::FIND_REPOSITORY_PERMISSION,
            json!({
                "repoOwner": repo.owner,
                "repoName": repo.repository,
            }),
            &["repository"],
        )
        .with_operation_name("get repository permission")
    }
}

/// Requests scoped to pull requests.
pub mod pull_request {
    use super::*;

    /// A single pull request by number; `None` when it does not exist.
    pub fn find_one(
        server: &ServerPath,
        repo: &RepositoryPath,
        number: i64,
    ) -> ApiRequest<Option<PullRequest>> {
        query_traversed_optional(
            server.to_graphql_url(),
            queries::FIND_PULL_REQUEST,
            repo_number_variables(repo, number),
            &["repository", "pullRequest"],
        )
        .with_operation_name("find pull request")
    }

    /// Pull request search by a `qualifier:value` query string.
    pub fn search(
        server: &ServerPath,
        query: &str,
        pagination: &GraphQLRequestPagination,
    ) -> ApiRequest<GraphQLSearchResult<PullRequestShort>> {
        query_parsed(
            server.to_graphql_url(),
            queries::ISSUE_SEARCH,
            json!({
                "query": query,
                "pageSize": pagination.page_size,
                "cursor": pagination.cursor_variable(),
            }),
        )
        .with_operation_name("search pull requests")
    }

    /// One page of a pull request's timeline. The only connection that
    /// supports timestamp refreshes through the `since` variable.
    pub fn timeline(
        server: &ServerPath,
        repo: &RepositoryPath,
        number: i64,
        pagination: &GraphQLRequestPagination,
    ) -> ApiRequest<GraphQLConnection<TimelineItem>> {
        query_traversed(
            server.to_graphql_url(),
            queries::PULL_REQUEST_TIMELINE,
            paged_repo_number_variables(repo, number, pagination, true),
            &["repository", "pullRequest", "timelineItems"],
        )
        .with_operation_name("load pull request timeline")
    }

    /// One page of a pull request's review threads.
    pub fn review_threads(
        server: &ServerPath,
        repo: &RepositoryPath,
        number: i64,
        pagination: &GraphQLRequestPagination,
    ) -> ApiRequest<GraphQLConnection<ReviewThread>> {
        query_traversed(
            server.to_graphql_url(),
            queries::PULL_REQUEST_REVIEW_THREADS,
            paged_repo_number_variables(repo, number, pagination, false),
            &["repository", "pullRequest", "reviewThreads"],
        )
        .with_operation_name("load review threads")
    }

    /// One page of a pull request's commits.
    pub fn commits(
        server: &ServerPath,
        repo: &RepositoryPath,
        number: i64,
        pagination: &GraphQLRequestPagination,
    ) -> ApiRequest<GraphQLConnection<PullRequestCommit>> {
        query_traversed(
            server.to_graphql_url(),
            queries::PULL_REQUEST_COMMITS,
            paged_repo_number_variables(repo, number, pagination, false),
            &["repository", "pullRequest", "commits"],
        )
        .with_operation_name("load commits")
    }

    /// Mergeability snapshot of a pull request. The payload itself is
    /// mandatory once the pull request exists.
    pub fn mergeability(
        server: &ServerPath,
        repo: &RepositoryPath,
        number: i64,
    ) -> ApiRequest<PullRequestMergeability> {
        query_traversed(
            server.to_graphql_url(),
            queries::FIND_PULL_REQUEST_MERGEABILITY,
            repo_number_variables(repo, number),
            &["repository", "pullRequest"],
        )
        .with_operation_name("get mergeability state")
    }

    fn repo_number_variables(repo: &RepositoryPath, number: i64) -> Value {
        json!({
            "repoOwner": repo.owner,
            "repoName": repo.repository,
            "number": number,
        })
    }

    fn paged_repo_number_variables(
        repo: &RepositoryPath,
        number: i64,
        pagination: &GraphQLRequestPagination,
        with_since: bool,
    ) -> Value {
        let mut variables = json!({
            "repoOwner": repo.owner,
            "repoName": repo.repository,
            "number": number,
            "pageSize": pagination.page_size,
            "cursor": pagination.cursor_variable(),
        });
        if with_since {
            variables["since"] = pagination.since_variable();
        }
        variables
    }
}

/// Requests scoped to a single review comment.
pub mod review_comment {
    use super::*;

    /// Source body of a review comment, for editing. `None` when the node
    /// is gone or not a review comment.
    pub fn body(server: &ServerPath, comment_id: &str) -> ApiRequest<Option<ReviewCommentBody>> {
        query_traversed_optional(
            server.to_graphql_url(),
            queries::GET_REVIEW_COMMENT_BODY,
            json!({"id": comment_id}),
            &["node"],
        )
        .with_operation_name("get comment source")
    }

    /// Replaces a review comment's body.
    pub fn update(
        server: &ServerPath,
        comment_id: &str,
        new_body: &str,
    ) -> ApiRequest<ReviewCommentBody> {
        query_traversed(
            server.to_graphql_url(),
            queries::UPDATE_REVIEW_COMMENT,
            json!({"id": comment_id, "body": new_body}),
            &["updatePullRequestReviewComment", "pullRequestReviewComment"],
        )
        .with_operation_name("update comment")
    }

    /// Deletes a review comment. The mutation's payload is irrelevant.
    pub fn delete(server: &ServerPath, comment_id: &str) -> ApiRequest<Option<Value>> {
        query_traversed_optional(
            server.to_graphql_url(),
            queries::DELETE_REVIEW_COMMENT,
            json!({"id": comment_id}),
            &["deletePullRequestReviewComment"],
        )
        .with_operation_name("delete comment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::{ApiMethod, TokenHeaderKind};

    fn server() -> ServerPath {
        ServerPath::cloud()
    }

    fn repo() -> RepositoryPath {
        RepositoryPath::new("acme", "ide-plugin")
    }

    #[test]
    fn gql_factories_post_to_graphql_endpoint_with_bearer() {
        let request = pull_request::find_one(&server(), &repo(), 42);
        assert_eq!(request.url(), "https://api.bitbucket.org/graphql");
        assert_eq!(request.method(), ApiMethod::Post);
        assert_eq!(request.token_kind(), TokenHeaderKind::Bearer);
        assert_eq!(request.operation_name(), Some("find pull request"));
    }

    #[test]
    fn timeline_variables_carry_cursor_and_since() {
        let pagination = GraphQLRequestPagination {
            after_cursor: Some("abc".to_string()),
            since: None,
            page_size: 30,
        };
        let request = pull_request::timeline(&server(), &repo(), 7, &pagination);
        let body: Value = serde_json::from_str(request.body().unwrap()).unwrap();
        assert_eq!(body["variables"]["cursor"], "abc");
        assert_eq!(body["variables"]["since"], Value::Null);
        assert_eq!(body["variables"]["pageSize"], 30);
        assert_eq!(body["variables"]["number"], 7);
    }

    #[test]
    fn search_variables_carry_query_string() {
        let pagination = GraphQLRequestPagination::cursor(None, 50);
        let request = pull_request::search(&server(), "type:pr state:open", &pagination);
        let body: Value = serde_json::from_str(request.body().unwrap()).unwrap();
        assert_eq!(body["variables"]["query"], "type:pr state:open");
        assert_eq!(body["variables"]["cursor"], Value::Null);
    }
}
