//
//  bitbucket-ide
//  api/graphql/queries.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GraphQL Query Registry
//!
//! Maps symbolic query names to the parametrized GraphQL documents embedded
//! in the crate. Requests name queries symbolically (see the constants
//! below) and [`load_query`] resolves the document text deterministically.
//!
//! An unknown name is a programming error, not a runtime condition: the
//! registry fails loudly instead of returning an empty document.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Teams of an organization, paged.
pub const FIND_ORGANIZATION_TEAMS: &str = "findOrganizationTeams";
/// Viewer's permission on a repository.
pub const FIND_REPOSITORY_PERMISSION: &str = "findRepositoryPermission";
/// Issue/PR search, paged.
pub const ISSUE_SEARCH: &str = "issueSearch";
/// One pull request by number.
pub const FIND_PULL_REQUEST: &str = "findPullRequest";
/// Timeline items of a pull request, paged, timestamp-refreshable.
pub const PULL_REQUEST_TIMELINE: &str = "pullRequestTimeline";
/// Review threads of a pull request, paged.
pub const PULL_REQUEST_REVIEW_THREADS: &str = "pullRequestReviewThreads";
/// Commits of a pull request, paged.
pub const PULL_REQUEST_COMMITS: &str = "pullRequestCommits";
/// Mergeability data of a pull request.
pub const FIND_PULL_REQUEST_MERGEABILITY: &str = "findPullRequestMergeability";
/// Markdown body of one review comment.
pub const GET_REVIEW_COMMENT_BODY: &str = "getReviewCommentBody";
/// Review comment update mutation.
pub const UPDATE_REVIEW_COMMENT: &str = "updateReviewComment";
/// Review comment delete mutation.
pub const DELETE_REVIEW_COMMENT: &str = "deleteReviewComment";

static QUERIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            FIND_ORGANIZATION_TEAMS,
            include_str!("queries/findOrganizationTeams.graphql"),
        ),
        (
            FIND_REPOSITORY_PERMISSION,
            include_str!("queries/findRepositoryPermission.graphql"),
        ),
        (ISSUE_SEARCH, include_str!("queries/issueSearch.graphql")),
        (FIND_PULL_REQUEST, include_str!("queries/findPullRequest.graphql")),
        (
            PULL_REQUEST_TIMELINE,
            include_str!("queries/pullRequestTimeline.graphql"),
        ),
        (
            PULL_REQUEST_REVIEW_THREADS,
            include_str!("queries/pullRequestReviewThreads.graphql"),
        ),
        (
            PULL_REQUEST_COMMITS,
            include_str!("queries/pullRequestCommits.graphql"),
        ),
        (
            FIND_PULL_REQUEST_MERGEABILITY,
            include_str!("queries/findPullRequestMergeability.graphql"),
        ),
        (
            GET_REVIEW_COMMENT_BODY,
            include_str!("queries/getReviewCommentBody.graphql"),
        ),
        (
            UPDATE_REVIEW_COMMENT,
            include_str!("queries/updateReviewComment.graphql"),
        ),
        (
            DELETE_REVIEW_COMMENT,
            include_str!("queries/deleteReviewComment.graphql"),
        ),
    ])
});

/// Resolves a symbolic query name to its GraphQL document text.
///
/// Deterministic and side-effect free from the caller's perspective.
///
/// # Panics
///
/// Panics when no document is registered under `name`. Callers pass the
/// constants above, so hitting this means a broken build, not bad input.
pub fn load_query(name: &str) -> &'static str {
    QUERIES
        .get(name)
        .copied()
        .unwrap_or_else(|| panic!("No GraphQL query registered under name '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_query_is_non_empty() {
        for (name, document) in QUERIES.iter() {
            assert!(
                document.contains("query") || document.contains("mutation"),
                "document for '{name}' looks empty"
            );
        }
    }

    #[test]
    fn load_query_is_deterministic() {
        assert_eq!(
            load_query(FIND_PULL_REQUEST).as_ptr(),
            load_query(FIND_PULL_REQUEST).as_ptr()
        );
    }

    #[test]
    #[should_panic(expected = "No GraphQL query registered")]
    fn unknown_name_panics() {
        load_query("noSuchQuery");
    }
}
