//
//  bitbucket-ide
//  api/data.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Data Transfer Objects
//!
//! Deserialization targets for REST responses and GraphQL node payloads.
//! Fields mirror the wire names; only what the plugin consumes is modeled,
//! and unknown fields are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A user as it appears embedded in other resources.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub node_id: Option<String>,
    pub login: String,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

/// The user the current credentials authenticate as.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub node_id: Option<String>,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

/// An organization the authenticated user belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
}

/// A team within an organization.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub slug: String,
    pub name: Option<String>,
    pub combined_slug: Option<String>,
}

/// A repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub node_id: Option<String>,
    pub name: String,
    pub full_name: String,
    pub owner: User,
    pub private: bool,
    pub fork: bool,
    pub default_branch: Option<String>,
    pub html_url: Option<String>,
    pub clone_url: Option<String>,
    pub description: Option<String>,
}

/// Effective permission level of the viewer on a repository.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepositoryPermission {
    Read,
    Triage,
    Write,
    Maintain,
    Admin,
}

impl RepositoryPermission {
    /// Whether this level allows pushing changes.
    pub fn can_write(self) -> bool {
        self >= RepositoryPermission::Write
    }
}

/// Viewer-scoped repository data returned by the permission query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryViewerPermission {
    pub viewer_permission: Option<RepositoryPermission>,
}

/// A pull request in list form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestShort {
    pub id: String,
    pub number: i64,
    pub title: String,
    pub state: PullRequestState,
    pub author: Option<GraphQLActor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_draft: Option<bool>,
}

/// Full pull request payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: String,
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    pub state: PullRequestState,
    pub author: Option<GraphQLActor>,
    pub base_ref_name: Option<String>,
    pub head_ref_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_draft: Option<bool>,
}

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

/// Mergeability snapshot of a pull request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestMergeability {
    pub mergeable: MergeableState,
    pub can_be_rebased: Option<bool>,
    pub merge_state_status: Option<String>,
}

/// Whether a pull request can merge cleanly.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeableState {
    Mergeable,
    Conflicting,
    Unknown,
}

/// One item of a pull request timeline.
///
/// Timeline nodes are a union; only the discriminator and the fields shared
/// by the comment-like members are modeled, everything else deserializes to
/// `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    #[serde(rename = "__typename")]
    pub type_name: String,
    pub body: Option<String>,
    pub state: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub author: Option<GraphQLActor>,
}

/// A review discussion anchored to a file position.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewThread {
    pub id: String,
    pub is_resolved: bool,
    pub line: Option<i64>,
    pub path: Option<String>,
    pub comments: ReviewThreadComments,
}

/// Inline node list of a thread's comments.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewThreadComments {
    #[serde(default)]
    pub nodes: Vec<ReviewComment>,
}

/// One comment within a review thread.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<GraphQLActor>,
}

/// Commit wrapper node of a pull request's commit connection.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestCommit {
    pub commit: Commit,
}

/// A git commit as surfaced by the commit connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub oid: String,
    pub abbreviated_oid: Option<String>,
    pub message_headline: Option<String>,
    pub author: Option<GitActor>,
}

/// Name/email pair recorded in commit metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct GitActor {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Minimal actor shape shared by GraphQL payloads.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLActor {
    pub login: String,
    pub avatar_url: Option<String>,
    pub url: Option<String>,
}

/// A review comment body fetched or updated through GraphQL.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewCommentBody {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_ordering_reflects_capability() {
        assert!(RepositoryPermission::Admin.can_write());
        assert!(RepositoryPermission::Write.can_write());
        assert!(!RepositoryPermission::Triage.can_write());
        assert!(!RepositoryPermission::Read.can_write());
    }

    #[test]
    fn repository_deserializes_from_rest_shape() {
        let repo: Repository = serde_json::from_str(
            r#"{
                "id": 42,
                "node_id": "R_abc",
                "name": "ide-plugin",
                "full_name": "acme/ide-plugin",
                "owner": {"id": 7, "login": "acme"},
                "private": true,
                "fork": false,
                "default_branch": "main",
                "unmodeled": {"ignored": true}
            }"#,
        )
        .unwrap();
        assert_eq!(repo.full_name, "acme/ide-plugin");
        assert_eq!(repo.owner.login, "acme");
        assert!(repo.private);
    }

    #[test]
    fn pull_request_state_parses_wire_names() {
        assert_eq!(
            serde_json::from_str::<PullRequestState>("\"MERGED\"").unwrap(),
            PullRequestState::Merged
        );
    }
}
