//
//  bitbucket-ide
//  api/coordinates.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Server Paths and Repository Coordinates
//!
//! Value types naming *where* a request goes: the server instance (Cloud or
//! self-hosted), the repository path (owner + name), and the pair of both.
//!
//! ## Platform Detection
//!
//! `bitbucket.org` / `api.bitbucket.org` resolve to the Cloud API; any other
//! host is treated as a self-hosted Server/Data Center instance with its API
//! rooted under the host itself.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host part of Bitbucket Cloud.
pub const CLOUD_HOST: &str = "bitbucket.org";

/// Address of a Bitbucket instance, Cloud or self-hosted.
///
/// # Example
///
/// ```rust
/// use bitbucket_ide::api::coordinates::ServerPath;
///
/// let cloud = ServerPath::cloud();
/// assert!(cloud.is_cloud());
/// assert_eq!(cloud.to_api_url(), "https://api.bitbucket.org/2.0");
///
/// let hosted = ServerPath::host("bitbucket.example.com");
/// assert_eq!(hosted.to_api_url(), "https://bitbucket.example.com/rest/api/1.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerPath {
    host: String,
}

impl ServerPath {
    /// Bitbucket Cloud.
    pub fn cloud() -> Self {
        Self {
            host: CLOUD_HOST.to_string(),
        }
    }

    /// A self-hosted Server/Data Center instance.
    ///
    /// Cloud hostnames are normalized, so `ServerPath::host("bitbucket.org")`
    /// equals [`ServerPath::cloud`].
    pub fn host(host: impl Into<String>) -> Self {
        let host = host.into();
        let host = host
            .trim_end_matches('/')
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string();
        Self { host }
    }

    /// Whether this path targets Bitbucket Cloud.
    pub fn is_cloud(&self) -> bool {
        self.host == CLOUD_HOST || self.host == format!("api.{CLOUD_HOST}")
    }

    /// Base URL for REST API requests.
    pub fn to_api_url(&self) -> String {
        if self.is_cloud() {
            format!("https://api.{CLOUD_HOST}/2.0")
        } else {
            format!("https://{}/rest/api/1.0", self.host)
        }
    }

    /// URL of the GraphQL endpoint.
    pub fn to_graphql_url(&self) -> String {
        if self.is_cloud() {
            format!("https://api.{CLOUD_HOST}/graphql")
        } else {
            format!("https://{}/rest/graphql", self.host)
        }
    }
}

impl fmt::Display for ServerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

/// Owner and name of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryPath {
    /// Workspace or user owning the repository.
    pub owner: String,
    /// Repository name (slug).
    pub repository: String,
}

impl RepositoryPath {
    /// Builds a repository path from its parts.
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
        }
    }
}

impl fmt::Display for RepositoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repository)
    }
}

/// A repository on a specific server: everything needed to address its API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryCoordinates {
    /// The server hosting the repository.
    pub server_path: ServerPath,
    /// The repository within that server.
    pub repository_path: RepositoryPath,
}

impl RepositoryCoordinates {
    /// Builds coordinates from a server and a repository path.
    pub fn new(server_path: ServerPath, repository_path: RepositoryPath) -> Self {
        Self {
            server_path,
            repository_path,
        }
    }
}

impl fmt::Display for RepositoryCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server_path, self.repository_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_detection() {
        assert!(ServerPath::cloud().is_cloud());
        assert!(ServerPath::host("bitbucket.org").is_cloud());
        assert!(!ServerPath::host("git.example.com").is_cloud());
    }

    #[test]
    fn hosted_urls() {
        let server = ServerPath::host("https://bitbucket.example.com/");
        assert_eq!(server.to_api_url(), "https://bitbucket.example.com/rest/api/1.0");
        assert_eq!(server.to_graphql_url(), "https://bitbucket.example.com/rest/graphql");
    }
}
