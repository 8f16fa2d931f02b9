//
//  bitbucket-ide
//  tests/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination drivers against a mock server: Link-header walking for REST
//! and cursor/timestamp iteration for GraphQL connections.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use bitbucket_ide::api::executor::{RequestExecutorFactory, TokenAuthExecutor};
use bitbucket_ide::api::graphql::{query_traversed, queries};
use bitbucket_ide::api::request::ApiRequest;
use bitbucket_ide::api::settings::ApiSettings;
use bitbucket_ide::api::util::{GraphQLPagesLoader, PagesRequest};

fn executor() -> TokenAuthExecutor {
    RequestExecutorFactory::new(ApiSettings::default())
        .create("s3cret".to_string())
        .unwrap()
}

fn pages_request(server: &ServerGuard) -> PagesRequest<u32> {
    PagesRequest::new(
        ApiRequest::get_json_page(format!("{}/items", server.url())),
        |link| ApiRequest::get_json_page(link),
    )
}

fn link_to(server: &ServerGuard, path: &str) -> String {
    format!(r#"<{}{path}>; rel="next""#, server.url())
}

#[tokio::test]
async fn rest_load_all_follows_links_and_stops_without_next() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/items")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("link", &link_to(&server, "/items?page=2"))
        .with_body("[1, 2]")
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/items?page=2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[3]")
        .expect(1)
        .create_async()
        .await;

    let items = pages_request(&server)
        .load_all(&executor(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(items, vec![1, 2, 3]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn rest_walk_survives_empty_intermediate_pages() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/items")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("link", &link_to(&server, "/items?page=2"))
        .with_body("[]")
        .create_async()
        .await;
    server
        .mock("GET", "/items?page=2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[7]")
        .create_async()
        .await;

    let items = pages_request(&server)
        .load_all(&executor(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(items, vec![7]);
}

#[tokio::test]
async fn rest_load_up_to_truncates_and_stops_fetching() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/items")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("link", &link_to(&server, "/items?page=2"))
        .with_body("[1, 2, 3]")
        .expect(1)
        .create_async()
        .await;
    let never_fetched = server
        .mock("GET", "/items?page=2")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let items = pages_request(&server)
        .load_up_to(&executor(), &CancellationToken::new(), 2)
        .await
        .unwrap();

    assert_eq!(items, vec![1, 2]);
    never_fetched.assert_async().await;
}

#[tokio::test]
async fn rest_find_stops_at_first_match() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/items")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("link", &link_to(&server, "/items?page=2"))
        .with_body("[1, 2, 3]")
        .expect(1)
        .create_async()
        .await;
    let never_fetched = server
        .mock("GET", "/items?page=2")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let found = pages_request(&server)
        .find(&executor(), &CancellationToken::new(), |item| *item == 2)
        .await
        .unwrap();

    assert_eq!(found, Some(2));
    never_fetched.assert_async().await;
}

#[tokio::test]
async fn rest_find_exhausts_all_pages_without_match() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/items")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("link", &link_to(&server, "/items?page=2"))
        .with_body("[1]")
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/items?page=2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[2]")
        .expect(1)
        .create_async()
        .await;

    let found = pages_request(&server)
        .find(&executor(), &CancellationToken::new(), |item| *item == 9)
        .await
        .unwrap();

    assert_eq!(found, None);
}

fn timeline_body(nodes: serde_json::Value, end_cursor: &str, has_next: bool) -> String {
    json!({
        "data": {
            "repository": {
                "pullRequest": {
                    "timelineItems": {
                        "pageInfo": {
                            "startCursor": "s",
                            "endCursor": end_cursor,
                            "hasNextPage": has_next,
                            "hasPreviousPage": false
                        },
                        "nodes": nodes
                    }
                }
            }
        }
    })
    .to_string()
}

fn timeline_loader(
    server: &ServerGuard,
) -> GraphQLPagesLoader<TokenAuthExecutor, serde_json::Value> {
    let url = format!("{}/graphql", server.url());
    GraphQLPagesLoader::new(
        Arc::new(executor()),
        move |pagination| {
            query_traversed(
                url.clone(),
                queries::PULL_REQUEST_TIMELINE,
                json!({
                    "repoOwner": "acme",
                    "repoName": "ide-plugin",
                    "number": 7,
                    "pageSize": pagination.page_size,
                    "cursor": pagination.cursor_variable(),
                    "since": pagination.since_variable(),
                }),
                &["repository", "pullRequest", "timelineItems"],
            )
        },
        true,
        30,
    )
}

#[tokio::test]
async fn gql_loader_round_trips_cursors_and_terminates() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJsonString(
            r#"{"variables": {"cursor": null}}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body(json!([{"n": 1}, {"n": 2}]), "CUR-1", true))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJsonString(
            r#"{"variables": {"cursor": "CUR-1"}}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body(json!([{"n": 3}]), "CUR-2", false))
        .expect(1)
        .create_async()
        .await;

    let loader = timeline_loader(&server);
    let ct = CancellationToken::new();

    let page_one = loader.load_next(&ct, false).await.unwrap().unwrap();
    assert_eq!(page_one.len(), 2);
    assert!(loader.has_next());

    let page_two = loader.load_next(&ct, false).await.unwrap().unwrap();
    assert_eq!(page_two.len(), 1);
    assert!(!loader.has_next());

    // Exhausted: no further network traffic.
    assert_eq!(loader.load_next(&ct, false).await.unwrap(), None);

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn gql_update_mode_requires_exhaustion_first() {
    let mut server = Server::new_async().await;
    let untouched = server
        .mock("POST", "/graphql")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let loader = timeline_loader(&server);
    assert!(!loader.ready_for_updates());

    let loaded = loader
        .load_next(&CancellationToken::new(), true)
        .await
        .unwrap();
    assert_eq!(loaded, None);
    untouched.assert_async().await;
}

#[tokio::test]
async fn gql_update_mode_refetches_since_last_sync() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJsonString(
            r#"{"variables": {"since": null}}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body(json!([{"n": 1}]), "CUR-1", false))
        .expect(1)
        .create_async()
        .await;
    let update = server
        .mock("POST", "/graphql")
        .match_body(Matcher::Regex(r#""since":"20\d\d-"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body(json!([{"n": 9}]), "CUR-1", false))
        .expect(1)
        .create_async()
        .await;

    let loader = timeline_loader(&server);
    let ct = CancellationToken::new();

    loader.load_next(&ct, false).await.unwrap();
    assert!(loader.ready_for_updates());

    let updates = loader.load_next(&ct, true).await.unwrap().unwrap();
    assert_eq!(updates.len(), 1);
    update.assert_async().await;
}

#[tokio::test]
async fn gql_reset_restarts_from_the_first_page() {
    let mut server = Server::new_async().await;
    let from_start = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJsonString(
            r#"{"variables": {"cursor": null}}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body(json!([{"n": 1}]), "CUR-1", false))
        .expect(2)
        .create_async()
        .await;

    let loader = timeline_loader(&server);
    let ct = CancellationToken::new();

    loader.load_next(&ct, false).await.unwrap();
    assert!(!loader.has_next());

    loader.reset();
    assert!(loader.has_next());
    assert!(!loader.ready_for_updates());

    loader.load_next(&ct, false).await.unwrap();
    from_start.assert_async().await;
}
