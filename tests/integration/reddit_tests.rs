//! Full crawls through the Reddit client against a mock API

use serde_json::json;
use std::path::Path;
use sublink::config::{parse_config, Config};
use sublink::source::RedditSource;
use sublink::storage::{open_store, SqliteLinkStore};
use sublink::{trigger, CrawlOrchestrator, DomainPatternSet, TriggerResponse};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer, auth: &str, db_path: &Path) -> Config {
    let toml = format!(
        r#"
[source]
api-base = "{base}"
user-agent = "sublink-test/0.1"
page-size = 10

[auth]
{auth}
token-url = "{base}/api/v1/access_token"

[crawler]
request-interval-ms = 0

[filter]
allowed-domains = ['good\.com']

[output]
database-path = "{db}"
"#,
        base = server.uri(),
        auth = auth,
        db = db_path.display()
    );
    parse_config(&toml).unwrap()
}

fn build(config: &Config) -> CrawlOrchestrator<RedditSource, SqliteLinkStore> {
    CrawlOrchestrator::new(
        RedditSource::from_config(config).unwrap(),
        open_store(Path::new(&config.output.database_path)).unwrap(),
        DomainPatternSet::from_config(&config.filter).unwrap(),
        &config.crawler,
    )
}

async fn mount_forum(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/r/rust/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    { "kind": "t3", "data": {
                        "id": "new1", "name": "t3_new1", "title": "Fresh",
                        "selftext": "see http://good.com/plain",
                        "selftext_html": "<div><a href=\"http://good.com/body\">body</a></div>",
                        "created_utc": 1704456000.0
                    }},
                    { "kind": "t3", "data": {
                        "id": "old1", "name": "t3_old1", "title": "Stale",
                        "selftext": "", "selftext_html": null,
                        "created_utc": 1672531200.0
                    }}
                ]
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/new1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "kind": "Listing", "data": { "children": [] } },
            { "kind": "Listing", "data": { "children": [
                { "kind": "t1", "data": {
                    "id": "c1", "name": "t1_c1", "parent_id": "t3_new1",
                    "body": "",
                    "body_html": "<a href=\"https://bad.com/nope\">no</a> <a href=\"https://good.com/comment\">yes</a>",
                    "replies": ""
                }},
                { "kind": "more", "data": {
                    "id": "m1", "name": "t1_m1", "parent_id": "t3_new1",
                    "count": 1, "children": ["c2"]
                }}
            ]}}
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "json": { "errors": [], "data": { "things": [
                { "kind": "t1", "data": {
                    "id": "c2", "name": "t1_c2", "parent_id": "t3_new1",
                    "body": "",
                    "body_html": "<a href=\"https://www.good.com/more\">more</a>",
                    "replies": ""
                }}
            ]}}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_through_api_with_static_token() {
    let server = MockServer::start().await;
    mount_forum(&server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("links.db");
    let config = test_config(&server, r#"access-token = "tok""#, &db_path);
    let mut orchestrator = build(&config);

    let response = trigger(&mut orchestrator, "rust", "2024-01-01").await;

    assert_eq!(
        response,
        TriggerResponse::Links(vec![
            "http://good.com/body".to_string(),
            "https://good.com/comment".to_string(),
            "https://www.good.com/more".to_string(),
        ])
    );

    let store = orchestrator.store();
    assert_eq!(store.count_links().unwrap(), 3);

    let recent = store.recent_links(1).unwrap();
    assert_eq!(recent[0].url, "https://www.good.com/more");
    assert_eq!(recent[0].submission_title.as_deref(), Some("Fresh"));
    assert_eq!(
        recent[0].submission_date.as_deref(),
        Some("2024-01-05T12:00:00+00:00")
    );

    // listing, comments, one morechildren call
    assert_eq!(orchestrator.limiter().requests(), 3);
}

#[tokio::test]
async fn test_client_credentials_token_fetched_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "app-token",
            "token_type": "bearer",
            "expires_in": 86400
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/rust/new"))
        .and(header("authorization", "Bearer app-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": { "after": null, "children": [
                { "kind": "t3", "data": {
                    "id": "new1", "name": "t3_new1", "title": "Fresh",
                    "selftext": "", "selftext_html": null,
                    "created_utc": 1704456000.0
                }}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/new1"))
        .and(header("authorization", "Bearer app-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "kind": "Listing", "data": { "children": [] } },
            { "kind": "Listing", "data": { "children": [] } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        &server,
        "client-id = \"id\"\nclient-secret = \"secret\"",
        &dir.path().join("links.db"),
    );
    let mut orchestrator = build(&config);

    let response = trigger(&mut orchestrator, "rust", "2024-01-01").await;

    assert_eq!(response, TriggerResponse::Links(vec![]));
}

#[tokio::test]
async fn test_missing_community_is_source_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/nosuchplace/new"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, r#"access-token = "tok""#, &dir.path().join("links.db"));
    let mut orchestrator = build(&config);

    let json = trigger(&mut orchestrator, "nosuchplace", "2024-01-01")
        .await
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["error"]["reason"], "SourceUnavailable");
    assert_eq!(orchestrator.store().count_links().unwrap(), 0);
}
