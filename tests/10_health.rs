mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await?;

    // No database is configured for tests, so degraded is the expected answer
    assert!(
        res.status() == StatusCode::OK || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"]["status"].is_string(), "missing status: {}", body);
    Ok(())
}

#[tokio::test]
async fn root_describes_the_api() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let body = client
        .get(server.url("/"))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"]["games"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_not_found() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/nope")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn server_stops_when_handle_drops() -> Result<()> {
    let server = common::start_server().await?;
    let url = server.url("/health");
    drop(server);

    let client = reqwest::Client::new();
    assert!(client.get(&url).send().await.is_err(), "server still listening after drop");
    Ok(())
}
