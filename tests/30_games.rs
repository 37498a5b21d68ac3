mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn games_require_a_token() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/games")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn games_reject_bad_tokens() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let forged = common::token_with_secret("admin", "some-other-secret");
    for header in ["Token abc".to_string(), "Bearer ".to_string(), format!("Bearer {}", forged)] {
        let res = client
            .post(server.url("/api/games"))
            .header("Authorization", header.as_str())
            .json(&json!({ "title": "x" }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "header {:?}", header);
    }
    Ok(())
}

#[tokio::test]
async fn games_forbid_non_admins() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .delete(server.url("/api/games/67e55044-10b1-426f-9247-bb680e5fe0c8"))
        .bearer_auth(common::token_for_role("user"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Access denied. Admin only.");
    Ok(())
}

#[tokio::test]
async fn whoami_echoes_admin_claims() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/auth/whoami"))
        .bearer_auth(common::token_for_role("admin"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["email"], "admin@example.com");
    assert_eq!(body["data"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn create_reports_missing_fields_before_touching_storage() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/games"))
        .bearer_auth(common::token_for_role("admin"))
        .json(&json!({
            "title": "Night Watch",
            "price": "free",
            "friends": ["Alice", "data:image/png;base64,AAAA"],
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["startDate"], "This field is required");
    assert_eq!(body["field_errors"]["durationInMinutes"], "This field is required");
    assert!(body["field_errors"]["price"].is_string());
    assert!(body["field_errors"].get("title").is_none());
    Ok(())
}

#[tokio::test]
async fn update_validates_body() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .put(server.url("/api/games/67e55044-10b1-426f-9247-bb680e5fe0c8"))
        .bearer_auth(common::token_for_role("admin"))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn malformed_game_ids_are_not_found() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/games/not-a-game"))
        .bearer_auth(common::token_for_role("admin"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Game not found");
    Ok(())
}
