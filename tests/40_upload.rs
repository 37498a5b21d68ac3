mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn upload_requires_admin() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/upload"))
        .multipart(Form::new().text("note", "hello"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn upload_requires_a_file_part() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/upload"))
        .bearer_auth(common::token_for_role("admin"))
        .multipart(Form::new().text("note", "hello"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "No file provided");
    Ok(())
}

#[tokio::test]
async fn upload_rejects_non_images() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let file = Part::bytes(b"plain text".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")?;

    let res = client
        .post(server.url("/api/upload"))
        .bearer_auth(common::token_for_role("admin"))
        .multipart(Form::new().part("file", file))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "File must be an image");
    Ok(())
}

#[tokio::test]
async fn upload_rejects_non_multipart_bodies() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/upload"))
        .bearer_auth(common::token_for_role("admin"))
        .json(&serde_json::json!({ "file": "data:image/png;base64,AAAA" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

async fn upload_png_of_size(size: usize) -> Result<(StatusCode, Value)> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let file = Part::bytes(vec![0u8; size])
        .file_name("huge.png")
        .mime_str("image/png")?;

    let res = client
        .post(server.url("/api/upload"))
        .bearer_auth(common::token_for_role("admin"))
        .multipart(Form::new().part("file", file))
        .send()
        .await?;

    let status = res.status();
    Ok((status, res.json::<Value>().await?))
}

#[tokio::test]
async fn upload_rejects_images_over_five_megabytes() -> Result<()> {
    let (status, body) = upload_png_of_size(6 * 1024 * 1024).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File size must be less than 5MB");
    Ok(())
}

#[tokio::test]
async fn upload_over_request_limit_reports_file_size() -> Result<()> {
    let (status, body) = upload_png_of_size(11 * 1024 * 1024).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File size must be less than 5MB");
    Ok(())
}
