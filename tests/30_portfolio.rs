mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn unknown_user_has_no_public_profile() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };

    let res = reqwest::get(server.url(&format!("/api/v1/public/user/{}", common::unique_username("none")))).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "message": "Username not found" }));
    Ok(())
}

#[tokio::test]
async fn positions_show_on_the_public_profile() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let username = common::unique_username("pf");

    client
        .post(server.url("/api/v1/register"))
        .json(&json!({ "name": "Portfolio", "username": username, "password": "secret123" }))
        .send()
        .await?
        .error_for_status()?;
    let login: Value = client
        .post(server.url("/api/v1/login"))
        .json(&json!({ "username": username, "password": "secret123" }))
        .send()
        .await?
        .json()
        .await?;
    let token = login["data"]["token"].as_str().unwrap_or_default().to_string();

    let res = client
        .post(server.url("/api/v1/user-position"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Engineer" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = client
        .get(server.url(&format!("/api/v1/public/user/{}", username)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["positions"][0]["title"], "Engineer");
    Ok(())
}
