//! End-to-end tests against a served instance.
//!
//! Each test binds its own server to an ephemeral port and talks to it with a
//! cookie-keeping `reqwest` client, the way a browser front end would.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use market_stall_integration_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, TestServer, client};

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let response = client.post(url).json(&body).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn get(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let response = client.get(url).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::spawn().await;
    let response = client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_shopping_session_over_http() {
    let server = TestServer::spawn().await;
    let alice = client();

    let (status, _) = post(
        &alice,
        server.url("/users"),
        json!({ "username": "alice", "password": "pw1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &alice,
        server.url("/login"),
        json!({ "username": "alice", "password": "pw1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], true);

    let (status, body) = post(&alice, server.url("/addmyitem"), json!({ "itemId": 1 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cartSize"], 1);

    let (_, cart) = get(&alice, server.url("/cart")).await;
    assert_eq!(cart[0]["name"], "Notebook");

    // A second browser sees none of it
    let (status, _) = get(&client(), server.url("/myitems")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post(&alice, server.url("/logout"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);

    let (_, body) = get(&alice, server.url("/session")).await;
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_bootstrap_admin_manages_catalog() {
    let server = TestServer::spawn().await;
    let admin = client();

    let (status, _) = post(
        &admin,
        server.url("/login"),
        json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, category) = post(
        &admin,
        server.url("/categories"),
        json!({ "name": "garden" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["name"], "garden");

    let (status, item) = post(
        &admin,
        server.url("/items"),
        json!({
            "name": "Trowel",
            "description": "Forged steel",
            "price": 15.25,
            "inStock": 5,
            "category": "garden"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["price"], 15.25);
    assert_eq!(item["category"], "garden");

    let (_, items) = get(&client(), server.url("/items")).await;
    assert!(items.as_array().unwrap().iter().any(|i| i["name"] == "Trowel"));
}
