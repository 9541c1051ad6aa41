//! Tests behavior shared by every route.
#![cfg(test)]

use crate::{hinter_test, TestingTools};
use anyhow::Result;
use pretty_assertions::assert_eq;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

#[actix_rt::test]
async fn unknown_routes_are_not_found() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/api/v1/suggest?q=apple").send().await?;

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({"error": "Not found: /api/v1/suggest"}));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn cors_preflight_is_answered() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .request(Method::OPTIONS, "/suggest?part=ap")
                .header("Origin", "https://example.com")
                .header("Access-Control-Request-Method", "GET")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers()["access-control-allow-origin"],
                "https://example.com"
            );

            Ok(())
        },
    )
    .await
}
