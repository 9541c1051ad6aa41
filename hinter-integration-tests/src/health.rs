//! Tests the health check used by load balancers.
#![cfg(test)]

use crate::{hinter_test, TestingTools};
use anyhow::Result;
use reqwest::StatusCode;

#[actix_rt::test]
async fn health_works() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/health").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["content-type"], "application/json");
            assert_eq!(response.text().await?, r#"{"data":"OK"}"#);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn health_ignores_query_strings() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/health?part=x&page=zz").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.text().await?, r#"{"data":"OK"}"#);

            Ok(())
        },
    )
    .await
}
