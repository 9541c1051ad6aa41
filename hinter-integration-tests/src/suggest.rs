//! Tests Hinter's ability to make suggestions, and the shapes it returns them in.
#![cfg(test)]

use crate::{hinter_test, TestingTools};
use anyhow::Result;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};

/// The version of `fixtures/index.json`.
const FIXTURE_VERSION: u64 = 20240601;

/// The texts of the suggestions in a payload, which is either a bare list or
/// an object with `items`.
fn texts(data: &Value) -> Vec<&str> {
    let items = data
        .as_array()
        .or_else(|| data["items"].as_array())
        .expect("payload has no items");
    items
        .iter()
        .map(|item| item["text"].as_str().expect("item has no text"))
        .collect()
}

#[actix_rt::test]
async fn plain_list_in_ranked_order() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/suggest?part=app").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(
                texts(&body["data"]),
                vec!["Apple Pie", "Apple", "Applesauce", "Application"]
            );
            assert_eq!(
                body["data"][1],
                json!({"id": 1, "text": "Apple", "class": "fruit", "weight": 50})
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn exact_match_comes_first() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .get("/suggest?part=APPLE")
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(
                texts(&body["data"]),
                vec!["Apple", "Apple Pie", "Applesauce"]
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn keywords_and_markup() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .get("/suggest")
                .query(&[("part", "<i>Pom</i>")])
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(texts(&body["data"]), vec!["Apple"]);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn missing_or_unknown_term_is_an_empty_list() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            for path in ["/suggest", "/suggest?part=", "/suggest?part=zzz"] {
                let response = test_client.get(path).send().await?;
                assert_eq!(response.status(), StatusCode::OK);
                assert_eq!(response.json::<Value>().await?, json!({ "data": [] }));
            }

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn paginated_and_versioned() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            let body: Value = test_client
                .get("/suggest?part=ap&count=2&page=1&with-version=true")
                .send()
                .await?
                .json()
                .await?;

            let data = &body["data"];
            assert_eq!(texts(data), vec!["Apple", "Applesauce"]);
            assert_eq!(data["pageNumber"], json!(1));
            assert_eq!(data["totalPagesCount"], json!(3));
            assert_eq!(data["totalItemsCount"], json!(5));
            assert_eq!(data["version"], json!(FIXTURE_VERSION));

            assert!(metrics_watcher.has_histogram("suggest.candidates", 5.0));
            assert!(metrics_watcher.has_incr("suggest.paginated"));
            assert!(metrics_watcher.has_incr("suggest.versioned"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn last_page_and_past_the_end() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .get("/suggest?part=ap&count=2&page=2")
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(
                body["data"],
                json!({
                    "items": [{"id": 5, "text": "Application", "class": "word", "weight": 10}],
                    "pageNumber": 2,
                    "totalPagesCount": 3,
                    "totalItemsCount": 5,
                })
            );

            let body: Value = test_client
                .get("/suggest?part=ap&count=2&page=9")
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(body["data"]["items"], json!([]));
            assert_eq!(body["data"]["pageNumber"], json!(9));
            assert_eq!(body["data"]["totalItemsCount"], json!(5));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn count_without_page_truncates() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .get("/suggest?part=ap&count=2&with-version=yes")
                .send()
                .await?
                .json()
                .await?;

            // "yes" is not a boolean, so there is no version either.
            assert_eq!(texts(&body["data"]), vec!["Apple Pie", "Apricot"]);
            assert!(body["data"].is_array());

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn versioned_list() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .get("/suggest?part=ban&with-version=T")
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(
                body,
                json!({
                    "data": {
                        "items": [{"id": 6, "text": "Banana", "class": "fruit", "weight": 70}],
                        "version": FIXTURE_VERSION,
                    }
                })
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn malformed_parameters_are_ignored() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/suggest?part=ap&count=lots&page=-1&with-version=maybe")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(texts(&body["data"]).len(), 5);
            assert!(body["data"].is_array());

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn class_filters() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .get("/suggest?part=ap&class=fruit")
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(texts(&body["data"]), vec!["Apricot", "Apple"]);

            let body: Value = test_client
                .get("/suggest?part=ap&exclude-class=dessert&exclude-class=word")
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(texts(&body["data"]), vec!["Apricot", "Apple"]);

            let body: Value = test_client
                .get("/suggest?part=ap&class=fruit&class=dessert&exclude-class=fruit")
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(texts(&body["data"]), vec!["Apple Pie", "Applesauce"]);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn equal_shaped_letters_are_folded_when_enabled() -> Result<()> {
    // Cyrillic capital A followed by two Cyrillic small er.
    let lookalike = "\u{410}\u{440}\u{440}";

    hinter_test(
        |settings| settings.normalization.equal_shaped = true,
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .get("/suggest")
                .query(&[("part", lookalike)])
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(texts(&body["data"]).len(), 4);

            Ok::<(), anyhow::Error>(())
        },
    )
    .await?;

    hinter_test(
        |settings| settings.normalization.equal_shaped = false,
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .get("/suggest")
                .query(&[("part", lookalike)])
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(body["data"], json!([]));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn cors_headers_on_success_and_error() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/suggest?part=ap").send().await?;
            let headers = response.headers();
            assert_eq!(headers["access-control-allow-origin"], "*");
            assert_eq!(headers["access-control-allow-methods"], "GET, OPTIONS");
            assert_eq!(headers["access-control-allow-headers"], "Content-Type");
            assert_eq!(headers["content-type"], "application/json");

            let response = test_client.get("/suggest/nope").send().await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(response.headers()["access-control-allow-origin"], "*");

            Ok(())
        },
    )
    .await
}
