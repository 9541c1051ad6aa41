//! Tests that Hinter logs behave as expected.
//!
//! Every test server shares one log subscriber, so each test here searches for
//! a value that only it sends.
#![cfg(test)]

use crate::{hinter_test, TestingTools};
use anyhow::Result;
use tracing::Level;

#[actix_rt::test]
async fn suggest_request_is_logged_with_the_term() -> Result<()> {
    hinter_test(
        |settings| settings.log_full_request = true,
        |TestingTools {
             test_client,
             mut log_watcher,
             ..
         }| async move {
            test_client
                .get("/suggest?part=Logged%20Term&class=log-full&count=4")
                .send()
                .await?;

            assert!(log_watcher.has(|event| {
                event.field_equals("type", "web.suggest.request")
                    && event.field_equals("part", "Logged Term")
                    && event.field_equals("normalized", "logged term")
                    && event.field_equals("classes", "log-full")
                    && event.field_equals("count", 4)
                    && event.field_equals("pagination_on", false)
            }));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn suggest_request_hides_the_term_when_disabled() -> Result<()> {
    hinter_test(
        |settings| settings.log_full_request = false,
        |TestingTools {
             test_client,
             mut log_watcher,
             ..
         }| async move {
            test_client
                .get("/suggest?part=secret&class=log-hidden")
                .send()
                .await?;

            assert!(log_watcher.has(|event| {
                event.field_equals("type", "web.suggest.request")
                    && event.field_equals("classes", "log-hidden")
                    && event.field_equals("part", "")
            }));
            assert!(!log_watcher.has(|event| event.field_contains("part", "secret")));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unknown_routes_log_a_client_error() -> Result<()> {
    hinter_test(
        |_| (),
        |TestingTools {
             test_client,
             mut log_watcher,
             ..
         }| async move {
            test_client.get("/log-client-error").send().await?;

            assert!(log_watcher.has(|event| {
                event.level == Level::WARN
                    && event.field_contains("message", "Request client error")
            }));

            Ok(())
        },
    )
    .await
}
