#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are marked
// as used. But docs don't generate for the below if they are `#[cfg(test)]`.
#![allow(dead_code)]

//! Tests for Hinter that work by reading from the external API only.
//!
//! The URL paths, query parameters and JSON shapes Hinter exposes are its
//! public API, and clients depend on them. The tests here pin those details.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `hinter/tests/...`.
//!
//! The primary tool used by tests is [`hinter_test`], which loads the fixture
//! index, starts the real server on an OS assigned port, and provides helpers
//! to inspect logs and metrics. It then calls the test function that is passed
//! to it, providing those tools as an argument.
//!
//! ```no_run
//! use hinter_integration_tests::{hinter_test, TestingTools};
//! use reqwest::StatusCode;
//!
//! # actix_rt::System::new().block_on(async {
//! hinter_test(
//!     |settings| settings.log_full_request = true,
//!     |TestingTools { test_client, .. }| async move {
//!         let response = test_client.get("/health").send().await.unwrap();
//!         assert_eq!(response.status(), StatusCode::OK);
//!     },
//! )
//! .await
//! # })
//! ```

mod general;
mod health;
mod logging;
mod suggest;
mod utils;

pub use crate::utils::{
    logging::{LogWatcher, TracingJsonEvent},
    metrics::MetricsWatcher,
    test_tools::{hinter_test, TestReqwestClient, TestingTools},
};
