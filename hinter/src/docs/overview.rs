//! # High level overview of Hinter
//!
//! This project is structured as a [Cargo Workspace][] that contains one crate
//! for each broad area of behavior.
//!
//! [Cargo Workspace]: https://doc.rust-lang.org/book/ch14-03-cargo-workspaces.html
//!
//! ## [`hinter`](../)
//!
//! The binary. It loads settings, sets up logging and metrics, and starts the
//! web server.
//!
//! ## [`hinter-settings`](../../hinter_settings/index.html)
//!
//! Defines and documents the settings of the application. Settings are loaded
//! by the binary and passed into the other crates to configure them.
//!
//! ## [`hinter-suggest`](../../hinter_suggest/index.html)
//!
//! Everything between the query string and the response body: parameter
//! parsing, class filters, term normalization, the prefix index, pagination
//! and the response shapes. Nothing in this crate knows about HTTP.
//!
//! ## [`hinter-web`](../../hinter_web/index.html)
//!
//! The HTTP API. Wires the pieces of `hinter-suggest` into the `/suggest`
//! handler, and adds the response envelopes, CORS headers, request logging and
//! the health check.
//!
//! ## [`hinter-integration-tests`](../../hinter_integration_tests/index.html)
//!
//! Tests that start the real server and talk to it over HTTP.
