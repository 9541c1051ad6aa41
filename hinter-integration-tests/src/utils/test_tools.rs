//! Tools for running tests

use crate::utils::{
    logging::{install_global_subscriber, LogWatcher},
    metrics::MetricsWatcher,
};
use hinter_settings::Settings;
use reqwest::{redirect, Client, ClientBuilder, Method, RequestBuilder};
use std::{future::Future, net::TcpListener, path::PathBuf};
use tracing::Instrument;

/// The index every test server is started with.
const FIXTURE_INDEX: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/index.json");

/// Run a test with a fully configured Hinter server.
///
/// The server will listen on a port assigned arbitrarily by the OS, and serves
/// the fixture index in `fixtures/index.json`.
///
/// A suite of tools will be passed to the test function in the form of an
/// instance of [`TestingTools`]. It includes an HTTP client configured to use
/// the test server, a log collector and a metrics collector that can make
/// assertions about what the server reported.
///
/// # Example
///
/// ```
/// # use hinter_integration_tests::{hinter_test, TestingTools};
/// #[actix_rt::test]
/// async fn a_test() {
///     hinter_test(
///         |settings| settings.log_full_request = false,
///         |TestingTools { test_client, mut log_watcher, .. }| async move {
///             assert!(true) // Test goes here
///         }
///     ).await
/// }
/// ```
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn hinter_test<FSettings, FTest, Fut>(
    settings_changer: FSettings,
    test: FTest,
) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: Fn(TestingTools) -> Fut,
    Fut: Future,
{
    let test_span = tracing::info_span!("hinter_test");

    // Load settings
    let mut settings = Settings::load_for_tests(|settings| {
        settings.index.path = PathBuf::from(FIXTURE_INDEX);
    });

    // Set up logging
    install_global_subscriber(&settings.logging);
    let log_watcher = LogWatcher::default();

    settings_changer(&mut settings);

    // Setup metrics
    assert_eq!(
        settings.metrics.sink_host, "0.0.0.0",
        "Tests cannot change the metrics sink host, since it is ignored"
    );
    let (metrics_watcher, metrics_client) = MetricsWatcher::new_with_client();

    // Run server in the background
    let listener = TcpListener::bind(settings.http.listen).expect("Failed to bind to a port");
    let address = listener.local_addr().unwrap().to_string();
    let server =
        hinter_web::run(listener, metrics_client, settings).expect("Failed to start server");
    let server_handle = tokio::spawn(server);
    let test_client = TestReqwestClient::new(address);

    // Assemble the tools
    let tools = TestingTools {
        test_client,
        log_watcher,
        metrics_watcher,
    };
    // Run the test
    let rv = test(tools).instrument(test_span).await;
    server_handle.abort();
    rv
}

/// A set of tools for tests, including an HTTP client and logging helpers.
///
/// The fields of this struct are marked as non-exhaustive, meaning that any
/// destructuring of this struct will require a `..` "and the rest" entry, even
/// if all present items are named. This makes adding tools in the future easier,
/// since old tests won't need to be rewritten to account for the added tools.
#[non_exhaustive]
pub struct TestingTools {
    /// A wrapper around a `reqwest::client` that automatically uses the Hinter
    /// server under test.
    pub test_client: TestReqwestClient,

    /// To make assertions about logs.
    pub log_watcher: LogWatcher,

    /// To make assertions about metrics.
    pub metrics_watcher: MetricsWatcher,
}

/// A wrapper around a `[reqwest::client]` that automatically sends requests to
/// the test server.
///
/// The client is configured to not follow any redirects.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,

    /// The server address to implicitly use for all requests.
    address: String,
}

impl TestReqwestClient {
    /// Construct a new test client that uses `address` for every request given.
    pub fn new(address: String) -> Self {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Could not build test client");
        Self { client, address }
    }

    /// Start building a GET request to the test server with the path specified.
    ///
    /// The path should start with `/`, such as `/health`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Start building a request with any method to the test server.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        assert!(path.starts_with('/'));
        let url = format!("http://{}{}", &self.address, path);
        self.client.request(method, url)
    }
}
