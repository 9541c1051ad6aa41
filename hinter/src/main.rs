// Only overview documentation that is not relevant to one of the more specific
// crates should go here.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! An autocomplete service that turns partial search terms into suggestions.
//!
//! Hinter is split into several subcrates that work in collaboration.
//!
//! - [hinter-integration-tests](../hinter_integration_tests/index.html)
//! - [hinter-settings](../hinter_settings/index.html)
//! - [hinter-suggest](../hinter_suggest/index.html)
//! - [hinter-web](../hinter_web/index.html)

mod docs;

use anyhow::{Context, Result};
use cadence::{BufferedUdpMetricSink, QueuingMetricSink, StatsdClient};
use hinter_settings::{LogFormat, Settings};
use std::net::{TcpListener, UdpSocket};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = hinter_settings::Settings::load().context("Loading settings")?;
    init_logging(&settings).context("Initializing logging")?;
    let metrics_client = init_metrics(&settings).context("Initializing metrics")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;

    tracing::info!(
        r#type = "app.start",
        env = %settings.env,
        listen = %settings.http.listen,
        "Starting hinter"
    );

    hinter_web::run(listener, metrics_client, settings)
        .context("Starting hinter-web server")?
        .await
        .context("Running hinter-web server")?;

    Ok(())
}

/// Set up logging for Hinter, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();
    let registry = tracing_subscriber::registry().with(env_filter);

    match settings.logging.format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().pretty()),
        )?,
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().json()),
        )?,
        LogFormat::Compact => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().compact()),
        )?,
    };

    Ok(())
}

/// Build the statsd client handlers report to.
///
/// Metrics are buffered up to `max_queue_size_kb` and sent from a background
/// thread, so recording a metric never blocks a request.
fn init_metrics(settings: &Settings) -> Result<StatsdClient> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Binding metrics socket")?;
    socket.set_nonblocking(true)?;

    let sink_address = (settings.metrics.sink_host.as_str(), settings.metrics.sink_port);
    let sink = BufferedUdpMetricSink::with_capacity(
        sink_address,
        socket,
        settings.metrics.max_queue_size_kb * 1024,
    )
    .context("Creating metrics sink")?;

    Ok(StatsdClient::builder("hinter", QueuingMetricSink::from(sink))
        .with_error_handler(|error| {
            tracing::warn!(r#type = "metrics.error", %error, "Could not send metric");
        })
        .build())
}
