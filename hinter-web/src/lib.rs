#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for [Hinter](../hinter/index.html)'s public API.

mod cors;
mod envelope;
mod errors;
mod extractors;
mod health;
mod logging;
mod suggest;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    web::{self, Data, ServiceConfig},
    App, HttpServer,
};
use anyhow::Context;
use cadence::StatsdClient;
use hinter_settings::Settings;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::logging::HinterRootSpanBuilder;
pub use crate::suggest::SuggestHandler;

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run it
/// as a background task using `tokio::spawn`.
///
/// The suggestion index named by `settings.index.path` is loaded before the
/// server starts, and shared by every worker. Most of the details from
/// `settings` will be respected, except for those that go into building the
/// listener (the host and port). If you want to respect the settings specified
/// in that object, you must include them in the construction of `listener`.
///
/// # Errors
///
/// Returns an error if the index cannot be loaded, or if the server cannot be
/// started on the provided listener.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an error
/// that causes the server to shut down.
///
/// ```no_run
/// # actix_rt::System::new().block_on(async {
/// use cadence::{NopMetricSink, StatsdClient};
///
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = hinter_settings::Settings::load()
///     .expect("Failed to load settings");
/// let metrics_client = StatsdClient::from_sink("hinter", NopMetricSink);
/// hinter_web::run(listener, metrics_client, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
pub fn run(
    listener: TcpListener,
    metrics_client: StatsdClient,
    settings: Settings,
) -> anyhow::Result<Server> {
    let num_workers = settings.http.workers;

    let suggest_handler = Data::new(
        SuggestHandler::from_settings(&settings).context("loading suggestion index")?,
    );
    let metrics_client = Data::new(metrics_client);
    let settings = Data::new(settings);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(settings.clone())
            .app_data(suggest_handler.clone())
            .app_data(metrics_client.clone())
            .wrap(TracingLogger::<HinterRootSpanBuilder>::new())
            .wrap(Cors::permissive())
            .configure(configure_app)
            .default_service(web::to(errors::not_found))
    })
    .listen(listener)
    .context("listening on the given socket")?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    Ok(server.run())
}

/// Register every route of the public API.
///
/// The app must also hold [`Data`] for a [`SuggestHandler`], a
/// [`StatsdClient`] and the [`Settings`].
pub fn configure_app(config: &mut ServiceConfig) {
    config
        .service(
            web::scope("/suggest")
                .wrap(cors::headers())
                .configure(suggest::configure),
        )
        .configure(health::configure);
}
