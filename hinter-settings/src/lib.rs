#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Hinter Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `HINTER_ENV`. The
//!    settings for that environment are then loaded from `config/${env}.yaml`, if
//!    it exists. The default environment is "development". A "production"
//!    environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use for
//!    local configuration if desired.
//! 4. Environment variables that begin with `HINTER_` and use `__` to separate
//!    levels. For example, `Settings::http::workers` can be controlled from the
//!    environment variable `HINTER_HTTP__WORKERS`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, JSON and TOML are
//! also accepted. To choose another format, simply use a different extension
//! for your file, like `config/local.toml`.

mod logging;

pub use logging::{DirectiveWrapper, LogFormat, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};

/// Top level settings object for Hinter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment Hinter is running in. Should only be set with the
    /// `HINTER_ENV` environment variable.
    pub env: String,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Where the prebuilt suggestion index lives.
    pub index: IndexSettings,

    /// How search terms are normalized before lookup.
    pub normalization: NormalizationSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Metrics settings.
    pub metrics: MetricsSettings,

    /// If false, the search term of suggest requests is not written to logs.
    pub log_full_request: bool,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for the suggestion index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexSettings {
    /// The path, relative or absolute, to the JSON index snapshot to serve.
    pub path: PathBuf,
}

/// Settings for search term normalization.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NormalizationSettings {
    /// Fold visually identical letters from other scripts onto Latin before
    /// normalizing. The index must have been loaded with the same mode.
    pub equal_shaped: bool,
}

/// Settings for the statsd metrics sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// The host to send metrics to, such as "127.0.0.1".
    pub sink_host: String,

    /// The UDP port to send metrics to.
    pub sink_port: u16,

    /// The size of the in-memory metrics queue, in kilobytes.
    pub max_queue_size_kb: usize,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let hinter_env = std::env::var("HINTER_ENV").unwrap_or_else(|_| "development".to_string());

        let s = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            .set_override("env", hinter_env.as_str())?
            // Merge in an environment specific config.
            .add_source(File::with_name(&format!("config/{}", hinter_env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables that start with "HINTER_" and have "__" to
            // separate levels. For example, `HINTER_HTTP__LISTEN` maps to
            // `Settings::http::listen`.
            .add_source(
                Environment::with_prefix("HINTER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` is applied to the loaded settings before they are returned.
    ///
    /// # Panics
    /// If the checked in test configuration cannot be loaded.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let config_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../config");

        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/base", config_dir)))
            .set_override("env", "test")
            .expect("Could not set env for tests")
            .add_source(File::with_name(&format!("{}/test", config_dir)))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name(&format!("{}/local_test", config_dir)).required(false))
            .build()
            .expect("Could not load settings for tests");

        let mut settings: Self = s.try_deserialize().expect("Could not convert settings");
        changer(&mut settings);
        settings
    }
}
