#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Casita Settings
//!
//! Configuration is specified in several ways, with later methods overriding
//! earlier ones.
//!
//! 1. A base configuration checked into the repository, in
//!    `config/base.yaml`. This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `CASITA_ENV`.
//!    The settings for that environment are then loaded from
//!    `config/${env}.yaml`, if it exists. The default environment is
//!    "development". A "production" environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use
//!    for local configuration and secrets if desired.
//! 4. Environment variables that begin with `CASITA_` and use `__` as a
//!    level separator. For example, `Settings::http::workers` can be
//!    controlled from the environment variable `CASITA_HTTP__WORKERS`.
//!
//! Tests should use [`Settings::load_for_tests`], which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if
//! it exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, any format
//! supported by the [config] crate can be used, including JSON and TOML. To
//! choose another format, simply use a different extension for your file,
//! like `config/local.toml`.

mod logging;

pub use logging::{LogFormat, LogLevels, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};

/// Top level settings object for Casita.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[doc(inline)]
pub struct Settings {
    /// The environment Casita is running in. Should only be set with the
    /// `CASITA_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not
    /// be set to true in production environments.
    pub debug: bool,

    /// A URL that the root view should redirect to, pointing at human
    /// readable documentation for the service. If unset, a short plain text
    /// description is served instead.
    pub public_documentation: Option<String>,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Settings for the storage backend.
    pub storage: StorageSettings,

    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or
    /// "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for the storage backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Which backend to use.
    pub backend: StorageBackend,

    /// The path of the snapshot file, used by the `file` backend. Ignored by
    /// the `memory` backend.
    pub path: PathBuf,
}

/// The available storage backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Keep records in process memory only. Nothing survives a restart.
    Memory,

    /// Persist records to a JSON snapshot file.
    File,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the
    /// required configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let mut s = Config::new();

        // Start off with the base config.
        s.merge(File::with_name("./config/base"))?;

        // Merge in an environment specific config.
        let casita_env = std::env::var("CASITA_ENV").unwrap_or_else(|_| "development".to_string());
        s.set("env", casita_env.as_str())?;
        s.merge(File::with_name(&format!("config/{}", s.get::<String>("env")?)).required(false))?;

        // Add a local configuration file that is `.gitignore`ed.
        s.merge(File::with_name("config/local").required(false))?;

        // Add environment variables that start with "CASITA_" and have "__"
        // to separate levels. For example, `CASITA_HTTP__LISTEN` maps to
        // `Settings::http::listen`.
        s.merge(Environment::default().prefix("CASITA").separator("__"))?;

        s.try_into()
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` can mutate the loaded settings before they are returned,
    /// which lets a test tweak one value without a dedicated config file.
    ///
    /// # Panics
    /// Panics instead of returning errors, since this only runs in tests.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let mut s = Config::new();

        // Start off with the base config.
        s.merge(File::with_name("../config/base"))
            .expect("Could not load base settings");

        // Merge in test specific config.
        s.set("env", "test").expect("Could not set env for tests");
        s.merge(File::with_name("../config/test"))
            .expect("Could not load test settings");

        // Add a local configuration file that is `.gitignore`ed.
        s.merge(File::with_name("../config/local_test").required(false))
            .expect("Could not load local settings for tests");

        let mut settings = s.try_into().expect("Could not convert settings");
        changer(&mut settings);
        settings
    }
}
