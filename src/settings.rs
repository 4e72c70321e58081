use std::env::{current_dir, var};

use config::{Config, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgSslMode::{Prefer, Require};
use sqlx::ConnectOptions;

use crate::utils::{KdfAlgorithm, DEFAULT_ITERATIONS};

/// Global settings exposing every preconfigured variable.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub debug: bool,
    pub database: DatabaseSettings,
    pub secret: Secret,
    pub hasher: HasherSettings,
    pub email: EmailSettings,
    pub frontend_url: String,
}

/// Where the application listens.
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

/// Session token material. `secret_key` must be exactly 32 bytes;
/// `token_expiration` is in minutes.
#[derive(Deserialize, Clone)]
pub struct Secret {
    pub secret_key: String,
    pub token_expiration: i64,
    pub hmac_secret: String,
}

/// Key-derivation parameters for stored passwords.
///
/// Changing `algorithm` or its cost after accounts exist makes their stored
/// credentials unverifiable.
#[derive(Deserialize, Clone, Debug)]
pub struct HasherSettings {
    pub algorithm: KdfAlgorithm,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

#[derive(Deserialize, Clone)]
pub struct EmailSettings {
    pub host: String,
    pub host_user: String,
    pub host_user_password: String,
    pub sender_name: String,
    pub sender_address: String,
}

impl DatabaseSettings {
    pub fn connect_to_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl { Require } else { Prefer };
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(&self.password)
            .port(self.port)
            .ssl_mode(ssl_mode)
            .database(&self.database_name);
        options.log_statements(tracing::log::LevelFilter::Trace);
        options
    }
}

/// The runtime environment of the application.
#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `development` or `production`.",
                other
            )),
        }
    }
}

/// Loads settings for the environment named by `APP_ENVIRONMENT`.
///
/// ```text
/// APP_ENVIRONMENT = development | production
/// ```
///
/// `settings/base.yaml` is read first, then `settings/<environment>.yaml`,
/// then environment variables. Variables must be upper case, start with
/// `APP`, use `_` after the prefix and `__` between section and key, e.g.
/// `APP_APPLICATION__PORT=5001` sets `application.port`.
pub fn get_settings() -> Result<Settings, config::ConfigError> {
    let base_path = current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Cannot determine current directory: {e}")))?;
    let setting_directory = base_path.join("settings");

    let environment =
        Environment::try_from(var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into()))
            .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = Config::builder()
        .add_source(File::from(setting_directory.join("base.yaml")))
        .add_source(File::from(setting_directory.join(environment_filename)))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
