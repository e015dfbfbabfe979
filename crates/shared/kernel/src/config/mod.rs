use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Prefix of environment overrides: `BRITE__RELAY__WEBHOOK_URL` sets `relay.webhook_url`.
pub const ENV_PREFIX: &str = "BRITE";

/// File read when no explicit path is given; it may be absent.
pub const DEFAULT_CONFIG_FILE: &str = "server.toml";

#[brite_derive::brite_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a TOML file layered under `BRITE__*` environment variables.
///
/// An explicit `path` must exist. Without one, `server.toml` in the working directory is
/// read when present, so an environment-only deployment works too. Nested keys use a
/// double underscore (`BRITE__SERVER__PORT=8080`).
///
/// # Errors
/// Fails when the explicit file is missing, a source cannot be parsed, or the merged
/// values do not fit `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, None)
}

/// `env` replaces the process environment when given.
fn load_layered<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<HashMap<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (file, required) = match &path {
        Some(path) => (path.as_ref().to_path_buf(), true),
        None => (Path::new(DEFAULT_CONFIG_FILE).to_path_buf(), false),
    };

    info!(path = %file.display(), required, "Loading configuration");

    Config::builder()
        .add_source(File::from(file.as_path()).format(FileFormat::Toml).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake)
                .source(env),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
