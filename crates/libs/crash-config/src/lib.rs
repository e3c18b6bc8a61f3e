use std::io;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat, FileSourceFile, FileSourceString};
use serde::Deserialize;
use thiserror::Error;

const DEV_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../config");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    ConfigCompilation(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    IOError(#[from] io::Error),

    #[error("Expected '=' separator in config override '{0}'")]
    MalformedConfigOverride(String),
}

/// Directory holding the default configuration files, `/etc/crash-index` when it
/// exists, the repository `config` directory otherwise.
pub fn config_dir() -> PathBuf {
    let config_dir = PathBuf::from("/etc/crash-index/");
    if config_dir.exists() {
        config_dir
    } else {
        PathBuf::from(DEV_CONFIG_PATH)
    }
}

pub trait CrashConfig<'a>: Deserialize<'a> {
    const ENV_PREFIX: &'static str;

    fn file_sources() -> Vec<&'static str> {
        vec![]
    }

    fn root_key() -> Option<&'static str> {
        None
    }

    /// Loads the configuration from the default config directory.
    fn get(overrides: &[String]) -> Result<Self, ConfigError>
    where
        Self: Sized,
    {
        Self::get_from(&config_dir(), overrides)
    }

    /// Merges, from lowest to highest precedence, the files listed by
    /// `file_sources` in `dir`, the `<ENV_PREFIX>__` environment variables and
    /// the `key=value` overrides.
    fn get_from(dir: &Path, overrides: &[String]) -> Result<Self, ConfigError>
    where
        Self: Sized,
    {
        let config = Config::builder()
            .add_source(optional_files(dir, &Self::file_sources()))
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .separator("__")
                    .prefix_separator("__"),
            )
            .add_source(override_sources(Self::root_key(), overrides)?)
            .build()?;

        match Self::root_key() {
            None => Ok(config.try_deserialize()?),
            Some(key) => Ok(config.get::<Self>(key)?),
        }
    }
}

/// Files of `dir` which are merged when present.
fn optional_files(dir: &Path, names: &[&str]) -> Vec<File<FileSourceFile, FileFormat>> {
    names
        .iter()
        .map(|name| File::from(dir.join(name)).required(false))
        .collect()
}

/// One TOML source per override, nested under `root_key`:
/// "retention_weeks=4" becomes "elasticsearch.retention_weeks=4".
fn override_sources(
    root_key: Option<&str>,
    overrides: &[String],
) -> Result<Vec<File<FileSourceString, FileFormat>>, ConfigError> {
    overrides
        .iter()
        .map(|value| {
            if !value.contains('=') {
                return Err(ConfigError::MalformedConfigOverride(value.clone()));
            }
            let value = match root_key {
                None => value.clone(),
                Some(key) => format!("{key}.{value}"),
            };
            Ok(File::from_str(&value, FileFormat::Toml))
        })
        .collect()
}
