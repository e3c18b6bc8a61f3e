/// This module contains the definition for index-janitor configuration and command line arguments.
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crash_config::{ConfigError, CrashConfig};
use crash_index::ElasticsearchConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
    /// Directory holding one `<doctype>.json` mapping per document type.
    pub mappings_dir: Option<PathBuf>,
}

impl CrashConfig<'_> for Settings {
    const ENV_PREFIX: &'static str = "CRASH_INDEX";

    fn file_sources() -> Vec<&'static str> {
        vec!["elasticsearch.toml", "index-janitor.toml"]
    }
}

#[derive(Debug, clap::Parser)]
#[command(
    name = "index-janitor",
    about = "Manage the weekly crash report indices",
    version = VERSION,
    author = AUTHORS
)]
pub struct Opts {
    /// Defines the config directory
    ///
    /// This directory must contain 'elasticsearch.toml' and may contain a
    /// 'mappings' subdirectory.
    #[arg(short = 'c', long = "config-dir")]
    pub config_dir: Option<PathBuf>,

    /// Override settings values using key=value
    #[arg(short = 's', long = "setting")]
    pub settings: Vec<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Create the index of the current week, or of the week of DATE
    Create {
        #[arg(long = "date")]
        date: Option<NaiveDate>,
    },
    /// List the managed indices, oldest first
    List,
    /// Delete one index
    Delete { name: String },
    /// Delete the indices older than the retention policy
    Expire,
    /// Make recently indexed documents searchable
    Refresh { index: Option<String> },
    /// Wait for the cluster to be at least yellow
    Health,
    /// Prints the configuration
    Config,
}

impl Settings {
    // Read the configuration from <config-dir>/elasticsearch.toml and <config-dir>/index-janitor.toml
    pub fn new(opts: &Opts) -> Result<Self, ConfigError> {
        match &opts.config_dir {
            Some(dir) => Settings::get_from(dir, &opts.settings),
            None => Settings::get(&opts.settings),
        }
    }

    pub fn mappings_dir(&self, opts: &Opts) -> PathBuf {
        self.mappings_dir.clone().unwrap_or_else(|| {
            opts.config_dir
                .clone()
                .unwrap_or_else(crash_config::config_dir)
                .join("mappings")
        })
    }
}
