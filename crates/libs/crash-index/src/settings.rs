use std::time::Duration;

use crash_config::CrashConfig;
use serde::{Deserialize, Serialize};

use serde_helpers::{
    default_health_check_timeout, default_timeout, default_timeout_extended,
    deserialize_duration, deserialize_string_list, serialize_duration,
};

/// Options missing from every source take the value of `Default`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    /// Urls of the Elasticsearch nodes.
    #[serde(deserialize_with = "deserialize_string_list")]
    pub urls: Vec<String>,
    /// Time in seconds before a query to Elasticsearch fails.
    #[serde(
        default = "default_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timeout: Duration,
    /// Time in seconds before a heavier query fails.
    #[serde(
        default = "default_timeout_extended",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timeout_extended: Duration,
    /// Time in seconds the health check waits for a yellow cluster.
    #[serde(
        default = "default_health_check_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub health_check_timeout: Duration,
    /// strftime template of index names, `%W` gives one index per week.
    pub index_template: String,
    /// Regex matching the names produced by `index_template`.
    pub index_regex: String,
    /// Number of weeks an index is kept.
    pub retention_weeks: u32,
    pub doctype: String,
    /// Number of shards of newly created indices.
    pub shards_per_index: u32,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        ElasticsearchConfig {
            urls: vec![String::from("http://localhost:9200")],
            timeout: default_timeout(),
            timeout_extended: default_timeout_extended(),
            health_check_timeout: default_health_check_timeout(),
            index_template: String::from("socorro%Y%W"),
            index_regex: String::from("^socorro[0-9]{6}$"),
            retention_weeks: 26,
            doctype: String::from("crash_reports"),
            shards_per_index: 10,
        }
    }
}

impl CrashConfig<'_> for ElasticsearchConfig {
    const ENV_PREFIX: &'static str = "CRASH_INDEX";

    fn file_sources() -> Vec<&'static str> {
        vec!["elasticsearch.toml"]
    }

    fn root_key() -> Option<&'static str> {
        Some("elasticsearch")
    }
}
