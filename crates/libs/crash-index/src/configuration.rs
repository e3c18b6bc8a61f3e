use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::Result;

/// Field on which query strings without an explicit field are run.
const DEFAULT_QUERY_FIELD: &str = "signature";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings(serde_json::Value);

impl std::fmt::Display for IndexSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

impl IndexSettings {
    pub fn new(value: serde_json::Value) -> IndexSettings {
        IndexSettings(value)
    }

    /// Settings shared by every crash report index: the shard count, the default
    /// query field and the `semicolon_keywords` analyzer used on fields holding
    /// `;` separated lists.
    pub fn crash_reports(number_of_shards: u32) -> IndexSettings {
        IndexSettings(json!({
            "index": {
                "number_of_shards": number_of_shards,
                "query": { "default_field": DEFAULT_QUERY_FIELD },
                "analysis": {
                    "analyzer": {
                        "semicolon_keywords": { "type": "pattern", "pattern": ";" }
                    }
                }
            }
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexMappings(serde_json::Value);

impl std::fmt::Display for IndexMappings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

impl IndexMappings {
    pub fn new(value: serde_json::Value) -> IndexMappings {
        IndexMappings(value)
    }
}

/// Body of an index creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexBody {
    pub settings: IndexSettings,
    pub mappings: IndexMappings,
}

impl IndexBody {
    pub fn new(number_of_shards: u32, mappings: IndexMappings) -> Self {
        IndexBody {
            settings: IndexSettings::crash_reports(number_of_shards),
            mappings,
        }
    }

    pub fn into_json_body(self) -> Result<serde_json::Value> {
        let value = serde_json::to_value(self)?;
        Ok(value)
    }
}
