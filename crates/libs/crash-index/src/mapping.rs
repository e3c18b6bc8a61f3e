use std::path::{Path, PathBuf};

use tracing::debug;

use crate::configuration::IndexMappings;
use crate::errors::{IndexError, Result};

/// What a mapping provider gets to know about the index being created.
#[derive(Debug, Clone)]
pub struct MappingContext {
    pub doctype: String,
}

/// Produces the document mapping of newly created indices.
pub trait MappingProvider: Send + Sync {
    fn mapping(&self, context: &MappingContext) -> Result<IndexMappings>;
}

/// Reads `<dir>/<doctype>.json` on each call.
#[derive(Debug, Clone)]
pub struct FileMappingProvider {
    dir: PathBuf,
}

impl FileMappingProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileMappingProvider { dir: dir.into() }
    }

    /// The `mappings` directory next to the default configuration files.
    pub fn from_config_dir() -> Self {
        FileMappingProvider::new(crash_config::config_dir().join("mappings"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MappingProvider for FileMappingProvider {
    fn mapping(&self, context: &MappingContext) -> Result<IndexMappings> {
        let path = self.dir.join(format!("{}.json", context.doctype));
        debug!("reading mapping of '{}' from {:?}", context.doctype, path);

        let content = std::fs::read_to_string(&path).map_err(|err| {
            IndexError::MappingUnavailable {
                doctype: context.doctype.clone(),
                source: Box::new(err),
            }
        })?;

        let value = serde_json::from_str(&content).map_err(|err| {
            IndexError::MappingUnavailable {
                doctype: context.doctype.clone(),
                source: Box::new(err),
            }
        })?;

        Ok(IndexMappings::new(value))
    }
}

/// Hands out the same mapping whatever the doctype.
#[derive(Debug, Clone, Default)]
pub struct StaticMappingProvider(pub IndexMappings);

impl MappingProvider for StaticMappingProvider {
    fn mapping(&self, _context: &MappingContext) -> Result<IndexMappings> {
        Ok(self.0.clone())
    }
}
