use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::configuration::{IndexBody, IndexMappings};
use crate::connection::ConnectionFactory;
use crate::errors::{IndexError, Result};
use crate::internal::HEALTH_RESPONSE_MARGIN;
use crate::mapping::{MappingContext, MappingProvider};
use crate::model::health::ClusterHealth;
use crate::model::sweep::{RetentionSweep, SkippedIndex};
use crate::naming::IndexNaming;
use crate::settings::ElasticsearchConfig;

/// Creates, lists and expires the dated crash report indices.
///
/// The cluster is the only source of truth: nothing about existing indices is
/// cached, so a manager can be shared between tasks freely.
#[derive(Clone)]
pub struct IndexLifecycleManager {
    config: ElasticsearchConfig,
    factory: ConnectionFactory,
    naming: IndexNaming,
    mappings: Arc<dyn MappingProvider>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for IndexLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexLifecycleManager")
            .field("config", &self.config)
            .field("factory", &self.factory)
            .field("naming", &self.naming)
            .finish()
    }
}

impl IndexLifecycleManager {
    /// Validates the whole configuration, including that the index named after
    /// the current date is recognized by the index pattern.
    pub fn new(
        config: ElasticsearchConfig,
        mappings: Arc<dyn MappingProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let factory = ConnectionFactory::new(&config)?;
        let naming = IndexNaming::new(&config.index_template, &config.index_regex)?;

        if config.retention_weeks == 0 {
            return Err(IndexError::InvalidConfiguration {
                details: String::from("retention_weeks must be at least 1"),
            });
        }
        if config.shards_per_index == 0 {
            return Err(IndexError::InvalidConfiguration {
                details: String::from("shards_per_index must be at least 1"),
            });
        }
        if config.health_check_timeout.is_zero() {
            return Err(IndexError::InvalidConfiguration {
                details: String::from("health_check_timeout must be positive"),
            });
        }
        if config.doctype.is_empty() {
            return Err(IndexError::InvalidConfiguration {
                details: String::from("doctype must not be empty"),
            });
        }

        let current = naming.name_for_date(clock.now());
        if !naming.is_managed_name(&current) {
            return Err(IndexError::TemplatePatternMismatch {
                name: current,
                pattern: config.index_regex.clone(),
            });
        }

        Ok(IndexLifecycleManager {
            config,
            factory,
            naming,
            mappings,
            clock,
        })
    }

    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    pub fn connection_factory(&self) -> &ConnectionFactory {
        &self.factory
    }

    pub fn naming(&self) -> &IndexNaming {
        &self.naming
    }

    pub fn index_template(&self) -> &str {
        &self.config.index_template
    }

    pub fn doctype(&self) -> &str {
        &self.config.doctype
    }

    pub fn timeout_extended(&self) -> Duration {
        self.config.timeout_extended
    }

    /// Creates `index_name`, with the mapping of the configured doctype unless
    /// one is given.
    ///
    /// Returns `false` when the index already exists. Concurrent callers need no
    /// prior existence check: Elasticsearch lets exactly one creation through.
    #[tracing::instrument(skip(self, mappings))]
    pub async fn create_index(
        &self,
        index_name: &str,
        mappings: Option<IndexMappings>,
    ) -> Result<bool> {
        let mappings = match mappings {
            Some(mappings) => mappings,
            None => self.mappings.mapping(&MappingContext {
                doctype: self.config.doctype.clone(),
            })?,
        };

        let body = IndexBody::new(self.config.shards_per_index, mappings).into_json_body()?;

        match self.factory.indices_client()?.create_index(index_name, body).await {
            Ok(()) => {
                info!("created index '{}'", index_name);
                Ok(true)
            }
            Err(err) if err.is_index_already_exists() => {
                debug!("index '{}' already exists", index_name);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Creates the index holding the reports of `date`.
    pub async fn create_index_for_date(&self, date: DateTime<Utc>) -> Result<(String, bool)> {
        let index_name = self.naming.name_for_date(date);
        let created = self.create_index(&index_name, None).await?;
        Ok((index_name, created))
    }

    /// Creates the index receiving the reports of today.
    pub async fn create_current_index(&self) -> Result<(String, bool)> {
        self.create_index_for_date(self.clock.now()).await
    }

    /// Managed indices currently in the cluster, oldest first.
    ///
    /// Names are zero padded and ordered from the year down, the lexicographic
    /// order is the chronological one.
    #[tracing::instrument(skip(self))]
    pub async fn list_managed_indices(&self) -> Result<Vec<String>> {
        let mut indices: Vec<String> = self
            .factory
            .indices_client()?
            .index_names()
            .await?
            .into_iter()
            .filter(|name| self.naming.is_managed_name(name))
            .collect();

        indices.sort();
        debug!("{} managed indices", indices.len());
        Ok(indices)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_index(&self, index_name: &str) -> Result<()> {
        self.factory.indices_client()?.delete_index(index_name).await?;
        info!("deleted index '{}'", index_name);
        Ok(())
    }

    /// Deletes the managed indices older than the retention policy and returns
    /// their names, oldest first.
    pub async fn delete_expired_indices(&self) -> Result<Vec<String>> {
        self.sweep_expired_indices().await.map(|sweep| sweep.deleted)
    }

    /// Same as `delete_expired_indices`, reporting the kept and skipped indices
    /// as well.
    ///
    /// An index is dated by the first day its name covers. A name which cannot be
    /// read back into a date is reported and left alone, it does not stop the
    /// sweep. A failed deletion does.
    #[tracing::instrument(skip(self))]
    pub async fn sweep_expired_indices(&self) -> Result<RetentionSweep> {
        let policy = chrono::Duration::weeks(i64::from(self.config.retention_weeks));
        let cutoff = (self.clock.now() - policy).naive_utc();

        let mut sweep = RetentionSweep::new(cutoff);
        for index_name in self.list_managed_indices().await? {
            let index_date = match self.naming.date_for_name(&index_name) {
                Ok(date) => date,
                Err(err) => {
                    warn!("skipping index '{}': {}", index_name, err);
                    sweep.skipped.push(SkippedIndex {
                        name: index_name,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if index_date >= cutoff {
                sweep.kept.push(index_name);
                continue;
            }

            self.delete_index(&index_name).await?;
            sweep.deleted.push(index_name);
        }

        info!(
            "retention sweep before {}: {} deleted, {} kept, {} skipped",
            cutoff,
            sweep.deleted.len(),
            sweep.kept.len(),
            sweep.skipped.len()
        );
        Ok(sweep)
    }

    /// Makes recently indexed documents searchable, in `index_name` or in every
    /// index.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self, index_name: Option<&str>) -> Result<()> {
        self.factory.indices_client()?.refresh(index_name).await
    }

    /// Fails unless the cluster reaches at least a yellow status within the
    /// health check timeout.
    #[tracing::instrument(skip(self))]
    pub async fn health_check(&self) -> Result<ClusterHealth> {
        let timeout = self.config.health_check_timeout;

        self.factory
            .with_connection(Some(timeout + HEALTH_RESPONSE_MARGIN), |conn| async move {
                let response = conn.into_indices_client().cluster_health(timeout).await?;
                let health = ClusterHealth::try_from(response.status.as_str())?;

                if response.timed_out || !health.is_operational() {
                    return Err(IndexError::ClusterUnhealthy {
                        status: response.status,
                        timed_out: response.timed_out,
                    });
                }

                Ok(health)
            })
            .await
    }
}
