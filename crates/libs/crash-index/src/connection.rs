use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::Elasticsearch;
use url::Url;

use crate::errors::{IndexError, Result};
use crate::internal::IndexAdmin;
use crate::settings::ElasticsearchConfig;

/// Builds Elasticsearch clients over the configured nodes.
///
/// Building a handle performs no I/O. Successive handles are spread over the
/// nodes in turn, clones of a factory share the same cursor.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    urls: Vec<Url>,
    timeout: Duration,
    timeout_extended: Duration,
    next: Arc<AtomicUsize>,
}

impl ConnectionFactory {
    pub fn new(config: &ElasticsearchConfig) -> Result<Self> {
        if config.urls.is_empty() {
            return Err(IndexError::InvalidConfiguration {
                details: String::from("no Elasticsearch url configured"),
            });
        }

        let urls = config
            .urls
            .iter()
            .map(|url| {
                Url::parse(url).map_err(|source| IndexError::InvalidUrl {
                    url: url.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if config.timeout.is_zero() || config.timeout_extended.is_zero() {
            return Err(IndexError::InvalidConfiguration {
                details: String::from("Elasticsearch timeouts must be positive"),
            });
        }

        Ok(ConnectionFactory {
            urls,
            timeout: config.timeout,
            timeout_extended: config.timeout_extended,
            next: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn timeout_extended(&self) -> Duration {
        self.timeout_extended
    }

    /// Returns a client using `timeout`, or the default timeout when `None`.
    pub fn connection(&self, timeout: Option<Duration>) -> Result<ConnectionHandle> {
        let timeout = timeout.unwrap_or(self.timeout);
        let url = self.urls[self.next.fetch_add(1, Ordering::Relaxed) % self.urls.len()].clone();

        let transport = TransportBuilder::new(SingleNodeConnectionPool::new(url.clone()))
            .cert_validation(CertificateValidation::Default)
            .timeout(timeout)
            .build()?;

        Ok(ConnectionHandle {
            client: Elasticsearch::new(transport),
            url,
            timeout,
        })
    }

    /// Returns a client for heavier requests, using the extended timeout.
    pub fn extended_connection(&self) -> Result<ConnectionHandle> {
        self.connection(Some(self.timeout_extended))
    }

    /// Returns a client restricted to index management.
    pub fn indices_client(&self) -> Result<IndexAdmin> {
        self.connection(None).map(ConnectionHandle::into_indices_client)
    }

    /// Runs `f` with a fresh handle. The handle is moved into `f` and released
    /// when the returned future completes, whatever its outcome.
    pub async fn with_connection<F, Fut, T>(&self, timeout: Option<Duration>, f: F) -> Result<T>
    where
        F: FnOnce(ConnectionHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let conn = self.connection(timeout)?;
        f(conn).await
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    client: Elasticsearch,
    url: Url,
    timeout: Duration,
}

impl ConnectionHandle {
    pub fn client(&self) -> &Elasticsearch {
        &self.client
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn into_indices_client(self) -> IndexAdmin {
        IndexAdmin::new(self)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use speculoos::prelude::*;

    use super::*;

    fn config(urls: &[&str]) -> ElasticsearchConfig {
        ElasticsearchConfig {
            urls: urls.iter().map(|url| url.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn should_reject_empty_url_list() {
        assert_that!(ConnectionFactory::new(&config(&[])))
            .is_err()
            .matches(|err| matches!(err, IndexError::InvalidConfiguration { .. }));
    }

    #[test]
    fn should_reject_malformed_url() {
        assert_that!(ConnectionFactory::new(&config(&["http://es:9200", "not a url"])))
            .is_err()
            .matches(|err| matches!(err, IndexError::InvalidUrl { url, .. } if url == "not a url"));
    }

    #[test]
    fn should_reject_zero_timeout() {
        let config = ElasticsearchConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_that!(ConnectionFactory::new(&config)).is_err();
    }

    #[test]
    fn should_use_default_or_overridden_timeout() -> anyhow::Result<()> {
        let factory = ConnectionFactory::new(&config(&["http://es:9200"]))?;

        assert_that!(factory.connection(None)?.timeout()).is_equal_to(Duration::from_secs(30));
        assert_that!(factory.connection(Some(Duration::from_secs(3)))?.timeout())
            .is_equal_to(Duration::from_secs(3));
        assert_that!(factory.extended_connection()?.timeout())
            .is_equal_to(Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn should_spread_connections_over_nodes() -> anyhow::Result<()> {
        let factory = ConnectionFactory::new(&config(&["http://es1:9200", "http://es2:9200"]))?;
        let clone = factory.clone();

        let hosts = vec![
            factory.connection(None)?.url().host_str().map(String::from),
            clone.connection(None)?.url().host_str().map(String::from),
            factory.connection(None)?.url().host_str().map(String::from),
        ];

        assert_that!(hosts).is_equal_to(vec![
            Some("es1".to_string()),
            Some("es2".to_string()),
            Some("es1".to_string()),
        ]);
        Ok(())
    }
}
