use std::time::Duration;

use elasticsearch::cat::CatIndicesParts;
use elasticsearch::cluster::ClusterHealthParts;
use elasticsearch::http::response::Response;
use elasticsearch::indices::{IndicesCreateParts, IndicesDeleteParts, IndicesRefreshParts};
use elasticsearch::params::WaitForStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::connection::ConnectionHandle;
use crate::errors::{IndexError, Result};

/// Extra time granted to the health request over the server side wait, so the
/// `408` answer of a cluster stuck below yellow arrives before the client
/// gives up.
pub const HEALTH_RESPONSE_MARGIN: Duration = Duration::from_secs(1);

/// Client restricted to the index management API of Elasticsearch.
#[derive(Debug, Clone)]
pub struct IndexAdmin {
    conn: ConnectionHandle,
}

impl IndexAdmin {
    pub fn new(conn: ConnectionHandle) -> Self {
        IndexAdmin { conn }
    }

    pub async fn create_index(&self, index_name: &str, body: Value) -> Result<()> {
        let response = self
            .conn
            .client()
            .indices()
            .create(IndicesCreateParts::Index(index_name))
            .body(body)
            .request_timeout(self.conn.timeout())
            .send()
            .await?;

        if response.status_code().is_success() {
            // Response similar to:
            // {"acknowledged": true, "index": "name", "shards_acknowledged": true}
            let json = response.json::<Value>().await?;

            if acknowledged(json)? {
                Ok(())
            } else {
                Err(IndexError::IndexCreationFailed(index_name.to_string()))
            }
        } else {
            Err(into_error(response).await)
        }
    }

    /// Names of all the indices of the cluster, in the order Elasticsearch
    /// lists them.
    pub async fn index_names(&self) -> Result<Vec<String>> {
        let response = self
            .conn
            .client()
            .cat()
            .indices(CatIndicesParts::None)
            .h(&["index"])
            .format("json")
            .request_timeout(self.conn.timeout())
            .send()
            .await?;

        if response.status_code().is_success() {
            // Response similar to:
            // [{"index": "socorro202423"}, {"index": ".kibana_1"}]
            let indices = response.json::<Vec<CatIndex>>().await?;
            debug!("cluster reports {} indices", indices.len());
            Ok(indices.into_iter().map(|index| index.index).collect())
        } else {
            Err(into_error(response).await)
        }
    }

    pub async fn delete_index(&self, index_name: &str) -> Result<()> {
        let response = self
            .conn
            .client()
            .indices()
            .delete(IndicesDeleteParts::Index(&[index_name]))
            .request_timeout(self.conn.timeout())
            .send()
            .await?;

        if response.status_code().is_success() {
            let json = response.json::<Value>().await?;

            if acknowledged(json)? {
                Ok(())
            } else {
                Err(IndexError::IndexDeletionFailed(index_name.to_string()))
            }
        } else {
            Err(into_error(response).await)
        }
    }

    /// Refreshes `index_name`, or every index when `None`.
    pub async fn refresh(&self, index_name: Option<&str>) -> Result<()> {
        let indices = self.conn.client().indices();
        let names: Vec<&str> = index_name.into_iter().collect();
        let parts = if names.is_empty() {
            IndicesRefreshParts::None
        } else {
            IndicesRefreshParts::Index(&names)
        };

        let response = indices
            .refresh(parts)
            .request_timeout(self.conn.timeout())
            .send()
            .await?;

        // The shard counts of the response are not analyzed.
        if response.status_code().is_success() {
            Ok(())
        } else {
            Err(into_error(response).await)
        }
    }

    /// Waits up to `timeout` for the cluster to be at least yellow.
    ///
    /// Elasticsearch answers `408` with the current health when the status was
    /// not reached in time, that answer is returned like a successful one.
    pub async fn cluster_health(&self, timeout: Duration) -> Result<ClusterHealthResponse> {
        let wait = format!("{}ms", timeout.as_millis());
        let response = self
            .conn
            .client()
            .cluster()
            .health(ClusterHealthParts::None)
            .wait_for_status(WaitForStatus::Yellow)
            .timeout(&wait)
            .request_timeout(timeout + HEALTH_RESPONSE_MARGIN)
            .send()
            .await?;

        let status = response.status_code();
        if status.is_success() || status.as_u16() == 408 {
            // Response similar to:
            // {"cluster_name": "crashes", "status": "yellow", "timed_out": false, ...}
            let health = response.json::<ClusterHealthResponse>().await?;
            Ok(health)
        } else {
            Err(into_error(response).await)
        }
    }
}

/// Extracts the `acknowledged` flag of an index API response.
fn acknowledged(json: Value) -> Result<bool> {
    json.as_object()
        .ok_or_else(|| IndexError::InvalidJson {
            msg: String::from("expected JSON object"),
            json: json.clone(),
        })?
        .get("acknowledged")
        .ok_or_else(|| IndexError::InvalidJson {
            msg: String::from("expected 'acknowledged'"),
            json: json.clone(),
        })?
        .as_bool()
        .ok_or_else(|| IndexError::InvalidJson {
            msg: String::from("expected JSON bool"),
            json: json.clone(),
        })
}

async fn into_error(response: Response) -> IndexError {
    match response.exception().await {
        Ok(Some(exception)) => IndexError::from(exception),
        Ok(None) => IndexError::ElasticsearchFailureWithoutException,
        Err(err) => IndexError::from(err),
    }
}

/// One line of the CAT indices API restricted to the `index` column.
#[derive(Debug, Deserialize)]
struct CatIndex {
    index: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealthResponse {
    #[serde(default)]
    pub cluster_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub number_of_nodes: Option<u32>,
}
