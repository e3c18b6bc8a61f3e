//! Helpers shared by the tests running the lifecycle manager against a mocked
//! Elasticsearch.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crash_index::configuration::IndexMappings;
use crash_index::{ElasticsearchConfig, FixedClock, IndexLifecycleManager, StaticMappingProvider};

/// Wednesday, week 25 of 2024.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 19, 12, 0, 0).unwrap()
}

pub fn mappings() -> IndexMappings {
    IndexMappings::new(json!({
        "properties": {
            "signature": { "type": "text" },
            "date_processed": { "type": "date" }
        }
    }))
}

pub fn config(server: &MockServer) -> ElasticsearchConfig {
    ElasticsearchConfig {
        urls: vec![server.uri()],
        health_check_timeout: Duration::from_secs(1),
        ..Default::default()
    }
}

pub fn manager_with(config: ElasticsearchConfig) -> IndexLifecycleManager {
    IndexLifecycleManager::new(
        config,
        Arc::new(StaticMappingProvider(mappings())),
        Arc::new(FixedClock(now())),
    )
    .expect("valid test configuration")
}

pub fn manager(server: &MockServer) -> IndexLifecycleManager {
    manager_with(config(server))
}

/// Response as Elasticsearch sends them.
pub fn es_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("x-elastic-product", "Elasticsearch")
        .set_body_json(body)
}

pub fn acknowledged() -> ResponseTemplate {
    es_response(200, json!({ "acknowledged": true }))
}

pub fn es_error(status: u16, ty: &str, reason: &str) -> ResponseTemplate {
    es_response(
        status,
        json!({
            "error": {
                "root_cause": [{ "type": ty, "reason": reason }],
                "type": ty,
                "reason": reason
            },
            "status": status
        }),
    )
}

pub fn already_exists(index: &str) -> ResponseTemplate {
    es_error(
        400,
        "resource_already_exists_exception",
        &format!("index [{index}/Bo0ZqmC6QbqhL7o_mWrVfw] already exists"),
    )
}

/// Mounts a CAT indices answer listing `names`.
pub async fn mount_indices(server: &MockServer, names: &[&str]) {
    let body: Vec<Value> = names.iter().map(|name| json!({ "index": name })).collect();
    Mock::given(method("GET"))
        .and(path("/_cat/indices"))
        .respond_with(es_response(200, Value::Array(body)))
        .mount(server)
        .await;
}
