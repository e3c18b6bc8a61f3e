mod common;

use chrono::Duration;
use serde_json::{json, Value};
use speculoos::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

use common::*;
use crash_index::IndexError;

fn weeks_ago(weeks: i64) -> chrono::DateTime<chrono::Utc> {
    now() - Duration::weeks(weeks)
}

#[tokio::test]
async fn should_delete_indices_older_than_retention_policy() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let manager = manager_with(crash_index::ElasticsearchConfig {
        retention_weeks: 2,
        ..config(&server)
    });
    let naming = manager.naming();
    let one_week = naming.name_for_date(weeks_ago(1));
    let three_weeks = naming.name_for_date(weeks_ago(3));
    let ten_weeks = naming.name_for_date(weeks_ago(10));

    // Before the sweep the cluster lists everything, afterwards only what is left.
    let before: Vec<Value> = [
        one_week.as_str(),
        ".kibana_1",
        ten_weeks.as_str(),
        "other",
        three_weeks.as_str(),
    ]
    .iter()
    .map(|name| json!({ "index": name }))
    .collect();
    Mock::given(method("GET"))
        .and(path("/_cat/indices"))
        .respond_with(es_response(200, Value::Array(before)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_cat/indices"))
        .respond_with(es_response(
            200,
            json!([{ "index": one_week }, { "index": ".kibana_1" }, { "index": "other" }]),
        ))
        .with_priority(2)
        .mount(&server)
        .await;

    for (name, times) in [(&ten_weeks, 1u64), (&three_weeks, 1), (&one_week, 0)] {
        Mock::given(method("DELETE"))
            .and(path(format!("/{name}")))
            .respond_with(acknowledged())
            .expect(times)
            .mount(&server)
            .await;
    }

    let deleted = manager.delete_expired_indices().await?;

    assert_that!(deleted).is_equal_to(vec![ten_weeks, three_weeks]);
    assert_that!(manager.list_managed_indices().await?).is_equal_to(vec![one_week]);
    Ok(())
}

#[tokio::test]
async fn should_not_delete_anything_without_managed_indices() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_indices(&server, &[".kibana_1", "supersearch_fields"]).await;
    Mock::given(method("DELETE"))
        .respond_with(acknowledged())
        .expect(0)
        .mount(&server)
        .await;

    let deleted = manager(&server).delete_expired_indices().await?;

    assert_that!(deleted).is_empty();
    Ok(())
}

#[tokio::test]
async fn should_skip_unreadable_names_and_keep_sweeping() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let manager = manager(&server);
    let expired = manager.naming().name_for_date(weeks_ago(40));
    let recent = manager.naming().name_for_date(weeks_ago(1));

    // Week 99 matches the pattern but is no date.
    mount_indices(&server, &["socorro201099", expired.as_str(), recent.as_str()]).await;
    Mock::given(method("DELETE"))
        .and(path(format!("/{expired}")))
        .respond_with(acknowledged())
        .expect(1)
        .mount(&server)
        .await;

    let sweep = manager.sweep_expired_indices().await?;

    assert_that!(sweep.deleted).is_equal_to(vec![expired]);
    assert_that!(sweep.kept).is_equal_to(vec![recent]);
    assert_that!(sweep.skipped).has_length(1);
    assert_that!(sweep.skipped[0].name).is_equal_to("socorro201099".to_string());
    assert_that!(sweep.cutoff).is_equal_to(weeks_ago(26).naive_utc());
    Ok(())
}

#[tokio::test]
async fn should_keep_index_of_the_cutoff_week_when_its_monday_is_after_cutoff(
) -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let manager = manager_with(crash_index::ElasticsearchConfig {
        retention_weeks: 1,
        ..config(&server)
    });
    // Cutoff is Wednesday 2024-06-12 noon, the index of that week starts on the
    // Monday before and is expired; the current one is kept.
    mount_indices(&server, &["socorro202424", "socorro202425"]).await;
    Mock::given(method("DELETE"))
        .and(path("/socorro202424"))
        .respond_with(acknowledged())
        .expect(1)
        .mount(&server)
        .await;

    let deleted = manager.delete_expired_indices().await?;

    assert_that!(deleted).is_equal_to(vec!["socorro202424".to_string()]);
    Ok(())
}

#[tokio::test]
async fn should_stop_sweep_on_failed_deletion() {
    let server = MockServer::start().await;
    let manager = manager(&server);
    let expired = manager.naming().name_for_date(weeks_ago(30));
    mount_indices(&server, &[expired.as_str()]).await;
    Mock::given(method("DELETE"))
        .and(path(format!("/{expired}")))
        .respond_with(es_error(500, "exception", "node left the cluster"))
        .mount(&server)
        .await;

    let res = manager.delete_expired_indices().await;

    assert_that!(res).is_err().matches(|err| {
        matches!(err, IndexError::ElasticSearchHttpError { status: Some(500), .. })
    });
}

#[tokio::test]
async fn should_expire_monthly_indices() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let manager = manager_with(crash_index::ElasticsearchConfig {
        index_template: String::from("socorro%Y%m"),
        retention_weeks: 8,
        ..config(&server)
    });
    // Cutoff is 2024-04-24 noon: March and April started before it.
    mount_indices(
        &server,
        &["socorro202406", "socorro202403", "socorro202405", "socorro202404"],
    )
    .await;
    for (name, times) in [
        ("socorro202403", 1u64),
        ("socorro202404", 1),
        ("socorro202405", 0),
        ("socorro202406", 0),
    ] {
        Mock::given(method("DELETE"))
            .and(path(format!("/{name}")))
            .respond_with(acknowledged())
            .expect(times)
            .mount(&server)
            .await;
    }

    let sweep = manager.sweep_expired_indices().await?;

    assert_that!(sweep.deleted)
        .is_equal_to(vec!["socorro202403".to_string(), "socorro202404".to_string()]);
    assert_that!(sweep.kept)
        .is_equal_to(vec!["socorro202405".to_string(), "socorro202406".to_string()]);
    assert_that!(sweep.skipped).is_empty();
    Ok(())
}
