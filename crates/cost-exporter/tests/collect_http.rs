//! End-to-end scrapes against a mock billing API over real HTTP.

use std::time::Duration;

use chrono::NaiveDate;
use ea_cost_exporter::{
    BalanceCollector, BillingCollector, CollectError, CollectorConfig, FetchError,
    ScrapeRegistry, UsageCollector, UsageCollectorConfig,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENROLLMENT: &str = "100";
const TOKEN: &str = "secret-key";

fn config(server: &MockServer, metric: &str) -> CollectorConfig {
    CollectorConfig::new(metric, ENROLLMENT, TOKEN)
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(5))
}

fn usage_config(server: &MockServer) -> UsageCollectorConfig {
    UsageCollectorConfig::new(config(server, "azure_ea_usage_cost"))
        .with_billing_period(NaiveDate::from_ymd_opt(2017, 4, 30).unwrap())
}

fn usage_line(department: &str, cost: f64) -> serde_json::Value {
    json!({
        "departmentName": department,
        "accountName": "a1",
        "subscriptionName": "prod",
        "meterCategory": "storage",
        "meterSubCategory": "blob",
        "meterName": "lrs",
        "meterRegion": "eu west",
        "resourceGroup": "data",
        "cost": cost
    })
}

#[tokio::test]
async fn test_full_scrape_encodes_both_collectors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/enrollments/100/balancesummary"))
        .and(header("authorization", "Bearer secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"billingPeriodId": 201_704, "currencyCode": "EUR", "totalUsage": 42.5}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/enrollments/100/usagedetailsbycustomdate"))
        .and(query_param("startTime", "2017-04-30"))
        .and(query_param("endTime", "2017-04-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [usage_line("Eng", 2.25)],
            "nextLink": format!("{}/usage/page2", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/usage/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [usage_line("ENG", 1.0)],
            "nextLink": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let balance = config(&server, "azure_ea_balance");
    let usage = usage_config(&server);

    let text = tokio::task::spawn_blocking(move || {
        let mut registry = ScrapeRegistry::new();
        registry.register(Box::new(BalanceCollector::new(&balance)?))?;
        registry.register(Box::new(UsageCollector::new(&usage)?))?;
        registry.encode()
    })
    .await
    .unwrap()
    .unwrap();

    assert!(text.contains("# TYPE azure_ea_balance counter"));
    assert!(text.contains(
        "azure_ea_balance{billingPeriodId=\"201704\",currencyCode=\"eur\"} 42.5"
    ));
    assert!(text.contains("# HELP azure_ea_usage_cost Costs billed to Azure Enterprise Agreement 100"));
    assert!(text.contains("departmentName=\"eng\""));
    assert!(text.contains("resourceGroup=\"data\"} 3"));
}

#[tokio::test]
async fn test_no_usage_sentinel_is_empty_scrape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/enrollments/100/usagedetailsbycustomdate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("\"Usage Data Extract\"\r\n\"\"\r\n"),
        )
        .mount(&server)
        .await;

    let usage = usage_config(&server);
    let families = tokio::task::spawn_blocking(move || UsageCollector::new(&usage)?.collect())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(families.len(), 1);
    assert!(families[0].get_metric().is_empty());
}

#[tokio::test]
async fn test_server_error_fails_scrape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/enrollments/100/balancesummary"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "billing backend unavailable"}
        })))
        .mount(&server)
        .await;

    let balance = config(&server, "azure_ea_balance");
    let err = tokio::task::spawn_blocking(move || BalanceCollector::new(&balance)?.collect())
        .await
        .unwrap()
        .unwrap_err();

    match err {
        CollectError::Fetch(FetchError::Api {
            status, message, ..
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "billing backend unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/enrollments/100/balancesummary"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let balance = config(&server, "azure_ea_balance").with_timeout(Duration::from_millis(200));
    let err = tokio::task::spawn_blocking(move || BalanceCollector::new(&balance)?.collect())
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, CollectError::Fetch(FetchError::Timeout { .. })));
}
