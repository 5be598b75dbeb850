//! HTTP contract of the proxy, driven through the router without a socket.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use dart::types::yyyymmdd;
use dart::{
    CompanyOverview, CorpCode, CorporateRecord, DartService, FsDiv, InMemorySource, ManualClock,
    ReportCode, ScopePolicy, StatementKey, StatementRow,
};
use dart_proxy::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

const TOKEN: &str = "s3cret";

fn corp() -> CorpCode {
    CorpCode::new("00126380").unwrap()
}

fn rows() -> Vec<StatementRow> {
    (0..120)
        .map(|i| {
            let div = if i % 2 == 0 { "BS" } else { "IS" };
            serde_json::from_value(json!({ "sj_div": div, "ord": i })).unwrap()
        })
        .collect()
}

fn source() -> Arc<InMemorySource> {
    Arc::new(
        InMemorySource::new()
            .with_corporations(vec![CorporateRecord::new(
                "005930".parse().unwrap(),
                corp(),
                "삼성전자",
                yyyymmdd::parse("20230110"),
            )])
            .with_company(
                corp(),
                CompanyOverview {
                    corp_name: Some("삼성전자(주)".to_string()),
                    acc_mt: Some("12".to_string()),
                },
            )
            .with_statements(
                StatementKey {
                    corp_code: corp(),
                    bsns_year: "2023".parse().unwrap(),
                    reprt_code: ReportCode::Annual,
                    fs_div: FsDiv::Consolidated,
                },
                rows(),
            ),
    )
}

fn app_with(source: Arc<InMemorySource>, token: Option<&str>, policy: ScopePolicy) -> Router {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    ));
    let service = DartService::new(source)
        .with_clock(clock.clone())
        .with_policy(policy);
    router(AppState::new(Arc::new(service), token).with_clock(clock))
}

fn app() -> Router {
    app_with(source(), None, ScopePolicy::annual_only())
}

async fn get(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_healthz() {
    let (status, body) = get(app(), "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["ts"].as_str().unwrap().starts_with("2024-03-01T09:00:00"));
}

#[tokio::test]
async fn test_resolve() {
    let (status, body) = get(app(), "/v1/dart?op=resolve&stock_code=005930", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["op"], "resolve");
    assert_eq!(body["corp_code"], "00126380");
    assert_eq!(body["corp_name"], "삼성전자");
    assert_eq!(body["modify_date"], "20230110");
    assert_eq!(body["acc_mt"], "12");
    assert_eq!(body["company_status"], "000");
}

#[tokio::test]
async fn test_unknown_ticker_is_404() {
    let (status, body) = get(app(), "/v1/dart?op=resolve&stock_code=999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Unknown stock_code: 999999");
}

#[tokio::test]
async fn test_statement_pages() {
    let app = app();
    let (status, first) = get(
        app.clone(),
        "/v1/dart?op=fnltt_all&stock_code=005930&bsns_year=2023",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["total_rows"], 120);
    assert_eq!(first["list"].as_array().unwrap().len(), 100);
    assert_eq!(first["next_cursor"], 100);
    assert_eq!(first["scope_lock_applied"]["fs_div_lock"], "CFS");
    assert_eq!(first["scope_lock_applied"]["reprt_code_lock"], "11011");
    assert_eq!(first["sj_div_missing_required_in_data"], json!(["CF", "CIS", "SCE"]));

    let (_, second) = get(
        app,
        "/v1/dart?op=fnltt_all&stock_code=005930&bsns_year=2023&cursor=100&limit=100",
        None,
    )
    .await;
    assert_eq!(second["list"].as_array().unwrap().len(), 20);
    assert_eq!(second["next_cursor"], Value::Null);
}

#[tokio::test]
async fn test_statement_filter_echoes_selection() {
    let (status, body) = get(
        app(),
        "/v1/dart?op=fnltt_all&stock_code=005930&bsns_year=2023&sj_div_in=is,XX&limit=50",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sj_div_in_requested"], json!(["IS", "XX"]));
    assert_eq!(body["sj_div_in_effective"], json!(["IS"]));
    assert_eq!(body["total_rows"], 60);
    assert_eq!(body["next_cursor"], 50);
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let cases = [
        "/v1/dart?op=nope&stock_code=005930",
        "/v1/dart?op=resolve&stock_code=59300",
        "/v1/dart?op=resolve&stock_code=005930&limit=10",
        "/v1/dart?op=resolve&stock_code=005930&sj_div=BS",
        "/v1/dart?op=fnltt_all&stock_code=005930",
        "/v1/dart?op=fnltt_all&stock_code=005930&bsns_year=2023&fs_div=OFS",
        "/v1/dart?op=fnltt_all&stock_code=005930&bsns_year=2023&reprt_code=11012",
        "/v1/dart?op=fnltt_all&stock_code=005930&bsns_year=2023&reprt_code=",
        "/v1/dart?op=fnltt_all&stock_code=005930&bsns_year=2023&limit=",
    ];
    for uri in cases {
        let (status, body) = get(app(), uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["detail"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_bearer_auth() {
    let app = app_with(source(), Some(TOKEN), ScopePolicy::annual_only());
    let uri = "/v1/dart?op=resolve&stock_code=005930";

    let (status, _) = get(app.clone(), uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(app.clone(), uri, Some("Bearer wrong")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(app.clone(), uri, Some(format!("Bearer {TOKEN}").as_str())).await;
    assert_eq!(status, StatusCode::OK);

    // Auth is checked before parameters are validated.
    let (status, _) = get(app, "/v1/dart?op=nope", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upstream_failure_is_502() {
    let source = source();
    source
        .fail_manifest(dart::DartError::Network("timed out".to_string()))
        .await;
    let app = app_with(source, None, ScopePolicy::annual_only());
    let (status, body) = get(app, "/v1/dart?op=resolve&stock_code=005930", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_list_without_filings_is_502() {
    let (status, body) = get(
        app(),
        "/v1/dart?op=list&stock_code=005930&lookback_years=20",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("013"));
}

#[tokio::test]
async fn test_unrestricted_policy_allows_separate() {
    let app = app_with(source(), None, ScopePolicy::unrestricted());
    let (status, body) = get(
        app,
        "/v1/dart?op=fnltt_all&stock_code=005930&bsns_year=2023&fs_div=OFS&reprt_code=11013",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fs_div"], "OFS");
    assert_eq!(body["reprt_code"], "11013");
    assert_eq!(body["total_rows"], 0);
    assert_eq!(body["scope_lock_applied"]["fs_div_lock"], Value::Null);
}
