//! End-to-end behaviour of `DartService` against a scripted upstream.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use dart::types::yyyymmdd;
use dart::{
    ApiEnvelope, CompanyOverview, CorpCode, CorporateRecord, DartError, DartService, FilingList,
    FilingSummary, FsDiv, InMemorySource, ManualClock, ReportCode, ScopePolicy, SjDiv,
    StatementFilter, StatementKey, StatementList, StatementRequest, StatementRow, Ticker,
};
use serde_json::json;

const SAMSUNG: &str = "005930";
const SAMSUNG_CORP: &str = "00126380";

fn ticker(s: &str) -> Ticker {
    s.parse().unwrap()
}

fn corp() -> CorpCode {
    CorpCode::new(SAMSUNG_CORP).unwrap()
}

fn key(year: &str) -> StatementKey {
    StatementKey {
        corp_code: corp(),
        bsns_year: year.parse().unwrap(),
        reprt_code: ReportCode::Annual,
        fs_div: FsDiv::Consolidated,
    }
}

fn row(sj_div: &str, ord: usize) -> StatementRow {
    serde_json::from_value(json!({
        "rcept_no": "20240312000736",
        "sj_div": sj_div,
        "account_nm": format!("account {ord}"),
        "ord": ord.to_string(),
    }))
    .unwrap()
}

/// 60 BS rows, 40 IS rows, 20 CF rows, interleaved in upstream order.
fn statement_rows() -> Vec<StatementRow> {
    (0..120)
        .map(|i| {
            let div = match i % 6 {
                0..=2 => "BS",
                3 | 4 => "IS",
                _ => "CF",
            };
            row(div, i)
        })
        .collect()
}

fn source() -> InMemorySource {
    InMemorySource::new()
        .with_corporations(vec![CorporateRecord::new(
            ticker(SAMSUNG),
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
        .with_statements(key("2023"), statement_rows())
}

fn setup(source: InMemorySource) -> (Arc<InMemorySource>, Arc<ManualClock>, DartService) {
    let source = Arc::new(source);
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    ));
    let service = DartService::new(source.clone()).with_clock(clock.clone());
    (source, clock, service)
}

fn request(year: &str, cursor: usize, limit: usize, filter: StatementFilter) -> StatementRequest {
    StatementRequest {
        ticker: ticker(SAMSUNG),
        bsns_year: year.parse().unwrap(),
        reprt_code: ReportCode::Annual,
        fs_div: FsDiv::Consolidated,
        cursor,
        limit,
        filter,
    }
}

#[tokio::test]
async fn test_resolve_samsung() {
    let (_, _, service) = setup(source());
    let resolved = service.resolve(&ticker(SAMSUNG)).await.unwrap();

    assert_eq!(resolved.stock_code, ticker(SAMSUNG));
    assert_eq!(resolved.corp_code.as_str(), SAMSUNG_CORP);
    assert_eq!(resolved.corp_code.as_str().len(), 8);
    assert!(!resolved.corp_name.is_empty());
    assert_eq!(resolved.acc_mt.as_deref(), Some("12"));
    assert_eq!(resolved.company_status, "000");
}

#[tokio::test]
async fn test_resolve_unknown_ticker_is_not_found() {
    let (_, _, service) = setup(source());
    let err = service.resolve(&ticker("123456")).await.unwrap_err();
    assert_eq!(err, DartError::NotFound("123456".to_string()));
    assert!(!err.is_upstream());
}

#[tokio::test]
async fn test_resolve_requires_company_success() {
    let source = InMemorySource::new().with_corporations(vec![CorporateRecord::new(
        ticker(SAMSUNG),
        corp(),
        "삼성전자",
        None,
    )]);
    let (_, _, service) = setup(source);
    let err = service.resolve(&ticker(SAMSUNG)).await.unwrap_err();
    assert!(matches!(err, DartError::Upstream { ref status, .. } if status == "013"));
}

#[tokio::test]
async fn test_pages_over_120_rows() {
    let (_, _, service) = setup(source());

    let first = service
        .fetch_statements(&request("2023", 0, 100, StatementFilter::All))
        .await
        .unwrap();
    assert_eq!(first.total_rows, 120);
    assert_eq!(first.list.len(), 100);
    assert_eq!(first.next_cursor, Some(100));

    let second = service
        .fetch_statements(&request("2023", 100, 100, StatementFilter::All))
        .await
        .unwrap();
    assert_eq!(second.list.len(), 20);
    assert_eq!(second.next_cursor, None);

    let mut walked: Vec<StatementRow> = first.list;
    walked.extend(second.list);
    assert_eq!(walked, statement_rows());
}

#[tokio::test]
async fn test_cursor_walk_covers_filtered_rows_once() {
    let (_, _, service) = setup(source());
    let filter = StatementFilter::List("BS,CF".to_string());

    let mut cursor = 0;
    let mut seen = Vec::new();
    loop {
        let page = service
            .fetch_statements(&request("2023", cursor, 50, filter.clone()))
            .await
            .unwrap();
        seen.extend(page.list);
        match page.next_cursor {
            Some(next) => cursor = next,
            None => break,
        }
    }

    let expected: Vec<StatementRow> = statement_rows()
        .into_iter()
        .filter(|r| matches!(r.sj_div_raw(), "BS" | "CF"))
        .collect();
    assert_eq!(seen.len(), 80);
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_same_page_twice_hits_upstream_once() {
    let (source, clock, service) = setup(source());
    let req = request("2023", 0, 100, StatementFilter::Single(SjDiv::IncomeStatement));

    let first = service.fetch_statements(&req).await.unwrap();
    clock.advance(TimeDelta::hours(3));
    let second = service.fetch_statements(&req).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_rows, 40);
    assert_eq!(source.statement_calls(), 1);
}

#[tokio::test]
async fn test_no_data_yields_empty_page() {
    let (source, _, service) = setup(source());

    for _ in 0..2 {
        let page = service
            .fetch_statements(&request("2019", 0, 100, StatementFilter::All))
            .await
            .unwrap();
        assert_eq!(page.status, "013");
        assert_eq!(page.total_rows, 0);
        assert_eq!(page.next_cursor, None);
        assert!(page.list.is_empty());
        assert_eq!(page.sj_div_missing_required_in_data.len(), 5);
    }
    assert_eq!(source.statement_calls(), 1);
}

#[tokio::test]
async fn test_invalid_codes_fall_back_to_allowlist() {
    let (_, _, service) = setup(source());
    let page = service
        .fetch_statements(&request(
            "2023",
            0,
            100,
            StatementFilter::List("DCF,XX".to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(page.sj_div_in_requested, ["DCF", "XX"]);
    assert_eq!(
        page.sj_div_in_effective,
        [
            SjDiv::BalanceSheet,
            SjDiv::CashFlow,
            SjDiv::ComprehensiveIncome,
            SjDiv::IncomeStatement,
            SjDiv::EquityChanges,
        ]
    );
    assert_eq!(page.total_rows, 120);
}

#[tokio::test]
async fn test_missing_is_independent_of_filter() {
    let (_, _, service) = setup(source());

    let only_bs = service
        .fetch_statements(&request("2023", 0, 100, StatementFilter::List("BS".to_string())))
        .await
        .unwrap();
    let is_cf = service
        .fetch_statements(&request("2023", 0, 100, StatementFilter::List("IS,CF".to_string())))
        .await
        .unwrap();

    assert_ne!(only_bs.total_rows, is_cf.total_rows);
    assert_eq!(
        only_bs.sj_div_missing_required_in_data,
        is_cf.sj_div_missing_required_in_data
    );
    assert_eq!(
        only_bs.sj_div_missing_required_in_data,
        [SjDiv::ComprehensiveIncome, SjDiv::EquityChanges]
    );
}

#[tokio::test]
async fn test_annual_policy_reports_locks() {
    let (_, _, service) = setup(source());
    let page = service
        .fetch_statements(&request("2023", 0, 100, StatementFilter::All))
        .await
        .unwrap();

    assert_eq!(page.scope_lock_applied.fs_div_lock, Some(FsDiv::Consolidated));
    assert_eq!(page.scope_lock_applied.reprt_code_lock, Some(ReportCode::Annual));
    assert!(page.hint.contains("12 pages") || page.hint.contains(">12"));

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["op"], "fnltt_all");
    assert_eq!(json["reprt_code"], "11011");
    assert_eq!(json["fs_div"], "CFS");
    assert_eq!(json["next_cursor"], 100);
}

#[tokio::test]
async fn test_separate_statements_rejected_under_lock() {
    let (source, _, service) = setup(source());
    let mut req = request("2023", 0, 100, StatementFilter::All);
    req.fs_div = FsDiv::Separate;

    assert!(matches!(
        service.fetch_statements(&req).await,
        Err(DartError::InvalidInput(_))
    ));
    assert_eq!(source.statement_calls(), 0);
}

#[tokio::test]
async fn test_unrestricted_policy_passes_quarterlies() {
    let quarterly = StatementKey {
        reprt_code: ReportCode::FirstQuarter,
        fs_div: FsDiv::Separate,
        ..key("2023")
    };
    let source = source().with_statements(quarterly, vec![row("BS", 0), row("IS", 1)]);
    let (_, _, service) = setup(source);
    let service = service.with_policy(ScopePolicy::unrestricted());

    let mut req = request("2023", 0, 100, StatementFilter::All);
    req.reprt_code = ReportCode::FirstQuarter;
    req.fs_div = FsDiv::Separate;

    let page = service.fetch_statements(&req).await.unwrap();
    assert_eq!(page.total_rows, 2);
    assert_eq!(page.scope_lock_applied.fs_div_lock, None);
    assert_eq!(page.scope_lock_applied.reprt_code_lock, None);
}

#[tokio::test]
async fn test_list_filings_window_and_locks() {
    let filing = FilingSummary {
        rcept_no: Some("20240312000736".to_string()),
        rcept_dt: Some("20240312".to_string()),
        report_nm: Some("사업보고서 (2023.12)".to_string()),
        corp_name: Some("삼성전자".to_string()),
        stock_code: Some(SAMSUNG.to_string()),
        pblntf_ty: Some("A".to_string()),
        pblntf_detail_ty: Some("A001".to_string()),
        ..FilingSummary::default()
    };
    let source = source().with_filings(
        corp(),
        ApiEnvelope::new("000", "정상", FilingList { list: vec![filing.clone()] }),
    );
    let (source, _, service) = setup(source);

    let response = service.list_filings(&ticker(SAMSUNG), 1).await.unwrap();
    assert_eq!(response.lookback_years, 3);
    assert_eq!(response.items, vec![filing]);
    assert_eq!(response.scope_lock_applied.pblntf_ty, "A");
    assert_eq!(response.scope_lock_applied.pblntf_detail_ty, Some("A001"));
    assert_eq!(response.scope_lock_applied.page_count, 100);

    let query = source.last_filings_query().await.unwrap();
    assert_eq!(query.end, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(query.begin, query.end - TimeDelta::days(365 * 3));
    assert_eq!(query.detail_type, Some("A001"));
}

#[tokio::test]
async fn test_list_filings_no_data_is_upstream_error() {
    let (_, _, service) = setup(source());
    let err = service.list_filings(&ticker(SAMSUNG), 6).await.unwrap_err();
    assert!(matches!(err, DartError::Upstream { ref status, .. } if status == "013"));
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_list_filings_upstream_error() {
    let source = source().with_filings(
        corp(),
        ApiEnvelope::new("020", "요청 제한을 초과하였습니다.", FilingList::default()),
    );
    let (_, _, service) = setup(source);
    let err = service.list_filings(&ticker(SAMSUNG), 6).await.unwrap_err();
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_statement_upstream_error_surfaces() {
    let (source, _, service) = setup(source());
    source
        .set_statement_response(
            key("2022"),
            Ok(ApiEnvelope::new("100", "필드의 부적절한 값입니다.", StatementList::default())),
        )
        .await;

    let err = service
        .fetch_statements(&request("2022", 0, 100, StatementFilter::All))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "OpenDART status=100 message=필드의 부적절한 값입니다.");
}
