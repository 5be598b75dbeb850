//! Disclosure service: resolver, statement cache and scope policy behind one handle.

use std::sync::Arc;

use chrono::TimeDelta;
use tracing::{debug, info, instrument};

use dart_cache::{CorpCodeResolver, StatementCache};
use dart_core::scope::PERIODIC_DISCLOSURE;
use dart_core::{
    BusinessYear, Clock, DartError, DisclosureSource, FilingsQuery, FsDiv,
    ReportCode, Result, ScopePolicy, StatementFilter, StatementKey, StatementSelection,
    SystemClock, Ticker, missing_statements, paginate,
};

use crate::response::{
    FilingScope, FilingsResponse, Operation, ResolveResponse, StatementPage, StatementScope,
};

/// Smallest page a client may request.
pub const MIN_LIMIT: usize = 50;
/// Largest page a client may request.
pub const MAX_LIMIT: usize = 500;
/// Page size when the client sends none.
pub const DEFAULT_LIMIT: usize = 100;

/// Shortest filings look-back window, in years.
pub const MIN_LOOKBACK_YEARS: u32 = 3;
/// Longest filings look-back window, in years.
pub const MAX_LOOKBACK_YEARS: u32 = 10;
/// Look-back window when the client sends none.
pub const DEFAULT_LOOKBACK_YEARS: u32 = 6;

/// Pages per report a well-behaved client should stop at.
pub const MAX_CURSOR_PAGES_HINT: usize = 12;

/// Clamps a requested look-back window into the supported range.
#[must_use]
pub fn clamp_lookback(years: i64) -> u32 {
    let clamped = years.clamp(i64::from(MIN_LOOKBACK_YEARS), i64::from(MAX_LOOKBACK_YEARS));
    u32::try_from(clamped).unwrap_or(DEFAULT_LOOKBACK_YEARS)
}

/// A validated `fnltt_all` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementRequest {
    /// Listed stock code.
    pub ticker: Ticker,
    /// Business year.
    pub bsns_year: BusinessYear,
    /// Report code, already checked against the policy.
    pub reprt_code: ReportCode,
    /// Consolidation flag.
    pub fs_div: FsDiv,
    /// Offset into the filtered rows.
    pub cursor: usize,
    /// Page size.
    pub limit: usize,
    /// Statement-type filter.
    pub filter: StatementFilter,
}

/// Scope-locked OpenDART access.
///
/// Owns the corp-code resolver and the statement cache for one upstream.
/// Construct once at startup and share behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// let service = DartService::new(Arc::new(InMemorySource::new()))
///     .with_policy(ScopePolicy::unrestricted())
///     .with_clock(Arc::new(ManualClock::new(start)));
/// ```
#[derive(Debug)]
pub struct DartService {
    source: Arc<dyn DisclosureSource>,
    resolver: CorpCodeResolver,
    statements: StatementCache,
    policy: ScopePolicy,
    clock: Arc<dyn Clock>,
}

impl DartService {
    /// Create a service with the default (annual-only) policy and the system clock.
    #[must_use]
    pub fn new(source: Arc<dyn DisclosureSource>) -> Self {
        Self::build(source, ScopePolicy::default(), Arc::new(SystemClock))
    }

    /// Replace the scope policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ScopePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the time source. Both caches are rebuilt empty.
    #[must_use]
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self::build(self.source, self.policy, clock)
    }

    fn build(source: Arc<dyn DisclosureSource>, policy: ScopePolicy, clock: Arc<dyn Clock>) -> Self {
        debug!(source = source.name(), "Building disclosure service");
        Self {
            resolver: CorpCodeResolver::new(Arc::clone(&source)).with_clock(Arc::clone(&clock)),
            statements: StatementCache::new(Arc::clone(&source)).with_clock(Arc::clone(&clock)),
            source,
            policy,
            clock,
        }
    }

    /// The policy requests are checked against.
    #[must_use]
    pub const fn policy(&self) -> &ScopePolicy {
        &self.policy
    }

    /// Resolve a stock code and look up the company's fiscal closing month.
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn resolve(&self, ticker: &Ticker) -> Result<ResolveResponse> {
        let record = self.resolver.resolve(ticker).await?;
        let company = self.source.company(&record.corp_code).await?;
        company.ensure_ok(false)?;

        Ok(ResolveResponse {
            op: Operation::Resolve,
            status: company.status.clone(),
            message: company.message.clone(),
            stock_code: record.stock_code,
            corp_code: record.corp_code,
            corp_name: record.corp_name,
            modify_date: record.modify_date,
            acc_mt: company.body.acc_mt,
            company_status: company.status,
            company_message: company.message,
        })
    }

    /// List periodic filings over the last `lookback_years` (clamped to 3..=10).
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn list_filings(&self, ticker: &Ticker, lookback_years: i64) -> Result<FilingsResponse> {
        let record = self.resolver.resolve(ticker).await?;
        let years = clamp_lookback(lookback_years);

        let end = self.clock.now().date_naive();
        let begin = end - TimeDelta::days(365 * i64::from(years));
        let query = FilingsQuery {
            corp_code: record.corp_code.clone(),
            begin,
            end,
            disclosure_type: PERIODIC_DISCLOSURE,
            detail_type: self.policy.filing_detail_type,
            page_count: self.policy.filing_page_count,
        };

        let envelope = self.source.filings(&query).await?;
        envelope.ensure_ok(false)?;
        let items = envelope.body.list;
        debug!(filings = items.len(), %begin, %end, "Listed filings");

        Ok(FilingsResponse {
            op: Operation::List,
            status: envelope.status,
            message: envelope.message,
            scope_lock_applied: FilingScope {
                pblntf_ty: query.disclosure_type,
                pblntf_detail_ty: query.detail_type,
                page_count: query.page_count,
            },
            stock_code: record.stock_code,
            corp_code: record.corp_code,
            lookback_years: years,
            items,
        })
    }

    /// Fetch (or serve from cache) a report's statements and return one page.
    ///
    /// The page is cut from the rows matching the effective statement set;
    /// the missing set is always computed from the unfiltered rows.
    #[instrument(skip(self, request), fields(ticker = %request.ticker, bsns_year = %request.bsns_year))]
    pub async fn fetch_statements(&self, request: &StatementRequest) -> Result<StatementPage> {
        if request.limit == 0 {
            return Err(DartError::InvalidInput(format!(
                "limit must be {MIN_LIMIT}..{MAX_LIMIT}"
            )));
        }
        let reprt_code = self.policy.report_code(Some(request.reprt_code.as_str()))?;
        let fs_div = self.policy.fs_div(request.fs_div)?;

        let record = self.resolver.resolve(&request.ticker).await?;
        let key = StatementKey {
            corp_code: record.corp_code.clone(),
            bsns_year: request.bsns_year.clone(),
            reprt_code,
            fs_div,
        };
        let entry = self.statements.get(&key).await?;

        let selection = StatementSelection::new(&request.filter, &self.policy.statement_allowlist);
        let missing = missing_statements(&entry.rows);
        let filtered = selection.filter(&entry.rows);
        let page = paginate(&filtered, request.cursor, request.limit);

        info!(
            key = %key,
            total_rows = page.total,
            returned = page.items.len(),
            next_cursor = ?page.next_cursor,
            "Served statement page"
        );

        let reprt_code_lock = match self.policy.allowed_report_codes.as_slice() {
            [only] => Some(*only),
            _ => None,
        };

        Ok(StatementPage {
            op: Operation::FnlttAll,
            status: entry.status.clone(),
            message: entry.message.clone(),
            hint: format!(
                "Client should avoid >{MAX_CURSOR_PAGES_HINT} pages per report to prevent abuse/timeouts."
            ),
            scope_lock_applied: StatementScope {
                fs_div_lock: self.policy.fs_div_lock,
                reprt_code_lock,
                sj_div_allowlist_effective: selection.effective().to_vec(),
            },
            sj_div_in_requested: selection.requested().to_vec(),
            sj_div_in_effective: selection.effective().to_vec(),
            sj_div_missing_required_in_data: missing,
            stock_code: record.stock_code,
            corp_code: record.corp_code,
            bsns_year: request.bsns_year.clone(),
            reprt_code,
            fs_div,
            cursor: request.cursor,
            limit: request.limit,
            next_cursor: page.next_cursor,
            total_rows: page.total,
            list: page.items,
        })
    }
}
