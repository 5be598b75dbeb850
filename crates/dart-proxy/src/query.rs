//! Validation of `GET /v1/dart` query parameters.
//!
//! Every parameter arrives as an optional string and is checked in a fixed
//! order, so a request with several problems always reports the same one.
//! Blank `fs_div`, `sj_div` and `sj_div_in` count as absent; any other
//! parameter that is present must carry a valid value.

use dart::{
    BusinessYear, DEFAULT_LIMIT, DEFAULT_LOOKBACK_YEARS, DartError, FsDiv, MAX_LIMIT, MIN_LIMIT,
    Operation, Result, ScopePolicy, StatementFilter, StatementRequest, Ticker,
};
use serde::Deserialize;

/// Raw query string of `GET /v1/dart`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DartParams {
    /// `resolve`, `list` or `fnltt_all`.
    pub op: Option<String>,
    /// Six-digit listed stock code.
    pub stock_code: Option<String>,
    /// Filings look-back window (list only).
    pub lookback_years: Option<String>,
    /// Business year (fnltt_all only).
    pub bsns_year: Option<String>,
    /// Report code (fnltt_all only).
    pub reprt_code: Option<String>,
    /// Consolidation flag, `CFS` or `OFS`.
    pub fs_div: Option<String>,
    /// Single statement category (fnltt_all only).
    pub sj_div: Option<String>,
    /// Comma-separated statement categories (fnltt_all only).
    pub sj_div_in: Option<String>,
    /// Row offset.
    pub cursor: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}

/// A validated request, ready to dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DartRequest {
    /// `op=resolve`.
    Resolve(Ticker),
    /// `op=list`.
    List {
        /// Company to list filings for.
        ticker: Ticker,
        /// Requested window, clamped by the service.
        lookback_years: i64,
    },
    /// `op=fnltt_all`.
    Statements(StatementRequest),
}

fn invalid(message: impl Into<String>) -> DartError {
    DartError::InvalidInput(message.into())
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn integer(value: Option<&String>, name: &str) -> Result<Option<i64>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| invalid(format!("{name} must be an integer")))
        })
        .transpose()
}

impl DartParams {
    /// Validates the parameters against `policy`.
    pub fn validate(&self, policy: &ScopePolicy) -> Result<DartRequest> {
        let op: Operation = self.op.as_deref().unwrap_or_default().parse()?;
        let ticker: Ticker = self.stock_code.as_deref().unwrap_or_default().parse()?;
        let fs_div: FsDiv = present(self.fs_div.as_ref()).unwrap_or("CFS").parse()?;

        let cursor = integer(self.cursor.as_ref(), "cursor")?.unwrap_or(0);
        let cursor = usize::try_from(cursor).map_err(|_| invalid("cursor must be >= 0"))?;

        let limit = match integer(self.limit.as_ref(), "limit")? {
            None => DEFAULT_LIMIT,
            Some(raw) => usize::try_from(raw)
                .ok()
                .filter(|l| (MIN_LIMIT..=MAX_LIMIT).contains(l))
                .ok_or_else(|| invalid(format!("limit must be {MIN_LIMIT}..{MAX_LIMIT}")))?,
        };

        let sj_div = present(self.sj_div.as_ref());
        let sj_div_in = present(self.sj_div_in.as_ref());
        if op != Operation::FnlttAll && (sj_div.is_some() || sj_div_in.is_some()) {
            return Err(invalid(
                "sj_div/sj_div_in is only allowed when op=fnltt_all",
            ));
        }

        match op {
            Operation::Resolve => Ok(DartRequest::Resolve(ticker)),
            Operation::List => {
                let lookback_years = integer(self.lookback_years.as_ref(), "lookback_years")?
                    .unwrap_or_else(|| i64::from(DEFAULT_LOOKBACK_YEARS));
                Ok(DartRequest::List {
                    ticker,
                    lookback_years,
                })
            }
            Operation::FnlttAll => {
                let bsns_year: BusinessYear =
                    present(self.bsns_year.as_ref()).unwrap_or_default().parse()?;
                let reprt_code = policy.report_code(self.reprt_code.as_deref())?;

                let filter = match (sj_div, sj_div_in) {
                    (Some(_), Some(_)) => {
                        return Err(invalid("Provide either sj_div or sj_div_in, not both"));
                    }
                    (Some(single), None) => StatementFilter::Single(policy.single_statement(single)?),
                    (None, Some(list)) => StatementFilter::List(list.to_string()),
                    (None, None) => StatementFilter::All,
                };
                let fs_div = policy.fs_div(fs_div)?;

                Ok(DartRequest::Statements(StatementRequest {
                    ticker,
                    bsns_year,
                    reprt_code,
                    fs_div,
                    cursor,
                    limit,
                    filter,
                }))
            }
        }
    }
}
