//! Serializable shapes of the three proxy operations.

use chrono::NaiveDate;
use dart_core::types::yyyymmdd;
use dart_core::{
    BusinessYear, CorpCode, DartError, FilingSummary, FsDiv, ReportCode, SjDiv, StatementRow,
    Ticker,
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Operation selected by the `op` discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Operation {
    /// Stock code to corporate identifier.
    #[serde(rename = "resolve")]
    Resolve,
    /// Periodic filings list.
    #[serde(rename = "list")]
    List,
    /// Paged full statement set.
    #[serde(rename = "fnltt_all")]
    FnlttAll,
}

impl Operation {
    /// Wire name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::List => "list",
            Self::FnlttAll => "fnltt_all",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolve" => Ok(Self::Resolve),
            "list" => Ok(Self::List),
            "fnltt_all" => Ok(Self::FnlttAll),
            _ => Err(DartError::InvalidInput(
                "op must be resolve | list | fnltt_all".to_string(),
            )),
        }
    }
}

/// Result of `op=resolve`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolveResponse {
    /// Always [`Operation::Resolve`].
    pub op: Operation,
    /// Embedded status of the company lookup.
    pub status: String,
    /// Embedded message of the company lookup.
    pub message: String,
    /// Requested stock code.
    pub stock_code: Ticker,
    /// Resolved corporate identifier.
    pub corp_code: CorpCode,
    /// Name from the corp-code manifest.
    pub corp_name: String,
    /// Manifest modification date.
    #[serde(with = "yyyymmdd")]
    pub modify_date: Option<NaiveDate>,
    /// Fiscal closing month.
    pub acc_mt: Option<String>,
    /// Embedded status of `company.json`.
    pub company_status: String,
    /// Embedded message of `company.json`.
    pub company_message: String,
}

/// Filing restrictions applied to a `list` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilingScope {
    /// Disclosure type.
    pub pblntf_ty: &'static str,
    /// Disclosure detail type, when locked.
    pub pblntf_detail_ty: Option<&'static str>,
    /// Upstream page size.
    pub page_count: u32,
}

/// Result of `op=list`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilingsResponse {
    /// Always [`Operation::List`].
    pub op: Operation,
    /// Embedded upstream status.
    pub status: String,
    /// Embedded upstream message.
    pub message: String,
    /// Restrictions the upstream query was issued with.
    pub scope_lock_applied: FilingScope,
    /// Requested stock code.
    pub stock_code: Ticker,
    /// Resolved corporate identifier.
    pub corp_code: CorpCode,
    /// Look-back window after clamping.
    pub lookback_years: u32,
    /// Filings, newest first.
    pub items: Vec<FilingSummary>,
}

/// Statement restrictions applied to a `fnltt_all` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatementScope {
    /// Forced consolidation flag.
    pub fs_div_lock: Option<FsDiv>,
    /// Forced report code.
    pub reprt_code_lock: Option<ReportCode>,
    /// Categories rows were filtered to, sorted.
    pub sj_div_allowlist_effective: Vec<SjDiv>,
}

/// Result of `op=fnltt_all`: one page of filtered statement rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatementPage {
    /// Always [`Operation::FnlttAll`].
    pub op: Operation,
    /// Embedded status of the cached upstream response.
    pub status: String,
    /// Embedded message of the cached upstream response.
    pub message: String,
    /// Paging advice for clients.
    pub hint: String,
    /// Locks in force for this request.
    pub scope_lock_applied: StatementScope,
    /// Categories as the caller asked for them.
    pub sj_div_in_requested: Vec<String>,
    /// Categories actually used to filter rows.
    pub sj_div_in_effective: Vec<SjDiv>,
    /// Core categories absent from the unfiltered upstream rows.
    pub sj_div_missing_required_in_data: Vec<SjDiv>,
    /// Requested stock code.
    pub stock_code: Ticker,
    /// Resolved corporate identifier.
    pub corp_code: CorpCode,
    /// Business year.
    pub bsns_year: BusinessYear,
    /// Report code used upstream.
    pub reprt_code: ReportCode,
    /// Consolidation flag used upstream.
    pub fs_div: FsDiv,
    /// Offset of this page.
    pub cursor: usize,
    /// Page size.
    pub limit: usize,
    /// Offset of the next page, absent on the last one.
    pub next_cursor: Option<usize>,
    /// Number of rows after filtering.
    pub total_rows: usize,
    /// Rows of this page, in upstream order.
    pub list: Vec<StatementRow>,
}
