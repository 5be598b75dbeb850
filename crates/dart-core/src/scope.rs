//! Scope locking and statement-type selection.
//!
//! A [`ScopePolicy`] restricts which report codes, consolidation flags and
//! statement categories a client may reach. Statement filtering is tracked in
//! three tiers by [`StatementSelection`]:
//!
//! - *requested*: what the caller asked for, verbatim
//! - *effective*: requested ∩ allowlist, falling back to the whole allowlist
//! - *missing*: allowlisted categories absent from the raw upstream rows

use std::collections::HashSet;

use crate::{
    codes::{FsDiv, ReportCode, SjDiv},
    error::{DartError, Result},
    types::StatementRow,
};

/// Disclosure type for periodic reports.
pub const PERIODIC_DISCLOSURE: &str = "A";

/// Disclosure detail type for the annual business report.
pub const ANNUAL_REPORT_DETAIL: &str = "A001";

/// Server-enforced restrictions on client-chosen parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopePolicy {
    /// Report codes a client may request; the first is the default.
    pub allowed_report_codes: Vec<ReportCode>,
    /// Consolidation flag forced on every statement fetch, if any.
    pub fs_div_lock: Option<FsDiv>,
    /// Statement categories rows are filtered to.
    pub statement_allowlist: Vec<SjDiv>,
    /// Disclosure detail type forced on filings lookups, if any.
    pub filing_detail_type: Option<&'static str>,
    /// Page size of filings lookups.
    pub filing_page_count: u32,
}

impl ScopePolicy {
    /// Any report code and consolidation flag.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            allowed_report_codes: ReportCode::ALL.to_vec(),
            fs_div_lock: None,
            statement_allowlist: SjDiv::ALL.to_vec(),
            filing_detail_type: None,
            filing_page_count: 100,
        }
    }

    /// Consolidated statements only, restricted to the five core categories.
    #[must_use]
    pub fn consolidated() -> Self {
        Self {
            fs_div_lock: Some(FsDiv::Consolidated),
            ..Self::unrestricted()
        }
    }

    /// Consolidated annual business reports only.
    #[must_use]
    pub fn annual_only() -> Self {
        Self {
            allowed_report_codes: vec![ReportCode::Annual],
            filing_detail_type: Some(ANNUAL_REPORT_DETAIL),
            ..Self::consolidated()
        }
    }

    /// Returns the report code used when the client sends none.
    #[must_use]
    pub fn default_report_code(&self) -> ReportCode {
        self.allowed_report_codes
            .first()
            .copied()
            .unwrap_or_default()
    }

    /// Validates a client-supplied report code against the policy.
    pub fn report_code(&self, requested: Option<&str>) -> Result<ReportCode> {
        let Some(raw) = requested else {
            return Ok(self.default_report_code());
        };
        let code: ReportCode = raw.parse()?;
        if self.allowed_report_codes.contains(&code) {
            return Ok(code);
        }
        Err(match self.allowed_report_codes.as_slice() {
            [only] => DartError::InvalidInput(format!("reprt_code is locked to {only}")),
            _ => DartError::InvalidInput(format!("reprt_code {code} is not allowed")),
        })
    }

    /// Applies the consolidation lock to a client-supplied flag.
    ///
    /// Any flag other than the lock is rejected rather than silently rewritten.
    pub fn fs_div(&self, requested: FsDiv) -> Result<FsDiv> {
        match self.fs_div_lock {
            Some(lock) if lock != requested => Err(DartError::InvalidInput(format!(
                "fs_div is locked to {lock} in this proxy"
            ))),
            Some(lock) => Ok(lock),
            None => Ok(requested),
        }
    }

    /// Parses a single `sj_div` shard, which must be allowlisted.
    pub fn single_statement(&self, raw: &str) -> Result<SjDiv> {
        let div: SjDiv = raw.parse()?;
        if self.statement_allowlist.contains(&div) {
            Ok(div)
        } else {
            Err(DartError::InvalidInput(format!(
                "sj_div {div} is outside the statement allowlist"
            )))
        }
    }
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self::annual_only()
    }
}

/// The statement-type filter a caller supplied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StatementFilter {
    /// No filter: every allowlisted category.
    #[default]
    All,
    /// A single validated category (`sj_div`).
    Single(SjDiv),
    /// A raw comma-separated list (`sj_div_in`), possibly with unknown codes.
    List(String),
}

/// Requested and effective statement categories for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementSelection {
    requested: Vec<String>,
    effective: Vec<SjDiv>,
}

impl StatementSelection {
    /// Resolves a filter against an allowlist.
    #[must_use]
    pub fn new(filter: &StatementFilter, allowlist: &[SjDiv]) -> Self {
        let defaults = || -> Vec<String> {
            allowlist.iter().map(|d| d.as_str().to_string()).collect()
        };
        let requested: Vec<String> = match filter {
            StatementFilter::All => defaults(),
            StatementFilter::Single(div) => vec![div.as_str().to_string()],
            StatementFilter::List(raw) => {
                let parsed: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_ascii_uppercase)
                    .collect();
                if parsed.is_empty() { defaults() } else { parsed }
            }
        };

        let effective = SjDiv::sorted(
            requested
                .iter()
                .filter_map(|code| SjDiv::parse(code))
                .filter(|div| allowlist.contains(div)),
        );
        let effective = if effective.is_empty() {
            SjDiv::sorted(allowlist.iter().copied())
        } else {
            effective
        };

        Self {
            requested,
            effective,
        }
    }

    /// Categories as the caller asked for them.
    #[must_use]
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// Categories actually used to filter rows.
    #[must_use]
    pub fn effective(&self) -> &[SjDiv] {
        &self.effective
    }

    /// Returns true if the row belongs to an effective category.
    #[must_use]
    pub fn matches(&self, row: &StatementRow) -> bool {
        row.sj_div()
            .is_some_and(|div| self.effective.contains(&div))
    }

    /// Keeps only matching rows, preserving order.
    #[must_use]
    pub fn filter(&self, rows: &[StatementRow]) -> Vec<StatementRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// Returns the core categories that never appear in the raw rows.
///
/// Independent of any client filter: it reports upstream data gaps.
#[must_use]
pub fn missing_statements(rows: &[StatementRow]) -> Vec<SjDiv> {
    let present: HashSet<SjDiv> = rows.iter().filter_map(StatementRow::sj_div).collect();
    SjDiv::sorted(SjDiv::ALL.into_iter().filter(|div| !present.contains(div)))
}
