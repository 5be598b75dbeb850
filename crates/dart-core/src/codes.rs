//! OpenDART code enumerations.
//!
//! This module defines [`ReportCode`] for the periodic report being queried,
//! [`FsDiv`] for consolidated versus separate statements and [`SjDiv`] for the
//! statement category tag carried by each financial-statement row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DartError;

/// Periodic report selector (`reprt_code`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportCode {
    /// Annual business report.
    #[default]
    #[serde(rename = "11011")]
    Annual,
    /// Half-year report.
    #[serde(rename = "11012")]
    HalfYear,
    /// First-quarter report.
    #[serde(rename = "11013")]
    FirstQuarter,
    /// Third-quarter report.
    #[serde(rename = "11014")]
    ThirdQuarter,
}

impl ReportCode {
    /// Every report code OpenDART accepts.
    pub const ALL: [Self; 4] = [
        Self::Annual,
        Self::HalfYear,
        Self::FirstQuarter,
        Self::ThirdQuarter,
    ];

    /// Returns the wire code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "11011",
            Self::HalfYear => "11012",
            Self::FirstQuarter => "11013",
            Self::ThirdQuarter => "11014",
        }
    }
}

impl fmt::Display for ReportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportCode {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| DartError::InvalidInput(format!("unknown reprt_code: {s}")))
    }
}

/// Consolidation selector (`fs_div`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FsDiv {
    /// Consolidated financial statements.
    #[default]
    #[serde(rename = "CFS")]
    Consolidated,
    /// Separate (standalone) financial statements.
    #[serde(rename = "OFS")]
    Separate,
}

impl FsDiv {
    /// Returns the wire code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consolidated => "CFS",
            Self::Separate => "OFS",
        }
    }
}

impl fmt::Display for FsDiv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FsDiv {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CFS" => Ok(Self::Consolidated),
            "OFS" => Ok(Self::Separate),
            _ => Err(DartError::InvalidInput(
                "fs_div must be CFS or OFS".to_string(),
            )),
        }
    }
}

/// Statement category tag (`sj_div`) on a financial-statement row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SjDiv {
    /// Balance sheet.
    #[serde(rename = "BS")]
    BalanceSheet,
    /// Income statement.
    #[serde(rename = "IS")]
    IncomeStatement,
    /// Statement of comprehensive income.
    #[serde(rename = "CIS")]
    ComprehensiveIncome,
    /// Statement of changes in equity.
    #[serde(rename = "SCE")]
    EquityChanges,
    /// Cash flow statement.
    #[serde(rename = "CF")]
    CashFlow,
}

impl SjDiv {
    /// The five consolidated statement categories, in disclosure order.
    pub const ALL: [Self; 5] = [
        Self::BalanceSheet,
        Self::IncomeStatement,
        Self::ComprehensiveIncome,
        Self::EquityChanges,
        Self::CashFlow,
    ];

    /// Returns the wire code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "BS",
            Self::IncomeStatement => "IS",
            Self::ComprehensiveIncome => "CIS",
            Self::EquityChanges => "SCE",
            Self::CashFlow => "CF",
        }
    }

    /// Parses a wire code case-insensitively, returning `None` for unknown tags.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|div| div.as_str() == upper)
    }

    /// Deduplicates and orders codes by their wire representation.
    #[must_use]
    pub fn sorted(divs: impl IntoIterator<Item = Self>) -> Vec<Self> {
        let mut out: Vec<Self> = divs.into_iter().collect();
        out.sort_by_key(|div| div.as_str());
        out.dedup();
        out
    }
}

impl fmt::Display for SjDiv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SjDiv {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            DartError::InvalidInput("sj_div must be one of BS/IS/CIS/SCE/CF".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_code_parse() {
        assert_eq!("11011".parse::<ReportCode>().unwrap(), ReportCode::Annual);
        assert_eq!(" 11014 ".parse::<ReportCode>().unwrap(), ReportCode::ThirdQuarter);
        assert!("11015".parse::<ReportCode>().is_err());
    }

    #[test]
    fn test_fs_div_case_insensitive() {
        assert_eq!("cfs".parse::<FsDiv>().unwrap(), FsDiv::Consolidated);
        assert_eq!("OFS".parse::<FsDiv>().unwrap(), FsDiv::Separate);
        assert!("XFS".parse::<FsDiv>().is_err());
    }

    #[test]
    fn test_sj_div_sorted_order() {
        let sorted = SjDiv::sorted(SjDiv::ALL);
        let codes: Vec<&str> = sorted.iter().map(SjDiv::as_str).collect();
        assert_eq!(codes, vec!["BS", "CF", "CIS", "IS", "SCE"]);
    }

    #[test]
    fn test_sj_div_serde_uses_wire_codes() {
        let json = serde_json::to_string(&SjDiv::EquityChanges).unwrap();
        assert_eq!(json, "\"SCE\"");
        assert_eq!(SjDiv::parse("cis"), Some(SjDiv::ComprehensiveIncome));
        assert_eq!(SjDiv::parse("DCF"), None);
    }
}
