//! Core data types for disclosure lookups.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Ticker`] - 6-digit listed stock code
//! - [`CorpCode`] - 8-digit OpenDART corporate identifier
//! - [`BusinessYear`] - 4-digit fiscal year
//! - [`CorporateRecord`] - one entry of the corp-code manifest
//! - [`StatementKey`] - composite key of a financial-statement result set
//! - [`StatementRow`] - opaque financial-statement line item

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::codes::{FsDiv, ReportCode, SjDiv};
use crate::error::DartError;

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// A listed stock code (exactly six ASCII digits).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_digits(s, 6) {
            Ok(Self(s.to_string()))
        } else {
            Err(DartError::InvalidInput(
                "stock_code must be 6 digits".to_string(),
            ))
        }
    }
}

impl TryFrom<String> for Ticker {
    type Error = DartError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An OpenDART corporate identifier (exactly eight characters).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpCode(String);

impl CorpCode {
    /// Wraps an identifier, returning `None` unless it is eight characters long.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Option<Self> {
        let s = s.into();
        (s.chars().count() == 8).then_some(Self(s))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A business (fiscal) year, always four ASCII digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessYear(String);

impl BusinessYear {
    /// Returns the year as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BusinessYear {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_digits(s, 4) {
            Ok(Self(s.to_string()))
        } else {
            Err(DartError::InvalidInput(
                "bsns_year(YYYY) required for op=fnltt_all".to_string(),
            ))
        }
    }
}

impl fmt::Display for BusinessYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One listed company from the corp-code manifest.
///
/// Records are created wholesale on each manifest refresh and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateRecord {
    /// Listed stock code.
    pub stock_code: Ticker,
    /// OpenDART corporate identifier.
    pub corp_code: CorpCode,
    /// Registered company name.
    pub corp_name: String,
    /// Date the upstream record was last modified, if it parsed.
    #[serde(with = "yyyymmdd")]
    pub modify_date: Option<NaiveDate>,
}

impl CorporateRecord {
    /// Creates a record from already-validated identifiers.
    #[must_use]
    pub fn new(
        stock_code: Ticker,
        corp_code: CorpCode,
        corp_name: impl Into<String>,
        modify_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            stock_code,
            corp_code,
            corp_name: corp_name.into(),
            modify_date,
        }
    }
}

/// Composite cache key of one financial-statement result set.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatementKey {
    /// Corporate identifier.
    pub corp_code: CorpCode,
    /// Business year.
    pub bsns_year: BusinessYear,
    /// Report selector.
    pub reprt_code: ReportCode,
    /// Consolidation selector.
    pub fs_div: FsDiv,
}

impl fmt::Display for StatementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.corp_code, self.bsns_year, self.reprt_code, self.fs_div
        )
    }
}

/// A single financial-statement line item, passed through unmodified.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementRow(Map<String, Value>);

impl StatementRow {
    /// Returns the raw `sj_div` tag, or an empty string when absent.
    #[must_use]
    pub fn sj_div_raw(&self) -> &str {
        self.0.get("sj_div").and_then(Value::as_str).unwrap_or("")
    }

    /// Returns the statement category when the tag is a known code.
    #[must_use]
    pub fn sj_div(&self) -> Option<SjDiv> {
        SjDiv::parse(self.sj_div_raw())
    }

    /// Returns the underlying fields.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for StatementRow {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// `YYYYMMDD` (de)serialization for optional dates.
pub mod yyyymmdd {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y%m%d";

    /// Parses a `YYYYMMDD` string, returning `None` when it is blank or invalid.
    #[must_use]
    pub fn parse(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), FORMAT).ok()
    }

    /// Formats a date as `YYYYMMDD`.
    #[must_use]
    pub fn format(date: NaiveDate) -> String {
        date.format(FORMAT).to_string()
    }

    /// Serializes an optional date as `YYYYMMDD` or an empty string.
    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&format(*d)),
            None => serializer.serialize_str(""),
        }
    }

    /// Deserializes a `YYYYMMDD` string into an optional date.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(parse(&s))
    }
}
