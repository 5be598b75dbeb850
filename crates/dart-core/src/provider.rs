//! Upstream disclosure source trait and response envelopes.
//!
//! OpenDART answers HTTP 200 even when a call fails; the real outcome is the
//! embedded `status`/`message` pair carried by every [`ApiEnvelope`].
//! [`DartStatus`] translates that pair into the proxy's own taxonomy.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::{
    error::{DartError, Result},
    types::{CorpCode, StatementKey, StatementRow},
};

/// Embedded status code meaning success.
pub const STATUS_SUCCESS: &str = "000";

/// Embedded status code meaning "no data found".
pub const STATUS_NO_DATA: &str = "013";

/// Classification of an embedded upstream status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DartStatus {
    /// `000`.
    Success,
    /// `013`: the query matched nothing.
    NoData,
    /// Any other code.
    Failure,
}

impl DartStatus {
    /// Classifies a raw status code.
    #[must_use]
    pub fn classify(code: &str) -> Self {
        match code.trim() {
            STATUS_SUCCESS => Self::Success,
            STATUS_NO_DATA => Self::NoData,
            _ => Self::Failure,
        }
    }
}

/// Response wrapper shared by every OpenDART JSON endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Embedded status code.
    #[serde(default)]
    pub status: String,
    /// Embedded human-readable message.
    #[serde(default)]
    pub message: String,
    /// Endpoint-specific payload.
    #[serde(flatten)]
    pub body: T,
}

impl<T> ApiEnvelope<T> {
    /// Wraps a payload with the given status pair.
    pub fn new(status: impl Into<String>, message: impl Into<String>, body: T) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            body,
        }
    }

    /// Returns the classified status.
    #[must_use]
    pub fn dart_status(&self) -> DartStatus {
        DartStatus::classify(&self.status)
    }

    /// Fails with [`DartError::Upstream`] unless the status is accepted.
    ///
    /// `000` is always accepted; `013` only when `allow_no_data` is set.
    pub fn ensure_ok(&self, allow_no_data: bool) -> Result<()> {
        match self.dart_status() {
            DartStatus::Success => Ok(()),
            DartStatus::NoData if allow_no_data => Ok(()),
            _ => Err(DartError::Upstream {
                status: self.status.clone(),
                message: self.message.clone(),
            }),
        }
    }
}

/// Payload of `company.json`. Only the fields the proxy surfaces are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyOverview {
    /// Company name.
    #[serde(default)]
    pub corp_name: Option<String>,
    /// Fiscal closing month.
    #[serde(default)]
    pub acc_mt: Option<String>,
}

/// Payload of `list.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingList {
    /// Filings on the requested page.
    #[serde(default)]
    pub list: Vec<FilingSummary>,
}

/// A single filing from `list.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingSummary {
    /// Receipt number.
    #[serde(default)]
    pub rcept_no: Option<String>,
    /// Receipt date (`YYYYMMDD`).
    #[serde(default)]
    pub rcept_dt: Option<String>,
    /// Report title.
    #[serde(default)]
    pub report_nm: Option<String>,
    /// Company name.
    #[serde(default)]
    pub corp_name: Option<String>,
    /// Stock code.
    #[serde(default)]
    pub stock_code: Option<String>,
    /// Business year.
    #[serde(default)]
    pub bsns_year: Option<String>,
    /// Disclosure type.
    #[serde(default)]
    pub pblntf_ty: Option<String>,
    /// Disclosure detail type.
    #[serde(default)]
    pub pblntf_detail_ty: Option<String>,
}

/// Payload of `fnlttSinglAcntAll.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementList {
    /// Every line item of the requested report.
    #[serde(default)]
    pub list: Vec<StatementRow>,
}

/// Parameters of a filings-list lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilingsQuery {
    /// Corporate identifier.
    pub corp_code: CorpCode,
    /// First receipt date (inclusive).
    pub begin: NaiveDate,
    /// Last receipt date (inclusive).
    pub end: NaiveDate,
    /// Disclosure type (`pblntf_ty`).
    pub disclosure_type: &'static str,
    /// Disclosure detail type (`pblntf_detail_ty`), when locked.
    pub detail_type: Option<&'static str>,
    /// Page size requested from upstream.
    pub page_count: u32,
}

/// An upstream disclosure service.
///
/// Implemented over HTTP by `dart-opendart` and in memory by
/// [`InMemorySource`](crate::memory::InMemorySource) for tests.
#[async_trait]
pub trait DisclosureSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "OpenDART").
    fn name(&self) -> &str;

    /// Downloads the zipped corp-code manifest.
    async fn corp_code_archive(&self) -> Result<Vec<u8>>;

    /// Looks up company details.
    async fn company(&self, corp_code: &CorpCode) -> Result<ApiEnvelope<CompanyOverview>>;

    /// Lists filings for a company.
    async fn filings(&self, query: &FilingsQuery) -> Result<ApiEnvelope<FilingList>>;

    /// Fetches every financial-statement line item for one report.
    async fn statements(&self, key: &StatementKey) -> Result<ApiEnvelope<StatementList>>;
}
