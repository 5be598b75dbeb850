#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! OpenDART data source.
//!
//! # Example
//!
//! ```no_run
//! use dart_opendart::OpenDartClient;
//! use dart_core::{CorpCode, DisclosureSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenDartClient::new("your_api_key")?;
//!
//!     let corp_code = CorpCode::new("00126380").ok_or("bad corp code")?;
//!     let company = client.company(&corp_code).await?;
//!     println!("{} closes its books in month {:?}", company.status, company.body.acc_mt);
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use dart_core::types::yyyymmdd;
use dart_core::{
    ApiEnvelope, CompanyOverview, CorpCode, DartError, DisclosureSource, FilingList,
    FilingsQuery, Result, StatementKey, StatementList,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// OpenDART API root.
pub const OPENDART_BASE_URL: &str = "https://opendart.fss.or.kr";

/// Upper bound on every upstream request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CORP_CODE_PATH: &str = "/api/corpCode.xml";
const COMPANY_PATH: &str = "/api/company.json";
const LIST_PATH: &str = "/api/list.json";
const STATEMENTS_PATH: &str = "/api/fnlttSinglAcntAll.json";

/// OpenDART disclosure API client.
///
/// Requests are never retried; a timeout or transport failure surfaces as
/// [`DartError::Network`].
#[derive(Clone)]
pub struct OpenDartClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for OpenDartClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenDartClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenDartClient {
    /// Create a client with the default 30 second timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DartError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, api_key))
    }

    /// Create a client around a pre-configured reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: OPENDART_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The API root requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, path: &str, params: &[(&str, String)]) -> Result<reqwest::Response> {
        debug!(endpoint = path, "OpenDART request");
        let response = self
            .client
            .get(self.url(path))
            .query(&[("crtfc_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| transport_error(path, &e))?;

        if !response.status().is_success() {
            return Err(DartError::Network(format!(
                "{path}: HTTP {}",
                response.status()
            )));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.send(path, params)
            .await?
            .json()
            .await
            .map_err(|e| DartError::Parse(format!("{path}: {e}")))
    }
}

fn transport_error(path: &str, e: &reqwest::Error) -> DartError {
    if e.is_timeout() {
        DartError::Network(format!(
            "{path}: timed out after {}s",
            REQUEST_TIMEOUT.as_secs()
        ))
    } else {
        DartError::Network(format!("{path}: {e}"))
    }
}

/// Query parameters of a `list.json` call.
fn filings_params(query: &FilingsQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("corp_code", query.corp_code.to_string()),
        ("bgn_de", yyyymmdd::format(query.begin)),
        ("end_de", yyyymmdd::format(query.end)),
        ("last_reprt_at", "Y".to_string()),
        ("pblntf_ty", query.disclosure_type.to_string()),
    ];
    if let Some(detail) = query.detail_type {
        params.push(("pblntf_detail_ty", detail.to_string()));
    }
    params.extend([
        ("sort", "date".to_string()),
        ("sort_mth", "desc".to_string()),
        ("page_no", "1".to_string()),
        ("page_count", query.page_count.to_string()),
    ]);
    params
}

/// Query parameters of a `fnlttSinglAcntAll.json` call.
fn statement_params(key: &StatementKey) -> Vec<(&'static str, String)> {
    vec![
        ("corp_code", key.corp_code.to_string()),
        ("bsns_year", key.bsns_year.to_string()),
        ("reprt_code", key.reprt_code.to_string()),
        ("fs_div", key.fs_div.to_string()),
    ]
}

/// Reads the `<status>`/`<message>` pair OpenDART sends in place of the zip
/// when the manifest request is rejected.
fn embedded_xml_status(body: &[u8]) -> Option<(String, String)> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut current: Option<Vec<u8>> = None;
    let mut status = None;
    let mut message = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => current = Some(e.name().as_ref().to_vec()),
            Ok(Event::Text(t)) => {
                let text = t.unescape().ok()?.into_owned();
                match current.as_deref() {
                    Some(b"status") => status = Some(text),
                    Some(b"message") => message = text,
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
        buf.clear();
    }
    status.map(|s| (s, message))
}

#[async_trait]
impl DisclosureSource for OpenDartClient {
    fn name(&self) -> &str {
        "OpenDART"
    }

    async fn corp_code_archive(&self) -> Result<Vec<u8>> {
        let bytes = self.send(CORP_CODE_PATH, &[]).await?.bytes().await.map_err(|e| {
            transport_error(CORP_CODE_PATH, &e)
        })?;

        // Zip archives start with the local file header signature.
        if !bytes.starts_with(b"PK") {
            if let Some((status, message)) = embedded_xml_status(&bytes) {
                return Err(DartError::Upstream { status, message });
            }
        }
        debug!(bytes = bytes.len(), "Downloaded corp-code archive");
        Ok(bytes.to_vec())
    }

    async fn company(&self, corp_code: &CorpCode) -> Result<ApiEnvelope<CompanyOverview>> {
        self.get_json(COMPANY_PATH, &[("corp_code", corp_code.to_string())])
            .await
    }

    async fn filings(&self, query: &FilingsQuery) -> Result<ApiEnvelope<FilingList>> {
        self.get_json(LIST_PATH, &filings_params(query)).await
    }

    async fn statements(&self, key: &StatementKey) -> Result<ApiEnvelope<StatementList>> {
        self.get_json(STATEMENTS_PATH, &statement_params(key)).await
    }
}

// =============================================================================
// Tests
// =============================================================================
