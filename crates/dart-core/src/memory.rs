//! In-memory disclosure source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::trace;

use crate::{
    error::{DartError, Result},
    provider::{
        ApiEnvelope, CompanyOverview, DisclosureSource, FilingList, FilingsQuery,
        STATUS_NO_DATA, STATUS_SUCCESS, StatementList,
    },
    types::{CorpCode, CorporateRecord, StatementKey, StatementRow, yyyymmdd},
};

/// What the corp-code endpoint should answer.
#[derive(Debug, Clone)]
enum ManifestScript {
    Records(Vec<CorporateRecord>),
    Raw(Vec<u8>),
    Fail(DartError),
}

/// Scripted [`DisclosureSource`] for tests and offline development.
///
/// The corp-code archive is synthesised from the configured records in the
/// same zip-of-XML layout OpenDART serves. Unknown statement keys answer with
/// the "no data" status. Every upstream call is counted.
#[derive(Debug)]
pub struct InMemorySource {
    manifest: RwLock<ManifestScript>,
    companies: RwLock<HashMap<CorpCode, ApiEnvelope<CompanyOverview>>>,
    filings: RwLock<HashMap<CorpCode, ApiEnvelope<FilingList>>>,
    statements: RwLock<HashMap<StatementKey, Result<ApiEnvelope<StatementList>>>>,
    last_filings_query: RwLock<Option<FilingsQuery>>,
    archive_calls: AtomicUsize,
    statement_calls: AtomicUsize,
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self {
            manifest: RwLock::new(ManifestScript::Records(Vec::new())),
            companies: RwLock::default(),
            filings: RwLock::default(),
            statements: RwLock::default(),
            last_filings_query: RwLock::default(),
            archive_calls: AtomicUsize::new(0),
            statement_calls: AtomicUsize::new(0),
        }
    }
}

impl InMemorySource {
    /// Creates a source with an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves a manifest built from these records.
    #[must_use]
    pub fn with_corporations(mut self, records: Vec<CorporateRecord>) -> Self {
        *self.manifest.get_mut() = ManifestScript::Records(records);
        self
    }

    /// Serves a successful company lookup.
    #[must_use]
    pub fn with_company(mut self, corp_code: CorpCode, overview: CompanyOverview) -> Self {
        self.companies
            .get_mut()
            .insert(corp_code, ApiEnvelope::new(STATUS_SUCCESS, "정상", overview));
        self
    }

    /// Serves a filings list.
    #[must_use]
    pub fn with_filings(mut self, corp_code: CorpCode, filings: ApiEnvelope<FilingList>) -> Self {
        self.filings.get_mut().insert(corp_code, filings);
        self
    }

    /// Serves a successful statement lookup with these rows.
    #[must_use]
    pub fn with_statements(mut self, key: StatementKey, rows: Vec<StatementRow>) -> Self {
        self.statements.get_mut().insert(
            key,
            Ok(ApiEnvelope::new(STATUS_SUCCESS, "정상", StatementList { list: rows })),
        );
        self
    }

    /// Replaces the manifest records.
    pub async fn set_corporations(&self, records: Vec<CorporateRecord>) {
        *self.manifest.write().await = ManifestScript::Records(records);
    }

    /// Serves these bytes verbatim as the corp-code archive.
    pub async fn set_raw_archive(&self, bytes: Vec<u8>) {
        *self.manifest.write().await = ManifestScript::Raw(bytes);
    }

    /// Makes the corp-code download fail.
    pub async fn fail_manifest(&self, error: DartError) {
        *self.manifest.write().await = ManifestScript::Fail(error);
    }

    /// Scripts the outcome of one statement lookup.
    pub async fn set_statement_response(
        &self,
        key: StatementKey,
        response: Result<ApiEnvelope<StatementList>>,
    ) {
        self.statements.write().await.insert(key, response);
    }

    /// Number of corp-code downloads served.
    #[must_use]
    pub fn archive_calls(&self) -> usize {
        self.archive_calls.load(Ordering::SeqCst)
    }

    /// Number of statement lookups served.
    #[must_use]
    pub fn statement_calls(&self) -> usize {
        self.statement_calls.load(Ordering::SeqCst)
    }

    /// The most recent filings query received.
    pub async fn last_filings_query(&self) -> Option<FilingsQuery> {
        self.last_filings_query.read().await.clone()
    }
}

#[async_trait]
impl DisclosureSource for InMemorySource {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn corp_code_archive(&self) -> Result<Vec<u8>> {
        self.archive_calls.fetch_add(1, Ordering::SeqCst);
        trace!("InMemorySource: serving corp-code archive");
        match &*self.manifest.read().await {
            ManifestScript::Records(records) => {
                zip_single_file("CORPCODE.xml", manifest_xml(records).as_bytes())
            }
            ManifestScript::Raw(bytes) => Ok(bytes.clone()),
            ManifestScript::Fail(error) => Err(error.clone()),
        }
    }

    async fn company(&self, corp_code: &CorpCode) -> Result<ApiEnvelope<CompanyOverview>> {
        Ok(self
            .companies
            .read()
            .await
            .get(corp_code)
            .cloned()
            .unwrap_or_else(|| {
                ApiEnvelope::new(STATUS_NO_DATA, "조회된 데이타가 없습니다.", CompanyOverview::default())
            }))
    }

    async fn filings(&self, query: &FilingsQuery) -> Result<ApiEnvelope<FilingList>> {
        *self.last_filings_query.write().await = Some(query.clone());
        Ok(self
            .filings
            .read()
            .await
            .get(&query.corp_code)
            .cloned()
            .unwrap_or_else(|| {
                ApiEnvelope::new(STATUS_NO_DATA, "조회된 데이타가 없습니다.", FilingList::default())
            }))
    }

    async fn statements(&self, key: &StatementKey) -> Result<ApiEnvelope<StatementList>> {
        self.statement_calls.fetch_add(1, Ordering::SeqCst);
        trace!(key = %key, "InMemorySource: serving statements");
        self.statements
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_else(|| {
                Ok(ApiEnvelope::new(
                    STATUS_NO_DATA,
                    "조회된 데이타가 없습니다.",
                    StatementList::default(),
                ))
            })
    }
}

/// Renders records in the corp-code manifest XML layout.
#[must_use]
pub fn manifest_xml(records: &[CorporateRecord]) -> String {
    use quick_xml::escape::escape;

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<result>\n");
    for record in records {
        let modify_date = record.modify_date.map(yyyymmdd::format).unwrap_or_default();
        xml.push_str(&format!(
            "  <list>\n    <corp_code>{}</corp_code>\n    <corp_name>{}</corp_name>\n    <stock_code>{}</stock_code>\n    <modify_date>{}</modify_date>\n  </list>\n",
            escape(record.corp_code.as_str()),
            escape(record.corp_name.as_str()),
            escape(record.stock_code.as_str()),
            modify_date,
        ));
    }
    xml.push_str("</result>\n");
    xml
}

/// Packs one file into an in-memory zip archive.
pub fn zip_single_file(name: &str, contents: &[u8]) -> Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, zip::write::SimpleFileOptions::default())
        .map_err(|e| DartError::Parse(format!("zip write error: {e}")))?;
    writer
        .write_all(contents)
        .map_err(|e| DartError::Parse(format!("zip write error: {e}")))?;
    let cursor = writer
        .finish()
        .map_err(|e| DartError::Parse(format!("zip write error: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{FsDiv, ReportCode};

    fn samsung() -> CorporateRecord {
        CorporateRecord::new(
            "005930".parse().unwrap(),
            CorpCode::new("00126380").unwrap(),
            "삼성전자 & Co",
            yyyymmdd::parse("20230110"),
        )
    }

    #[test]
    fn test_manifest_xml_escapes_names() {
        let xml = manifest_xml(&[samsung()]);
        assert!(xml.contains("<corp_name>삼성전자 &amp; Co</corp_name>"));
        assert!(xml.contains("<modify_date>20230110</modify_date>"));
    }

    #[tokio::test]
    async fn test_unknown_statement_key_is_no_data() {
        let source = InMemorySource::new();
        let key = StatementKey {
            corp_code: CorpCode::new("00126380").unwrap(),
            bsns_year: "2023".parse().unwrap(),
            reprt_code: ReportCode::Annual,
            fs_div: FsDiv::Consolidated,
        };
        let envelope = source.statements(&key).await.unwrap();
        assert_eq!(envelope.status, STATUS_NO_DATA);
        assert_eq!(source.statement_calls(), 1);
    }

    #[tokio::test]
    async fn test_manifest_failure_is_scripted() {
        let source = InMemorySource::new().with_corporations(vec![samsung()]);
        assert!(source.corp_code_archive().await.is_ok());
        source
            .fail_manifest(DartError::Network("connection reset".to_string()))
            .await;
        assert!(matches!(
            source.corp_code_archive().await,
            Err(DartError::Network(_))
        ));
        assert_eq!(source.archive_calls(), 2);
    }
}
