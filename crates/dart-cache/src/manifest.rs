//! Corp-code manifest parsing.
//!
//! OpenDART publishes every registered company as a zip archive holding a
//! single `CORPCODE.xml` document:
//!
//! ```xml
//! <result>
//!   <list>
//!     <corp_code>00126380</corp_code>
//!     <corp_name>삼성전자</corp_name>
//!     <stock_code>005930</stock_code>
//!     <modify_date>20230110</modify_date>
//!   </list>
//! </result>
//! ```
//!
//! Unlisted companies carry a blank `stock_code` and are skipped.

use dart_core::types::yyyymmdd;
use dart_core::{CorpCode, CorporateRecord, DartError, Result, Ticker};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::debug;

/// Extracts the first `.xml` entry from a zip archive.
pub fn extract_xml(archive: &[u8]) -> Result<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| DartError::CorruptManifest(format!("zip open error: {e}")))?;

    let name = zip
        .file_names()
        .find(|n| n.to_ascii_lowercase().ends_with(".xml"))
        .map(str::to_string)
        .ok_or_else(|| DartError::CorruptManifest("corpCode zip has no XML file".to_string()))?;

    let mut file = zip
        .by_name(&name)
        .map_err(|e| DartError::CorruptManifest(format!("zip entry {name}: {e}")))?;
    let mut buf = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
    file.read_to_end(&mut buf)
        .map_err(|e| DartError::CorruptManifest(format!("zip read error: {e}")))?;
    Ok(buf)
}

#[derive(Clone, Copy)]
enum Field {
    CorpCode,
    CorpName,
    StockCode,
    ModifyDate,
}

#[derive(Default)]
struct PendingRecord {
    corp_code: String,
    corp_name: String,
    stock_code: String,
    modify_date: String,
}

impl PendingRecord {
    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::CorpCode => &mut self.corp_code,
            Field::CorpName => &mut self.corp_name,
            Field::StockCode => &mut self.stock_code,
            Field::ModifyDate => &mut self.modify_date,
        }
    }

    fn into_record(self) -> Option<CorporateRecord> {
        let stock_code = self.stock_code.trim();
        let corp_code = self.corp_code.trim();
        if stock_code.chars().count() != 6 {
            return None;
        }
        let ticker: Ticker = stock_code.parse().ok()?;
        let corp_code = CorpCode::new(corp_code)?;
        Some(CorporateRecord::new(
            ticker,
            corp_code,
            self.corp_name.trim(),
            yyyymmdd::parse(&self.modify_date),
        ))
    }
}

/// Parses manifest XML into records, in document order.
///
/// Only entries with a six-digit stock code and an eight-character corp code
/// are returned.
pub fn parse_records(xml: &[u8]) -> Result<Vec<CorporateRecord>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut pending: Option<PendingRecord> = None;
    let mut field: Option<Field> = None;
    let mut skipped = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"list" => pending = Some(PendingRecord::default()),
                b"corp_code" => field = Some(Field::CorpCode),
                b"corp_name" => field = Some(Field::CorpName),
                b"stock_code" => field = Some(Field::StockCode),
                b"modify_date" => field = Some(Field::ModifyDate),
                _ => field = None,
            },
            Ok(Event::Text(t)) => {
                if let (Some(record), Some(f)) = (pending.as_mut(), field) {
                    let text = t.unescape().map_err(|e| {
                        DartError::CorruptManifest(format!("XML text error: {e}"))
                    })?;
                    record.field_mut(f).push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(record), Some(f)) = (pending.as_mut(), field) {
                    record
                        .field_mut(f)
                        .push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"list" {
                    if let Some(done) = pending.take() {
                        match done.into_record() {
                            Some(record) => records.push(record),
                            None => skipped += 1,
                        }
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DartError::CorruptManifest(format!(
                    "XML parse error at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
        buf.clear();
    }

    debug!(
        listed = records.len(),
        skipped, "Parsed corp-code manifest"
    );
    Ok(records)
}

/// Decompresses and parses a manifest archive into a ticker-keyed map.
///
/// Later entries for the same ticker replace earlier ones. An archive that
/// yields no usable record is rejected as corrupt.
pub fn parse_archive(archive: &[u8]) -> Result<HashMap<Ticker, CorporateRecord>> {
    let xml = extract_xml(archive)?;
    let records = parse_records(&xml)?;

    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        map.insert(record.stock_code.clone(), record);
    }

    if map.is_empty() {
        return Err(DartError::CorruptManifest(
            "corpCode parse produced empty mapping".to_string(),
        ));
    }
    Ok(map)
}
