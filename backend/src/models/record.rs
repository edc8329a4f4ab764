// ============================================================================
// Source Document Parsing
// ============================================================================
//
// A weekly source document is an XML file with one `<My>` element per lesson
// row, at any depth. The document is scanned with a streaming reader and each
// row is deserialized on its own into an explicit schema where every field is
// optional, then normalized into `RawRecord`s and classified into
// `LessonCandidate`s. A row that fails to deserialize or has no usable date is
// dropped; every other field falls back to its default. Only a document that
// is not well-formed as a whole is an error.

use crate::api::LessonStatus;
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

/// Substring (upper-cased) that marks a lesson as cancelled.
pub const CANCELLATION_MARKER: &str = "ОТМЕНА";

/// Subject text used for every resolved cancellation.
pub const CANCELLATION_LABEL: &str = "ОТМЕНА";

/// Replacement marker value meaning "no replacement".
pub const NO_REPLACEMENT: &str = "0";

/// Errors that make a whole document unusable.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Malformed XML document: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Element name of one lesson row.
const ROW_TAG: &[u8] = b"My";

#[derive(Deserialize, Default)]
struct SourceRow {
    #[serde(rename = "DAT", default)]
    date: Option<String>,
    #[serde(rename = "UR", default)]
    lesson_number: Option<String>,
    #[serde(rename = "IDGG", default)]
    subgroup: Option<String>,
    #[serde(rename = "SPPRED.NAIM", default)]
    subject: Option<String>,
    #[serde(rename = "FAMIO", default)]
    teacher: Option<String>,
    #[serde(rename = "SPGRUP.NAIM", default)]
    groups: Vec<String>,
    #[serde(rename = "ZAM", default)]
    replacement: Option<String>,
}

/// One normalized source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub lesson_number: i32,
    pub subgroup: i32,
    pub subject: String,
    pub teacher: String,
    pub groups: Vec<String>,
    pub replacement_marker: String,
}

impl RawRecord {
    fn from_row(row: SourceRow) -> Option<Self> {
        let date = parse_record_date(row.date.as_deref()?)?;
        Some(Self {
            date,
            lesson_number: parse_int_or_zero(row.lesson_number.as_deref()),
            subgroup: parse_int_or_zero(row.subgroup.as_deref()),
            subject: trimmed(row.subject),
            teacher: trimmed(row.teacher),
            groups: row
                .groups
                .iter()
                .map(|g| g.trim())
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect(),
            replacement_marker: row
                .replacement
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| NO_REPLACEMENT.to_string()),
        })
    }
}

/// A record's contribution to a timetable cell before conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCandidate {
    pub date: NaiveDate,
    pub lesson_number: i32,
    pub subgroup: i32,
    pub subject: String,
    pub teacher: String,
    pub status: LessonStatus,
    pub group_list: Vec<String>,
    /// Filled only by the resolver.
    pub original_subject: Option<String>,
    /// Whether this single record names several groups. Not authoritative.
    pub stream_hint: bool,
}

impl From<RawRecord> for LessonCandidate {
    fn from(record: RawRecord) -> Self {
        let status = classify_status(&record.subject, &record.replacement_marker);
        Self {
            date: record.date,
            lesson_number: record.lesson_number,
            subgroup: record.subgroup,
            stream_hint: record.groups.len() > 1,
            subject: record.subject,
            teacher: record.teacher,
            status,
            group_list: record.groups,
            original_subject: None,
        }
    }
}

/// Result of parsing one document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Candidates in source encounter order.
    pub candidates: Vec<LessonCandidate>,
    /// Rows dropped as malformed or for lack of a usable date.
    pub dropped: usize,
}

/// Parse a raw weekly document into lesson candidates.
pub fn parse_document(content: &[u8]) -> Result<ParsedDocument, DocumentError> {
    let text = std::str::from_utf8(content)?;
    let mut reader = Reader::from_str(text);
    let mut parsed = ParsedDocument::default();

    loop {
        match reader.read_event()? {
            Event::Start(start) if start.local_name().as_ref() == ROW_TAG => {
                let span = reader.read_to_end(start.name())?;
                let inner = &text[span.start as usize..span.end as usize];
                match parse_row(inner) {
                    Some(record) => parsed.candidates.push(record.into()),
                    None => parsed.dropped += 1,
                }
            }
            // A self-closed row carries no date.
            Event::Empty(start) if start.local_name().as_ref() == ROW_TAG => {
                parsed.dropped += 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(parsed)
}

/// Deserialize the content of one `<My>` element.
fn parse_row(inner: &str) -> Option<RawRecord> {
    let xml = format!("<My>{}</My>", inner);
    match quick_xml::de::from_str::<SourceRow>(&xml) {
        Ok(row) => RawRecord::from_row(row),
        Err(e) => {
            log::debug!("Dropping malformed row: {}", e);
            None
        }
    }
}

/// Cancellation wins over the replacement marker.
pub fn classify_status(subject: &str, replacement_marker: &str) -> LessonStatus {
    if is_cancellation_text(subject) {
        LessonStatus::Cancellation
    } else if replacement_marker != NO_REPLACEMENT {
        LessonStatus::Replacement
    } else {
        LessonStatus::Ok
    }
}

pub fn is_cancellation_text(subject: &str) -> bool {
    subject.trim().to_uppercase().contains(CANCELLATION_MARKER)
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn parse_int_or_zero(value: Option<&str>) -> i32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> ParsedDocument {
        parse_document(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_full_row() {
        let parsed = parse(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <root>
              <My>
                <DAT>2024-09-02T00:00:00</DAT>
                <UR>2</UR>
                <IDGG>1</IDGG>
                <SPPRED.NAIM> Физика </SPPRED.NAIM>
                <FAMIO>Иванов И.И.</FAMIO>
                <SPGRUP.NAIM>101</SPGRUP.NAIM>
                <SPGRUP.NAIM>102</SPGRUP.NAIM>
                <ZAM>0</ZAM>
              </My>
            </root>"#,
        );
        assert_eq!(parsed.dropped, 0);
        assert_eq!(parsed.candidates.len(), 1);
        let c = &parsed.candidates[0];
        assert_eq!(c.date, NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
        assert_eq!(c.lesson_number, 2);
        assert_eq!(c.subgroup, 1);
        assert_eq!(c.subject, "Физика");
        assert_eq!(c.teacher, "Иванов И.И.");
        assert_eq!(c.group_list, vec!["101", "102"]);
        assert_eq!(c.status, LessonStatus::Ok);
        assert!(c.stream_hint);
        assert!(c.original_subject.is_none());
    }

    #[test]
    fn test_missing_date_is_dropped() {
        let parsed = parse(
            r#"<root>
              <My><UR>1</UR><SPPRED.NAIM>A</SPPRED.NAIM></My>
              <My><DAT>not a date</DAT><UR>1</UR></My>
              <My><DAT>2024-09-03</DAT><UR>1</UR></My>
            </root>"#,
        );
        assert_eq!(parsed.dropped, 2);
        assert_eq!(parsed.candidates.len(), 1);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let parsed = parse(r#"<root><My><DAT>2024-09-03</DAT><UR>x</UR></My></root>"#);
        let c = &parsed.candidates[0];
        assert_eq!(c.lesson_number, 0);
        assert_eq!(c.subgroup, 0);
        assert_eq!(c.subject, "");
        assert_eq!(c.teacher, "");
        assert!(c.group_list.is_empty());
        assert_eq!(c.status, LessonStatus::Ok);
    }

    #[test]
    fn test_preserves_encounter_order() {
        let parsed = parse(
            r#"<root>
              <My><DAT>2024-09-03</DAT><UR>3</UR></My>
              <My><DAT>2024-09-02</DAT><UR>1</UR></My>
              <My><DAT>2024-09-03</DAT><UR>2</UR></My>
            </root>"#,
        );
        let numbers: Vec<i32> = parsed.candidates.iter().map(|c| c.lesson_number).collect();
        assert_eq!(numbers, vec![3, 1, 2]);
    }

    #[test]
    fn test_classify_status_order() {
        assert_eq!(classify_status("отмена занятия", "1"), LessonStatus::Cancellation);
        assert_eq!(classify_status("Химия", "5"), LessonStatus::Replacement);
        assert_eq!(classify_status("Химия", "0"), LessonStatus::Ok);
    }

    #[test]
    fn test_blank_group_names_are_ignored() {
        let parsed = parse(
            r#"<root><My><DAT>2024-09-03</DAT><SPGRUP.NAIM></SPGRUP.NAIM><SPGRUP.NAIM>201</SPGRUP.NAIM></My></root>"#,
        );
        assert_eq!(parsed.candidates[0].group_list, vec!["201"]);
        assert!(!parsed.candidates[0].stream_hint);
    }

    #[test]
    fn test_empty_document() {
        let parsed = parse("<root></root>");
        assert!(parsed.candidates.is_empty());
        assert_eq!(parsed.dropped, 0);
    }

    #[test]
    fn test_malformed_row_does_not_spoil_document() {
        let parsed = parse(
            r#"<root>
              <My><DAT>2024-09-02</DAT><UR>1</UR><SPPRED.NAIM>Физика</SPPRED.NAIM></My>
              <My><DAT>2024-09-02</DAT><DAT>2024-09-03</DAT><UR>1</UR></My>
            </root>"#,
        );
        assert_eq!(parsed.candidates.len(), 1);
        assert_eq!(parsed.dropped, 1);
        assert_eq!(parsed.candidates[0].subject, "Физика");
    }

    #[test]
    fn test_repeated_field_and_nested_markup_rows_are_dropped() {
        let parsed = parse(
            r#"<root>
              <My><DAT>2024-09-02</DAT><UR>1</UR><UR>2</UR></My>
              <My><DAT>2024-09-02</DAT><UR>3</UR></My>
              <My><DAT>2024-09-02</DAT><SPPRED.NAIM><b>x</b></SPPRED.NAIM></My>
              <My/>
            </root>"#,
        );
        assert_eq!(parsed.dropped, 3);
        let numbers: Vec<i32> = parsed.candidates.iter().map(|c| c.lesson_number).collect();
        assert_eq!(numbers, vec![3]);
    }

    #[test]
    fn test_rows_found_at_any_depth() {
        let parsed = parse(
            r#"<root>
              <data><My><DAT>2024-09-02</DAT><UR>1</UR></My></data>
              <My><DAT>2024-09-02</DAT><UR>2</UR></My>
            </root>"#,
        );
        let numbers: Vec<i32> = parsed.candidates.iter().map(|c| c.lesson_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_truncated_document_is_an_error() {
        let result = parse_document(b"<root><My><DAT>2024-09-02");
        assert!(matches!(result, Err(DocumentError::Xml(_))));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let result = parse_document(&[0x3c, 0xff, 0xfe]);
        assert!(matches!(result, Err(DocumentError::Encoding(_))));
    }
}
