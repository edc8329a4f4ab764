#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use timetable_cache::api::WeekId;
use timetable_cache::source::{DocumentSource, SourceError};

/// One `<My>` row of a weekly document.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub date: &'static str,
    pub lesson: u32,
    pub subgroup: u32,
    pub subject: &'static str,
    pub teacher: &'static str,
    pub groups: Vec<&'static str>,
    pub replacement: &'static str,
}

impl Row {
    pub fn new(date: &'static str, lesson: u32, subject: &'static str, teacher: &'static str) -> Self {
        Self {
            date,
            lesson,
            subject,
            teacher,
            replacement: "0",
            ..Default::default()
        }
    }

    pub fn groups(mut self, groups: &[&'static str]) -> Self {
        self.groups = groups.to_vec();
        self
    }

    pub fn subgroup(mut self, subgroup: u32) -> Self {
        self.subgroup = subgroup;
        self
    }

    pub fn replacement(mut self) -> Self {
        self.replacement = "1";
        self
    }

    fn to_xml(&self) -> String {
        let groups: String = self
            .groups
            .iter()
            .map(|g| format!("<SPGRUP.NAIM>{}</SPGRUP.NAIM>", g))
            .collect();
        format!(
            "<My><DAT>{}T00:00:00</DAT><UR>{}</UR><IDGG>{}</IDGG>\
             <SPPRED.NAIM>{}</SPPRED.NAIM><FAMIO>{}</FAMIO>{}<ZAM>{}</ZAM></My>",
            self.date,
            self.lesson,
            self.subgroup,
            self.subject,
            self.teacher,
            groups,
            self.replacement
        )
    }
}

/// Render rows as a weekly document.
pub fn document(rows: &[Row]) -> Vec<u8> {
    document_with_raw(rows, "")
}

/// Render rows followed by verbatim markup inside the root element.
pub fn document_with_raw(rows: &[Row], raw: &str) -> Vec<u8> {
    let body: String = rows.iter().map(Row::to_xml).collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?><root>{}{}</root>",
        body, raw
    )
    .into_bytes()
}

/// Scripted document source. Weeks without a script fail with 404.
#[derive(Default)]
pub struct MockSource {
    documents: Mutex<BTreeMap<u32, Result<Vec<u8>, u16>>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, week: u32, body: Vec<u8>) {
        self.documents.lock().insert(week, Ok(body));
    }

    pub fn fail(&self, week: u32, status: u16) {
        self.documents.lock().insert(week, Err(status));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    async fn fetch_week(&self, week: WeekId) -> Result<Vec<u8>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.documents.lock().get(&week.value()) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(SourceError::Status(*status)),
            None => Err(SourceError::Status(404)),
        }
    }
}
