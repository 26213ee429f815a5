//! Document numbering: `PREFIX/FY/NNN`, counted per document type and
//! April-March financial year.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use parking_lot::Mutex;

use crate::error::Error;
use crate::model::DocumentType;

/// Financial year containing `date`, e.g. `2024-2025` for any date from
/// 1 April 2024 to 31 March 2025.
pub fn financial_year(date: NaiveDate) -> String {
    let start = if date.month() >= 4 { date.year() } else { date.year() - 1 };
    format!("{}-{}", start, start + 1)
}

pub fn format_document_number(doc_type: DocumentType, financial_year: &str, sequence: u32) -> String {
    format!("{}/{}/{:03}", doc_type.number_prefix(), financial_year, sequence)
}

/// Hands out the next document number for a type and date.
pub trait NumberAllocator {
    fn next_number(&self, doc_type: DocumentType, date: NaiveDate) -> Result<String, Error>;
}

/// Process-local counters, one per (type, financial year). Numbers restart at
/// 1 whenever a new financial year is seen.
#[derive(Debug, Default)]
pub struct InMemoryCounter {
    counters: Mutex<HashMap<(DocumentType, String), u32>>,
}

impl InMemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume numbering after `last` for the given type and year.
    pub fn seed(&self, doc_type: DocumentType, financial_year: &str, last: u32) {
        self.counters
            .lock()
            .insert((doc_type, financial_year.to_string()), last);
    }
}

impl NumberAllocator for InMemoryCounter {
    fn next_number(&self, doc_type: DocumentType, date: NaiveDate) -> Result<String, Error> {
        let fy = financial_year(date);
        let seq = {
            let mut counters = self.counters.lock();
            let slot = counters.entry((doc_type, fy.clone())).or_insert(0);
            *slot += 1;
            *slot
        };
        let number = format_document_number(doc_type, &fy, seq);
        log::debug!("allocated {number}");
        Ok(number)
    }
}
