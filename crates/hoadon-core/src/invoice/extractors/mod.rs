//! Field extractors, one per document type.

mod electricity;
mod momo;
mod traditional;

pub use electricity::ElectricityExtractor;
pub use momo::MomoExtractor;
pub use traditional::TraditionalExtractor;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::invoice::InvoiceRecord;

use super::classifier::DocumentType;
use super::rules::AmountTable;

/// Per-call state shared by the extraction stages.
#[derive(Debug)]
pub struct ExtractionContext<'a> {
    /// Raw OCR text.
    pub text: &'a str,
    /// Lowercased OCR text.
    pub lower: &'a str,
    /// Stands in for "now" (default dates, generated codes).
    pub reference_time: NaiveDateTime,
    /// Absorbed extraction errors, in the order they occurred.
    pub issues: Vec<ExtractionError>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(text: &'a str, lower: &'a str, reference_time: NaiveDateTime) -> Self {
        Self {
            text,
            lower,
            reference_time,
            issues: Vec::new(),
        }
    }

    /// Record an absorbed error.
    pub fn note(&mut self, issue: ExtractionError) {
        debug!("{}", issue);
        self.issues.push(issue);
    }

    /// Run the amount normalizer and store the total on the record.
    pub fn apply_amount(&mut self, table: &AmountTable, record: &mut InvoiceRecord) {
        match table.resolve(self.text, &mut self.issues) {
            Some(found) => record.set_total(found.value),
            None => self.note(ExtractionError::NoPatternMatch {
                field: "total_amount",
            }),
        }
    }
}

/// Populates an [`InvoiceRecord`] for one document type.
pub trait DocumentExtractor: Sync {
    /// The document type this extractor handles.
    fn document_type(&self) -> DocumentType;

    /// Fill the record's fields from the context's text.
    fn extract(&self, ctx: &mut ExtractionContext<'_>, record: &mut InvoiceRecord);
}

static EXTRACTORS: [&dyn DocumentExtractor; 3] =
    [&MomoExtractor, &ElectricityExtractor, &TraditionalExtractor];

/// Look up the extractor registered for a document type.
pub fn extractor_for(doc_type: DocumentType) -> &'static dyn DocumentExtractor {
    EXTRACTORS
        .iter()
        .copied()
        .find(|e| e.document_type() == doc_type)
        .unwrap_or(&TraditionalExtractor)
}
