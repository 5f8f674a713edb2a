//! Invoice field extraction module.
//!
//! Pipeline, executed once per input:
//! classify → extract (pattern tables + amount normalizer) → clean up → score.

pub mod classifier;
pub mod confidence;
mod engine;
pub mod extractors;
pub mod rules;
pub mod validator;

pub use classifier::{classify, DocumentType};
pub use engine::{ExtractionResult, InvoiceEngine, FALLBACK_CONFIDENCE};
pub use validator::Correction;

/// Trait for invoice extractors.
pub trait InvoiceExtractor {
    /// Extract invoice data from OCR text. `filename` only feeds fallback
    /// code generation.
    fn extract(&self, ocr_text: &str, filename: &str) -> ExtractionResult;
}
