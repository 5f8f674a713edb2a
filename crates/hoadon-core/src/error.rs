//! Error types for the hoadon-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the hoadon library.
#[derive(Error, Debug)]
pub enum HoadonError {
    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Conditions met while extracting fields from OCR text.
///
/// None of these escape [`crate::InvoiceEngine::extract`]: each one is
/// absorbed by trying the next candidate or keeping the field's sentinel,
/// and surfaces only as a warning on the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Near-empty text or text carrying an OCR failure marker.
    #[error("malformed OCR input: {reason}")]
    MalformedInput { reason: String },

    /// Every pattern for a field was tried without a match.
    #[error("no pattern matched field {field}")]
    NoPatternMatch { field: &'static str },

    /// A parsed amount fell outside the document type's plausible range.
    #[error("amount {value} outside plausible range [{min}, {max}]")]
    OutOfRangeAmount {
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    /// A matched substring could not be converted to a number.
    #[error("cannot parse amount from {raw:?}")]
    NumericParseFailure { raw: String },
}

/// Result type for the hoadon library.
pub type Result<T> = std::result::Result<T, HoadonError>;
