//! Confidence scoring.
//!
//! The score is a heuristic in [0, 1], not a calibrated probability.

use crate::models::invoice::{InvoiceRecord, UNKNOWN_NAME};

const BASE_CONFIDENCE: f32 = 0.5;
const SIGNAL_WEIGHT: f32 = 0.1;

/// Text length at which the text heuristic saturates.
const FULL_TEXT_CHARS: f32 = 500.0;

/// Stand-in for a non-numeric intermediate score.
const NEUTRAL: f32 = 0.5;

/// Field-presence signals for the pattern score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSignals {
    pub code_resolved: bool,
    pub date_found: bool,
    pub buyer_resolved: bool,
    pub seller_resolved: bool,
    pub total_found: bool,
}

impl FieldSignals {
    /// Read the signals off a cleaned-up record.
    ///
    /// `generated_code` marks a filename/timestamp code, which the record
    /// itself cannot show. Every record carries a date, defaulted or not,
    /// so the date signal is always present.
    pub fn from_record(record: &InvoiceRecord, generated_code: bool) -> Self {
        Self {
            code_resolved: !record.has_unknown_code() && !generated_code,
            date_found: true,
            buyer_resolved: record.buyer_name != UNKNOWN_NAME,
            seller_resolved: record.seller_name != UNKNOWN_NAME,
            total_found: !record.total_amount_value.is_zero(),
        }
    }

    fn count(&self) -> usize {
        [
            self.code_resolved,
            self.date_found,
            self.buyer_resolved,
            self.seller_resolved,
            self.total_found,
        ]
        .iter()
        .filter(|s| **s)
        .count()
    }
}

/// 0.5 plus 0.1 per present signal, capped at 1.
pub fn pattern_confidence(signals: &FieldSignals) -> f32 {
    (BASE_CONFIDENCE + SIGNAL_WEIGHT * signals.count() as f32).min(1.0)
}

/// Character count over 500, capped at 1.
pub fn text_confidence(text: &str) -> f32 {
    (text.chars().count() as f32 / FULL_TEXT_CHARS).min(1.0)
}

/// Blend the two heuristics and apply the caller's floor.
pub fn score(signals: &FieldSignals, text: &str, floor: f32) -> f32 {
    let pattern = numeric_or_neutral(pattern_confidence(signals));
    let text = numeric_or_neutral(text_confidence(text));
    ((pattern + text) / 2.0).max(floor).min(1.0)
}

fn numeric_or_neutral(value: f32) -> f32 {
    if value.is_finite() { value } else { NEUTRAL }
}
