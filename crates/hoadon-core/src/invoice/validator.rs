//! Post-extraction cleanup.
//!
//! Runs once per record, in a fixed order: transaction-id backfill,
//! decimal-scale correction, buyer default, seller default, code synthesis.
//! Every change is reported as a [`Correction`].

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::invoice::{
    ELECTRICITY_SELLER, GENERIC_SELLER, InvoiceRecord, InvoiceType, MOMO_BUYER, MOMO_SELLER,
    UNKNOWN_NAME,
};

use super::rules::patterns::{BACKFILL_TRANSACTION_ID, DIGIT_RUN};

/// Heuristic: electricity totals above this are assumed to carry a shifted
/// decimal point. Tuned on sampled bills only; do not widen to other types.
pub const DECIMAL_SHIFT_THRESHOLD: i64 = 5_000_000;

/// Divisor applied by the decimal-scale correction.
pub const DECIMAL_SHIFT_DIVISOR: i64 = 100;

/// Timestamp layout used in generated codes.
const CODE_TIMESTAMP: &str = "%Y%m%d%H%M%S";

/// A change made by the cleanup pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    TransactionIdBackfilled { id: String },
    DecimalScaleCorrected { from: Decimal, to: Decimal },
    BuyerDefaulted { value: String },
    SellerDefaulted { value: String },
    /// `fallback` marks the generic filename/timestamp code, which does not
    /// count as a resolved code.
    InvoiceCodeSynthesized { code: String, fallback: bool },
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::TransactionIdBackfilled { id } => {
                write!(f, "transaction id backfilled: {}", id)
            }
            Correction::DecimalScaleCorrected { from, to } => {
                write!(f, "decimal-scale correction: {} -> {}", from, to)
            }
            Correction::BuyerDefaulted { value } => write!(f, "buyer defaulted to {}", value),
            Correction::SellerDefaulted { value } => write!(f, "seller defaulted to {}", value),
            Correction::InvoiceCodeSynthesized { code, fallback } => {
                if *fallback {
                    write!(f, "invoice code generated: {}", code)
                } else {
                    write!(f, "invoice code synthesized: {}", code)
                }
            }
        }
    }
}

/// Apply the cleanup steps to an extracted record.
pub fn validate(
    record: &mut InvoiceRecord,
    text: &str,
    filename: &str,
    reference: NaiveDateTime,
) -> Vec<Correction> {
    let mut corrections = Vec::new();

    if record.invoice_type == InvoiceType::MomoPayment
        && record.transaction_id.chars().count() < 6
    {
        if let Some(id) = backfill_transaction_id(text) {
            record.invoice_code = format!("MOMO-{}", id);
            record.transaction_id = id.clone();
            corrections.push(Correction::TransactionIdBackfilled { id });
        }
    }

    if record.invoice_type == InvoiceType::Electricity
        && record.total_amount_value > Decimal::from(DECIMAL_SHIFT_THRESHOLD)
    {
        let from = record.total_amount_value;
        let divisor = Decimal::from(DECIMAL_SHIFT_DIVISOR);
        let to = from / divisor;
        record.set_total(to);
        // Items were built from the unshifted total.
        for item in &mut record.items {
            item.amount /= divisor;
        }
        corrections.push(Correction::DecimalScaleCorrected { from, to });
    }

    if record.invoice_type == InvoiceType::MomoPayment && record.buyer_name == UNKNOWN_NAME {
        record.buyer_name = if record.payment_account.is_empty() {
            MOMO_BUYER.to_string()
        } else {
            record.payment_account.clone()
        };
        corrections.push(Correction::BuyerDefaulted {
            value: record.buyer_name.clone(),
        });
    }

    if record.seller_name.is_empty() || record.seller_name == UNKNOWN_NAME {
        record.seller_name = match record.invoice_type {
            InvoiceType::Electricity => ELECTRICITY_SELLER,
            InvoiceType::MomoPayment => MOMO_SELLER,
            _ => GENERIC_SELLER,
        }
        .to_string();
        corrections.push(Correction::SellerDefaulted {
            value: record.seller_name.clone(),
        });
    }

    if record.has_unknown_code() {
        if let Some(code) = synthesize_code(record, reference) {
            record.invoice_code = code.clone();
            corrections.push(Correction::InvoiceCodeSynthesized {
                code,
                fallback: false,
            });
        }
    }

    if record.has_unknown_code() {
        let code = fallback_invoice_code(filename, reference, false);
        record.invoice_code = code.clone();
        corrections.push(Correction::InvoiceCodeSynthesized {
            code,
            fallback: true,
        });
    }

    for c in &corrections {
        debug!("cleanup: {}", c);
    }
    corrections
}

fn backfill_transaction_id(text: &str) -> Option<String> {
    BACKFILL_TRANSACTION_ID
        .first_accepted(text, |m| {
            let currency_like = [".", ",", "VND", "đ"].iter().any(|c| m.value.contains(c));
            (!currency_like).then(|| m.value.clone())
        })
        .ok()
        .map(|m| m.value)
}

/// Type-specific code for a record whose code is still the sentinel.
fn synthesize_code(record: &InvoiceRecord, reference: NaiveDateTime) -> Option<String> {
    match record.invoice_type {
        InvoiceType::MomoPayment if !record.transaction_id.is_empty() => {
            Some(format!("MOMO-{}", record.transaction_id))
        }
        InvoiceType::Electricity => {
            let fragment: String = if record.buyer_name == UNKNOWN_NAME {
                String::new()
            } else {
                record
                    .buyer_name
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .take(10)
                    .collect()
            };
            if fragment.is_empty() {
                Some(format!("EVN-{}", reference.format(CODE_TIMESTAMP)))
            } else {
                Some(format!("EVN-{}", fragment))
            }
        }
        _ => None,
    }
}

/// `INV-<first digit run of the filename>`, or `INV-<timestamp>`.
///
/// With `require_keyword`, filename digits are only used when the name
/// mentions an invoice or bill.
pub fn fallback_invoice_code(
    filename: &str,
    reference: NaiveDateTime,
    require_keyword: bool,
) -> String {
    let lower = filename.to_lowercase();
    let eligible = !require_keyword || lower.contains("invoice") || lower.contains("bill");
    match DIGIT_RUN.find(filename) {
        Some(digits) if eligible => format!("INV-{}", digits.as_str()),
        _ => format!("INV-{}", reference.format(CODE_TIMESTAMP)),
    }
}

/// Whether the cleanup pass had to generate a filename/timestamp code.
pub fn used_fallback_code(corrections: &[Correction]) -> bool {
    corrections
        .iter()
        .any(|c| matches!(c, Correction::InvoiceCodeSynthesized { fallback: true, .. }))
}
