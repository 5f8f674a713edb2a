//! Traditional invoices (water, sales, services, anything else).

use chrono::NaiveDate;

use crate::error::ExtractionError;
use crate::invoice::classifier::{refine_traditional, DocumentType};
use crate::invoice::rules::patterns::{
    DAY_MONTH_YEAR, TRADITIONAL_AMOUNTS, TRADITIONAL_BUYER, TRADITIONAL_INVOICE_CODE,
    TRADITIONAL_SELLER,
};
use crate::invoice::rules::{truncate_chars, PatternTable};
use crate::models::invoice::InvoiceRecord;

use super::{DocumentExtractor, ExtractionContext};

/// Longest party name kept.
pub const MAX_NAME_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct TraditionalExtractor;

impl DocumentExtractor for TraditionalExtractor {
    fn document_type(&self) -> DocumentType {
        DocumentType::Traditional
    }

    fn extract(&self, ctx: &mut ExtractionContext<'_>, record: &mut InvoiceRecord) {
        match TRADITIONAL_INVOICE_CODE.first_match(ctx.text) {
            Ok(m) if !m.value.is_empty() => record.invoice_code = m.value,
            Ok(_) => ctx.note(ExtractionError::NoPatternMatch {
                field: TRADITIONAL_INVOICE_CODE.field,
            }),
            Err(e) => ctx.note(e),
        }

        match invoice_date(ctx.text) {
            Some(date) => record.date = date,
            None => {
                record.date = ctx.reference_time.date();
                ctx.note(ExtractionError::NoPatternMatch { field: "date" });
            }
        }

        if let Some(name) = party_name(ctx, &TRADITIONAL_BUYER) {
            record.buyer_name = name;
        }
        if let Some(name) = party_name(ctx, &TRADITIONAL_SELLER) {
            record.seller_name = name;
        }

        ctx.apply_amount(&TRADITIONAL_AMOUNTS, record);

        record.invoice_type = refine_traditional(ctx.lower);
    }
}

fn invoice_date(text: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_YEAR.captures(text)?;
    NaiveDate::from_ymd_opt(caps[3].parse().ok()?, caps[2].parse().ok()?, caps[1].parse().ok()?)
}

fn party_name(ctx: &mut ExtractionContext<'_>, table: &PatternTable) -> Option<String> {
    match table.first_accepted(ctx.text, |m| {
        (!m.value.is_empty()).then(|| truncate_chars(&m.value, MAX_NAME_CHARS))
    }) {
        Ok(m) => Some(m.value),
        Err(e) => {
            ctx.note(e);
            None
        }
    }
}
