//! Electricity bills, including MoMo receipts that pay one.

use chrono::NaiveDate;

use crate::error::ExtractionError;
use crate::invoice::classifier::DocumentType;
use crate::invoice::rules::patterns::{
    BARE_YEAR, DAY_MONTH_YEAR, ELECTRICITY_ADDRESS, ELECTRICITY_AMOUNTS, ELECTRICITY_CUSTOMER_CODE,
    ELECTRICITY_CUSTOMER_NAME, ELECTRICITY_PERIOD,
};
use crate::invoice::rules::{plausible_date, plausible_year};
use crate::models::invoice::{ELECTRICITY_SELLER, InvoiceRecord, InvoiceType, LineItem};

use super::{DocumentExtractor, ExtractionContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct ElectricityExtractor;

impl DocumentExtractor for ElectricityExtractor {
    fn document_type(&self) -> DocumentType {
        DocumentType::Electricity
    }

    fn extract(&self, ctx: &mut ExtractionContext<'_>, record: &mut InvoiceRecord) {
        record.invoice_type = InvoiceType::Electricity;
        record.seller_name = ELECTRICITY_SELLER.to_string();

        match ELECTRICITY_CUSTOMER_CODE.first_match(ctx.text) {
            Ok(m) if !m.value.is_empty() => record.invoice_code = m.value,
            Ok(_) => ctx.note(ExtractionError::NoPatternMatch {
                field: ELECTRICITY_CUSTOMER_CODE.field,
            }),
            Err(e) => ctx.note(e),
        }

        match ELECTRICITY_CUSTOMER_NAME.first_match(ctx.text) {
            Ok(m) if !m.value.is_empty() => record.buyer_name = m.value,
            Ok(_) => ctx.note(ExtractionError::NoPatternMatch {
                field: ELECTRICITY_CUSTOMER_NAME.field,
            }),
            Err(e) => ctx.note(e),
        }

        if let Ok(m) = ELECTRICITY_ADDRESS.first_match(ctx.text) {
            let address = m
                .value
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !address.is_empty() {
                record.buyer_address = address;
            }
        }

        // The line item carries the amount, so the amount goes first.
        ctx.apply_amount(&ELECTRICITY_AMOUNTS, record);

        if let Ok(m) = ELECTRICITY_PERIOD.first_match(ctx.text) {
            if !m.value.is_empty() {
                record.items.push(LineItem {
                    description: format!("Tiền điện {}", m.value),
                    amount: record.total_amount_value,
                    quantity: 1,
                });
            }
        }

        match bill_date(ctx.text) {
            Some(date) => record.date = date,
            None => {
                record.date = ctx.reference_time.date();
                ctx.note(ExtractionError::NoPatternMatch { field: "date" });
            }
        }
    }
}

/// First `d/m/yyyy` in the text, or 1 January of a bare four-digit year.
///
/// Only the first full date is considered; an implausible one is not
/// replaced by a later match.
fn bill_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
        return plausible_date(&caps[1], &caps[2], &caps[3]);
    }
    let year: i32 = BARE_YEAR.find(text)?.as_str().parse().ok()?;
    if !plausible_year(year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, 1, 1)
}
