//! MoMo e-wallet receipts.

use chrono::{NaiveDate, NaiveDateTime};

use crate::invoice::classifier::DocumentType;
use crate::invoice::rules::patterns::{
    MOMO_ACCOUNT, MOMO_AMOUNTS, MOMO_CONTENT, MOMO_DATETIME, MOMO_RECIPIENT, MOMO_TRANSACTION_ID,
};
use crate::invoice::rules::{parse_day_month_year, parse_day_month_year_time};
use crate::models::invoice::{
    InvoiceRecord, InvoiceType, LineItem, MOMO_PAYMENT_METHOD, MOMO_SELLER, UNKNOWN_NAME,
};

use super::{DocumentExtractor, ExtractionContext};

/// Extracts transaction id, sender, amount, time, recipient and message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomoExtractor;

impl DocumentExtractor for MomoExtractor {
    fn document_type(&self) -> DocumentType {
        DocumentType::MomoPayment
    }

    fn extract(&self, ctx: &mut ExtractionContext<'_>, record: &mut InvoiceRecord) {
        record.invoice_type = InvoiceType::MomoPayment;
        record.seller_name = MOMO_SELLER.to_string();
        record.payment_method = MOMO_PAYMENT_METHOD.to_string();

        match MOMO_TRANSACTION_ID.first_accepted(ctx.text, |m| {
            plausible_transaction_id(&m.value).then(|| m.value.clone())
        }) {
            Ok(m) => {
                record.invoice_code = format!("MOMO-{}", m.value);
                record.transaction_id = m.value;
            }
            Err(e) => ctx.note(e),
        }

        match MOMO_ACCOUNT.first_accepted(ctx.text, non_empty) {
            Ok(m) => {
                if record.buyer_name == UNKNOWN_NAME {
                    record.buyer_name = m.value.clone();
                }
                record.payment_account = m.value;
            }
            Err(e) => ctx.note(e),
        }

        ctx.apply_amount(&MOMO_AMOUNTS, record);

        match MOMO_DATETIME.first_accepted(ctx.text, |m| parse_receipt_time(&m.value)) {
            Ok(m) => {
                let (date, time) = m.value;
                record.date = date;
                record.invoice_time = time;
            }
            Err(e) => ctx.note(e),
        }

        match MOMO_RECIPIENT.first_accepted(ctx.text, non_empty) {
            Ok(m) => record.seller_name = m.value,
            Err(e) => ctx.note(e),
        }

        if let Ok(m) = MOMO_CONTENT.first_accepted(ctx.text, non_empty) {
            record.items.push(LineItem {
                description: m.value,
                amount: record.total_amount_value,
                quantity: 1,
            });
        }
    }
}

/// Reject captures that are amounts, phone-like digit runs or too short.
pub fn plausible_transaction_id(candidate: &str) -> bool {
    if candidate.chars().count() < 6 {
        return false;
    }
    let upper = candidate.to_uppercase();
    if ["VND", "VNĐ", "Đ", ".", ","].iter().any(|m| upper.contains(m)) {
        return false;
    }
    let stripped: String = candidate.chars().filter(|c| *c != '-' && *c != '_').collect();
    !stripped.chars().all(|c| c.is_ascii_digit())
}

fn non_empty(m: &crate::invoice::rules::ExtractionMatch<String>) -> Option<String> {
    (!m.value.is_empty()).then(|| m.value.clone())
}

/// Date with an optional clock time. A capture that does not parse is skipped.
fn parse_receipt_time(raw: &str) -> Option<(NaiveDate, Option<NaiveDateTime>)> {
    if let Some(instant) = parse_day_month_year_time(raw) {
        return Some((instant.date(), Some(instant)));
    }
    parse_day_month_year(raw).map(|date| (date, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use crate::error::ExtractionError;

    fn run(text: &str) -> (InvoiceRecord, Vec<ExtractionError>) {
        let reference = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let lower = text.to_lowercase();
        let mut ctx = ExtractionContext::new(text, &lower, reference);
        let mut record = InvoiceRecord::new(InvoiceType::MomoPayment, reference.date(), "VND");
        MomoExtractor.extract(&mut ctx, &mut record);
        (record, ctx.issues)
    }

    #[test]
    fn test_transfer_receipt() {
        let text = "MoMo\nChuyển tiền thành công\nMã giao dịch: MOMO123456\n\
                    Số tiền: 50.000đ\nThời gian: 12/03/2024 14:30\n\
                    Người nhận: Nguyễn Văn B\nNội dung: tra tien com";
        let (record, _) = run(text);
        assert_eq!(record.transaction_id, "MOMO123456");
        assert_eq!(record.invoice_code, "MOMO-MOMO123456");
        assert_eq!(record.total_amount_value, Decimal::from(50_000));
        assert_eq!(record.total_amount, "50,000 VND");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        assert_eq!(
            record.invoice_time,
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap().and_hms_opt(14, 30, 0)
        );
        assert_eq!(record.seller_name, "Nguyễn Văn B");
        assert_eq!(record.payment_method, "MoMo");
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].description, "tra tien com");
        assert_eq!(record.items[0].amount, Decimal::from(50_000));
    }

    #[test]
    fn test_date_without_time() {
        let (record, _) = run("momo\nNgày: 05/02/2024\n20.000đ");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        assert_eq!(record.invoice_time, None);
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let (record, issues) = run("momo\nthanh toan");
        assert!(record.transaction_id.is_empty());
        assert!(record.has_unknown_code());
        assert_eq!(record.seller_name, MOMO_SELLER);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(issues.contains(&ExtractionError::NoPatternMatch { field: "date" }));
        assert!(issues.contains(&ExtractionError::NoPatternMatch {
            field: "total_amount"
        }));
    }

    #[test]
    fn test_sender_account_fills_buyer() {
        let (record, _) = run("momo\nTài khoản: 0901234567\n30.000đ");
        assert_eq!(record.payment_account, "0901234567");
        assert_eq!(record.buyer_name, "0901234567");
    }

    #[test]
    fn test_plausible_transaction_id() {
        assert!(plausible_transaction_id("MOMO123456"));
        assert!(!plausible_transaction_id("AB12"));
        assert!(!plausible_transaction_id("123456789"));
        assert!(!plausible_transaction_id("12-345-678"));
        assert!(!plausible_transaction_id("50.000VND"));
    }
}
