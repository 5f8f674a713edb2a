//! Extraction engine: classify, extract, clean up, score.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{
    FALLBACK_BUYER, GENERIC_SELLER, InvoiceRecord, InvoiceRow, InvoiceType,
};

use super::classifier::classify;
use super::confidence::{score, FieldSignals};
use super::extractors::{extractor_for, ExtractionContext};
use super::rules::truncate_chars;
use super::validator::{fallback_invoice_code, used_fallback_code, validate};
use super::InvoiceExtractor;

/// Confidence reported for the placeholder record.
pub const FALLBACK_CONFIDENCE: f32 = 0.1;

/// Characters of OCR text allowed into log lines.
const LOG_PREFIX_CHARS: usize = 60;

/// Result of invoice extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub record: InvoiceRecord,
    /// Heuristic confidence in [0, 1].
    pub confidence: f32,
    /// OCR text (truncated), or an explanation for a placeholder record.
    pub raw_text: String,
    /// Absorbed extraction errors and cleanup corrections.
    pub warnings: Vec<String>,
    /// Whether the pre-check short-circuited extraction.
    pub fallback: bool,
}

impl ExtractionResult {
    /// Whether a human should look at this result.
    pub fn needs_review(&self, bar: f32) -> bool {
        self.fallback || self.confidence < bar
    }

    /// Flatten into a storage row.
    pub fn to_row(&self, filename: &str) -> InvoiceRow {
        self.record.to_row(filename, self.confidence, &self.raw_text)
    }
}

/// Rule-based extraction engine for Vietnamese invoices and receipts.
///
/// Holds only configuration; [`InvoiceEngine::extract`] is a pure function of
/// the engine and its arguments, so one engine can serve many threads.
#[derive(Debug, Clone)]
pub struct InvoiceEngine {
    config: ExtractionConfig,
    reference_time: NaiveDateTime,
}

impl InvoiceEngine {
    /// Create an engine. `reference_time` stands in for "now" in default
    /// dates and generated codes.
    pub fn new(config: ExtractionConfig, reference_time: NaiveDateTime) -> Self {
        Self {
            config,
            reference_time,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn reference_time(&self) -> NaiveDateTime {
        self.reference_time
    }

    /// Extract an invoice record from OCR text. Never fails.
    pub fn extract(&self, ocr_text: &str, filename: &str) -> ExtractionResult {
        if let Some(issue) = self.precheck(ocr_text) {
            warn!("{}: {}, returning placeholder", filename, issue);
            return self.placeholder(filename, issue);
        }

        let lower = ocr_text.to_lowercase();
        let doc_type = classify(&lower);
        info!(
            "extracting {:?} from {} ({} chars): {:?}",
            doc_type,
            filename,
            ocr_text.chars().count(),
            truncate_chars(ocr_text, LOG_PREFIX_CHARS)
        );

        let mut ctx = ExtractionContext::new(ocr_text, &lower, self.reference_time);
        let mut record = InvoiceRecord::new(
            doc_type.invoice_type(),
            self.reference_time.date(),
            &self.config.default_currency,
        );
        extractor_for(doc_type).extract(&mut ctx, &mut record);

        let corrections = validate(&mut record, ocr_text, filename, self.reference_time);
        if record.total_amount_value.is_zero() {
            warn!("no amount resolved for {} ({})", filename, record.invoice_type);
        }

        let signals = FieldSignals::from_record(&record, used_fallback_code(&corrections));
        let confidence = score(&signals, ocr_text, self.config.confidence_floor());

        let warnings = ctx
            .issues
            .iter()
            .map(ToString::to_string)
            .chain(corrections.iter().map(ToString::to_string))
            .collect();

        ExtractionResult {
            record,
            confidence,
            raw_text: truncate_chars(ocr_text, self.config.raw_text_limit),
            warnings,
            fallback: false,
        }
    }

    fn precheck(&self, ocr_text: &str) -> Option<ExtractionError> {
        let trimmed = ocr_text.trim();
        let reason = if trimmed.is_empty() {
            "empty OCR text".to_string()
        } else if trimmed.chars().count() < self.config.min_text_length {
            format!(
                "OCR text shorter than {} characters",
                self.config.min_text_length
            )
        } else if let Some(marker) = self
            .config
            .failure_markers
            .iter()
            .find(|m| !m.is_empty() && ocr_text.contains(m.as_str()))
        {
            format!("OCR failure marker {:?}", marker)
        } else {
            return None;
        };
        Some(ExtractionError::MalformedInput { reason })
    }

    /// Low-confidence record returned instead of running extraction.
    fn placeholder(&self, filename: &str, issue: ExtractionError) -> ExtractionResult {
        let mut record = InvoiceRecord::new(
            InvoiceType::General,
            self.reference_time.date(),
            &self.config.default_currency,
        );
        record.invoice_code = fallback_invoice_code(filename, self.reference_time, true);
        record.buyer_name = FALLBACK_BUYER.to_string();
        record.seller_name = GENERIC_SELLER.to_string();

        ExtractionResult {
            record,
            confidence: FALLBACK_CONFIDENCE,
            raw_text: format!(
                "OCR processing failed for {}. No usable text was recognized.",
                filename
            ),
            warnings: vec![issue.to_string()],
            fallback: true,
        }
    }
}

impl InvoiceExtractor for InvoiceEngine {
    fn extract(&self, ocr_text: &str, filename: &str) -> ExtractionResult {
        InvoiceEngine::extract(self, ocr_text, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use crate::invoice::confidence::text_confidence;
    use crate::models::invoice::UNKNOWN_CODE;

    fn engine() -> InvoiceEngine {
        let reference = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        InvoiceEngine::new(ExtractionConfig::default(), reference)
    }

    #[test]
    fn test_scenario_a_electricity_dash_credit() {
        let result = engine().extract("EVN HCMC\nTiền điện tháng 3\n-294.948d", "evn.txt");
        assert_eq!(result.record.invoice_type, InvoiceType::Electricity);
        assert_eq!(result.record.total_amount_value, Decimal::from(-294_948));
        assert_eq!(result.record.total_amount, "294,948 VND");
        assert_eq!(result.record.subtotal, Decimal::from(-294_948));
        assert!(!result.fallback);
    }

    #[test]
    fn test_scenario_b_momo_receipt() {
        let text = "MoMo\nGiao dịch thành công\nMã giao dịch: MOMO123456\nSố tiền: 50.000đ";
        let result = engine().extract(text, "momo.txt");
        let record = &result.record;
        assert_eq!(record.invoice_type, InvoiceType::MomoPayment);
        assert_eq!(record.transaction_id, "MOMO123456");
        assert_eq!(record.invoice_code, "MOMO-MOMO123456");
        assert_eq!(record.total_amount_value, Decimal::from(50_000));
        assert_eq!(record.payment_method, "MoMo");
    }

    #[test]
    fn test_scenario_c_empty_text() {
        let result = engine().extract("", "invoice_123.jpg");
        assert!(result.fallback);
        assert_eq!(result.record.invoice_type, InvoiceType::General);
        assert!((result.confidence - 0.1).abs() < 1e-6);
        assert_eq!(result.record.invoice_code, "INV-123");
        assert_eq!(result.record.buyer_name, FALLBACK_BUYER);
        assert_eq!(result.record.seller_name, GENERIC_SELLER);
        assert!(result.raw_text.contains("invoice_123.jpg"));
        assert!(result.needs_review(0.0));
    }

    #[test]
    fn test_scenario_d_electricity_beats_momo() {
        let text = "Thanh toán qua MoMo\nHóa đơn tiền điện\nSố tiền: 150.000đ";
        let result = engine().extract(text, "x.txt");
        assert_eq!(result.record.invoice_type, InvoiceType::Electricity);
        assert_eq!(result.record.total_amount_value, Decimal::from(150_000));
    }

    #[test]
    fn test_scenario_e_decimal_scale_correction() {
        let text = "Tiền điện\nTổng tiền: 6.000.000 đ";
        let result = engine().extract(text, "x.txt");
        assert_eq!(result.record.total_amount_value, Decimal::from(60_000));
        assert_eq!(result.record.total_amount, "60,000 VND");
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("decimal-scale correction")));
    }

    #[test]
    fn test_period_item_follows_decimal_scale_correction() {
        let text = "Tiền điện\nKỳ thanh toán: T3/2024\nTổng tiền: 6.000.000 đ";
        let result = engine().extract(text, "x.txt");
        let record = &result.record;
        assert_eq!(record.total_amount_value, Decimal::from(60_000));
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].description, "Tiền điện T3/2024");
        assert_eq!(record.items[0].amount, record.total_amount_value);
    }

    #[test]
    fn test_dash_amount_beats_labeled_total() {
        let text = "Hóa đơn bán lẻ\nTổng cộng: 250.000\n- 200.000 VND";
        let result = engine().extract(text, "x.txt");
        assert_eq!(result.record.total_amount_value, Decimal::from(200_000));
        assert_eq!(result.record.invoice_type, InvoiceType::Sale);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let e = engine();
        let text = "HÓA ĐƠN TIỀN NƯỚC\nKhách: Lê Văn D\nTổng: 120.000";
        assert_eq!(e.extract(text, "w.txt"), e.extract(text, "w.txt"));
    }

    #[test]
    fn test_code_is_never_the_sentinel() {
        let e = engine();
        for text in [
            "momo chuyen tien thanh cong",
            "tiền điện tháng này",
            "biên nhận không có mã",
        ] {
            let result = e.extract(text, "scan.txt");
            assert_ne!(result.record.invoice_code, UNKNOWN_CODE, "{text}");
        }
    }

    #[test]
    fn test_short_text_and_markers_short_circuit() {
        let e = engine();
        assert!(e.extract("  abc  ", "a.txt").fallback);
        let marked = e.extract("OCR failed: tesseract exited with status 1", "a.txt");
        assert!(marked.fallback);
        assert_eq!(marked.record.invoice_code, "INV-20240601090507");
        assert!(marked.warnings[0].contains("OCR failed"));
    }

    #[test]
    fn test_confidence_respects_caller_floor() {
        let result = engine().extract("biên nhận số 1234", "r.txt");
        assert!(result.confidence >= 0.7);
        assert!(result.confidence <= 1.0);
    }

    #[test]
    fn test_defaulted_date_still_counts_toward_confidence() {
        let mut config = ExtractionConfig::default();
        config.confidence_threshold = 0.0;
        let e = InvoiceEngine::new(config, engine().reference_time());
        let text = "Code: AB1234\nKhách: A\nBên bán: B\nTổng: 120.000";
        let result = e.extract(text, "r.txt");

        assert_eq!(result.record.date, e.reference_time().date());
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "no pattern matched field date"));
        let expected = (1.0 + text_confidence(text)) / 2.0;
        assert!((result.confidence - expected).abs() < 1e-6);
    }

    #[test]
    fn test_raw_text_is_truncated() {
        let mut config = ExtractionConfig::default();
        config.raw_text_limit = 20;
        let e = InvoiceEngine::new(config, engine().reference_time());
        let result = e.extract(&"hóa đơn dịch vụ ".repeat(10), "r.txt");
        assert_eq!(result.raw_text.chars().count(), 20);
    }

    #[test]
    fn test_row_carries_confidence() {
        let result = engine().extract("EVN HCMC\nTiền điện tháng 3\n-294.948d", "evn.txt");
        let row = result.to_row("evn.txt");
        assert_eq!(row.filename, "evn.txt");
        assert_eq!(row.invoice_type, "electricity");
        assert_eq!(row.confidence_score, result.confidence);
        assert_eq!(row.invoice_date, "2024-06-01");
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InvoiceEngine>();
    }
}
