//! Document-type classification from keyword signals.

use tracing::debug;

use crate::models::invoice::InvoiceType;

use super::rules::contains_any;
use super::rules::patterns::{
    ELECTRICITY_KEYWORDS, MOMO_KEYWORDS, SALE_KEYWORDS, SERVICE_KEYWORDS, WATER_KEYWORDS,
};

/// Extraction path chosen for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    MomoPayment,
    Electricity,
    Traditional,
}

impl DocumentType {
    /// Label a record of this type starts with.
    pub fn invoice_type(&self) -> InvoiceType {
        match self {
            DocumentType::MomoPayment => InvoiceType::MomoPayment,
            DocumentType::Electricity => InvoiceType::Electricity,
            DocumentType::Traditional => InvoiceType::Traditional,
        }
    }
}

/// Keyword-set memberships of a lowercased text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signals {
    pub momo: bool,
    pub electricity: bool,
}

impl Signals {
    pub fn detect(lower: &str) -> Self {
        Self {
            momo: contains_any(lower, MOMO_KEYWORDS),
            electricity: contains_any(lower, ELECTRICITY_KEYWORDS),
        }
    }

    /// Pick the extraction path.
    ///
    /// Heuristic: electricity wins when both sets match (a MoMo receipt
    /// paying an electricity bill). Tuned on sampled receipts only.
    pub fn document_type(&self) -> DocumentType {
        if self.electricity {
            DocumentType::Electricity
        } else if self.momo {
            DocumentType::MomoPayment
        } else {
            DocumentType::Traditional
        }
    }
}

/// Classify lowercased OCR text.
pub fn classify(lower: &str) -> DocumentType {
    let signals = Signals::detect(lower);
    let doc_type = signals.document_type();
    debug!(
        "signals momo={} electricity={} -> {:?}",
        signals.momo, signals.electricity, doc_type
    );
    doc_type
}

/// Secondary keyword pass for traditional invoices.
pub fn refine_traditional(lower: &str) -> InvoiceType {
    if contains_any(lower, WATER_KEYWORDS) {
        InvoiceType::Water
    } else if contains_any(lower, SALE_KEYWORDS) {
        InvoiceType::Sale
    } else if contains_any(lower, SERVICE_KEYWORDS) {
        InvoiceType::Service
    } else {
        InvoiceType::Traditional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momo_only() {
        assert_eq!(
            classify("giao dịch momo thành công"),
            DocumentType::MomoPayment
        );
    }

    #[test]
    fn test_electricity_beats_momo() {
        let lower = "momo\nthanh toán hóa đơn tiền điện\nevn hcmc";
        let signals = Signals::detect(lower);
        assert!(signals.momo && signals.electricity);
        assert_eq!(classify(lower), DocumentType::Electricity);
    }

    #[test]
    fn test_plain_invoice_is_traditional() {
        assert_eq!(classify("hóa đơn bán lẻ\ntổng: 100.000"), DocumentType::Traditional);
    }

    #[test]
    fn test_refine_traditional_order() {
        assert_eq!(refine_traditional("tiền nước tháng 3"), InvoiceType::Water);
        assert_eq!(refine_traditional("water and sale"), InvoiceType::Water);
        assert_eq!(refine_traditional("hóa đơn bán hàng"), InvoiceType::Sale);
        assert_eq!(refine_traditional("phí dịch vụ"), InvoiceType::Service);
        assert_eq!(refine_traditional("biên nhận"), InvoiceType::Traditional);
    }
}
