//! Invoice record produced by the extraction pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::rules::amounts::format_vnd;

/// Unresolved invoice code.
pub const UNKNOWN_CODE: &str = "INV-UNKNOWN";

/// Unresolved buyer or seller name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Display value of an unresolved total.
pub const ZERO_TOTAL: &str = "0 VND";

/// Placeholder for addresses and tax ids.
pub const NOT_AVAILABLE: &str = "N/A";

pub const MOMO_BUYER: &str = "MoMo User";
pub const MOMO_SELLER: &str = "MoMo Payment";
pub const MOMO_PAYMENT_METHOD: &str = "MoMo";
pub const ELECTRICITY_SELLER: &str = "Công ty Điện lực";
pub const GENERIC_SELLER: &str = "Unknown Vendor";
pub const FALLBACK_BUYER: &str = "Unknown Customer";

/// Kind of document an invoice record was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    /// MoMo e-wallet payment receipt.
    MomoPayment,
    /// Electricity bill (possibly paid through MoMo).
    Electricity,
    /// Traditional invoice not refined further.
    Traditional,
    /// Traditional invoice for water supply.
    Water,
    /// Traditional sales invoice.
    Sale,
    /// Traditional service invoice.
    Service,
    /// Placeholder for text that could not be processed.
    General,
}

impl InvoiceType {
    /// Snake-case label used in storage rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::MomoPayment => "momo_payment",
            InvoiceType::Electricity => "electricity",
            InvoiceType::Traditional => "traditional",
            InvoiceType::Water => "water",
            InvoiceType::Sale => "sale",
            InvoiceType::Service => "service",
            InvoiceType::General => "general",
        }
    }
}

impl std::fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Free-text description.
    pub description: String,

    /// Amount attributed to the line.
    pub amount: Decimal,

    /// Quantity.
    pub quantity: u32,
}

/// Structured invoice extracted from OCR text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Document classification.
    pub invoice_type: InvoiceType,

    /// Invoice, customer or transaction code.
    pub invoice_code: String,

    /// Invoice date.
    pub date: NaiveDate,

    /// Transaction instant, when the receipt prints a clock time.
    pub invoice_time: Option<NaiveDateTime>,

    /// Payment due date.
    pub due_date: Option<NaiveDate>,

    pub buyer_name: String,
    pub seller_name: String,
    pub buyer_address: String,
    pub seller_address: String,
    pub buyer_tax_id: String,
    pub seller_tax_id: String,

    /// Display total, always `"<formatted |value|> VND"`.
    pub total_amount: String,

    /// Signed total. Only electricity bills go negative (credit/payment).
    pub total_amount_value: Decimal,

    /// Mirrors `total_amount_value`.
    pub subtotal: Decimal,

    pub tax_amount: Decimal,
    pub tax_percentage: Decimal,

    /// Currency code (default: VND).
    pub currency: String,

    /// Line items in document order.
    pub items: Vec<LineItem>,

    /// MoMo transaction id.
    pub transaction_id: String,

    /// MoMo payment method.
    pub payment_method: String,

    /// MoMo sender account or phone number.
    pub payment_account: String,
}

impl InvoiceRecord {
    /// Create a record holding every field's sentinel.
    pub fn new(invoice_type: InvoiceType, date: NaiveDate, currency: &str) -> Self {
        Self {
            invoice_type,
            invoice_code: UNKNOWN_CODE.to_string(),
            date,
            invoice_time: None,
            due_date: None,
            buyer_name: UNKNOWN_NAME.to_string(),
            seller_name: UNKNOWN_NAME.to_string(),
            buyer_address: NOT_AVAILABLE.to_string(),
            seller_address: NOT_AVAILABLE.to_string(),
            buyer_tax_id: NOT_AVAILABLE.to_string(),
            seller_tax_id: NOT_AVAILABLE.to_string(),
            total_amount: ZERO_TOTAL.to_string(),
            total_amount_value: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            tax_percentage: Decimal::ZERO,
            currency: currency.to_string(),
            items: Vec::new(),
            transaction_id: String::new(),
            payment_method: String::new(),
            payment_account: String::new(),
        }
    }

    /// Set the total and the fields that mirror it.
    pub fn set_total(&mut self, value: Decimal) {
        self.total_amount = format_vnd(value);
        self.total_amount_value = value;
        self.subtotal = value;
    }

    /// Whether the invoice code is still the unresolved sentinel.
    pub fn has_unknown_code(&self) -> bool {
        self.invoice_code == UNKNOWN_CODE
    }

    /// Line items as a JSON array string, ready to store in a single column.
    pub fn items_json(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_string())
    }

    /// Flatten into a storage row.
    pub fn to_row(&self, filename: &str, confidence: f32, raw_text: &str) -> InvoiceRow {
        InvoiceRow {
            filename: filename.to_string(),
            invoice_code: self.invoice_code.clone(),
            invoice_type: self.invoice_type.as_str().to_string(),
            buyer_name: self.buyer_name.clone(),
            seller_name: self.seller_name.clone(),
            buyer_address: self.buyer_address.clone(),
            seller_address: self.seller_address.clone(),
            buyer_tax_id: self.buyer_tax_id.clone(),
            seller_tax_id: self.seller_tax_id.clone(),
            total_amount: self.total_amount.clone(),
            total_amount_value: self.total_amount_value,
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            tax_percentage: self.tax_percentage,
            currency: self.currency.clone(),
            items: self.items_json(),
            transaction_id: self.transaction_id.clone(),
            payment_method: self.payment_method.clone(),
            payment_account: self.payment_account.clone(),
            confidence_score: confidence,
            raw_text: raw_text.to_string(),
            invoice_date: self.date.format("%Y-%m-%d").to_string(),
            invoice_time: self
                .invoice_time
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            due_date: self.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Column-by-column shape of an invoice for relational storage.
///
/// Every field is a scalar so the row serializes flat (CSV, SQL binds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRow {
    pub filename: String,
    pub invoice_code: String,
    pub invoice_type: String,
    pub buyer_name: String,
    pub seller_name: String,
    pub buyer_address: String,
    pub seller_address: String,
    pub buyer_tax_id: String,
    pub seller_tax_id: String,
    pub total_amount: String,
    pub total_amount_value: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub tax_percentage: Decimal,
    pub currency: String,
    /// JSON array of line items.
    pub items: String,
    pub transaction_id: String,
    pub payment_method: String,
    pub payment_account: String,
    pub confidence_score: f32,
    pub raw_text: String,
    /// ISO `YYYY-MM-DD`.
    pub invoice_date: String,
    pub invoice_time: Option<String>,
    pub due_date: Option<String>,
}
