//! Pattern tables for Vietnamese invoice and receipt extraction.
//!
//! Table order is priority order. OCR output mixes accented and unaccented
//! Vietnamese, so most labels list both spellings.

use lazy_static::lazy_static;
use regex::Regex;

use super::amounts::{AmountPattern, AmountRange, AmountTable, SignCue};
use super::PatternTable;

/// MoMo / e-wallet / transfer wording.
pub const MOMO_KEYWORDS: &[&str] = &["momo", "ví điện tử", "momo wallet", "transfer", "chuyển khoản"];

/// Electricity and utility-provider wording.
pub const ELECTRICITY_KEYWORDS: &[&str] = &[
    "điện",
    "electricity",
    "tiền điện",
    "hóa đơn tiền điện",
    "kwh",
    "evn",
    "điện lực",
    "ctdl",
    "vinh long",
    "nhà cung cấp",
];

pub const WATER_KEYWORDS: &[&str] = &["nước", "water", "m3", "tiền nước"];
pub const SALE_KEYWORDS: &[&str] = &["hàng", "hóa", "sale", "selling"];
pub const SERVICE_KEYWORDS: &[&str] = &["dịch vụ", "service", "services"];

// Currency suffixes accepted after an amount.
const DASH_SUFFIX: &str = r"(?:\s*(?:vnđ|vnd|đ|d))?";
const CURRENCY: &str = r"(?:d|đ|vnd|vnđ|đồng)";

lazy_static! {
    // MoMo receipts
    pub static ref MOMO_TRANSACTION_ID: PatternTable = PatternTable::new("transaction_id", &[
        ("labeled_transaction", r"(?i)(?:mã giao dịch|ma giao dich|transaction id|trans id|transaction)[:\s]*([A-Z0-9\-]{6,20})"),
        ("labeled_id", r"(?i)(?:ID)[:\s]*([A-Z0-9]{8,16})(?:\s|$)"),
        ("prefixed_digits", r"(?i)([A-Z]{2,4}\d{6,12})"),
    ]);

    pub static ref MOMO_ACCOUNT: PatternTable = PatternTable::new("payment_account", &[
        ("account_number", r"(?i)(?:tài khoản|từ|from|sender)[:\s]*([0-9 \-\+\(\)]+)"),
        ("phone_number", r"(?i)(?:số điện thoại|phone|mobile)[:\s]*([0-9 \-\+\(\)]+)"),
        ("sender_line", r"(?i)(?:người gửi|sender)[:\s]*([^\n]+)"),
    ]);

    pub static ref MOMO_DATETIME: PatternTable = PatternTable::new("date", &[
        ("labeled_datetime", r"(?i)(?:thời gian|time|ngày)[:\s]*(\d{1,2}[/-]\d{1,2}[/-]\d{4}\s+\d{1,2}:\d{2})"),
        ("labeled_date", r"(?i)(?:thời gian|time|ngày)[:\s]*(\d{1,2}[/-]\d{1,2}[/-]\d{4})"),
        ("bare_datetime", r"(\d{1,2}[/-]\d{1,2}[/-]\d{4}\s+\d{1,2}:\d{2})"),
        ("bare_date", r"(\d{1,2}[/-]\d{1,2}[/-]\d{4})"),
    ]);

    pub static ref MOMO_RECIPIENT: PatternTable = PatternTable::new("seller_name", &[
        ("recipient_vi", r"(?i)người nhận[:\s]*([^\n\r]+)"),
        ("receiving_party", r"(?i)bên nhận[:\s]*([^\n\r]+)"),
        ("store", r"(?i)(?:tên cửa hàng|store|shop)[:\s]*([^\n\r]+)"),
        ("recipient_en", r"(?i)recipient[:\s]*([^\n\r]+)"),
    ]);

    pub static ref MOMO_CONTENT: PatternTable = PatternTable::new("content", &[
        ("message", r"(?i)(?:nội dung|content|message|ghi chú)[:\s]*([^\n]+)"),
        ("description", r"(?i)(?:mô tả|description)[:\s]*([^\n]+)"),
    ]);

    // Electricity bills
    pub static ref ELECTRICITY_CUSTOMER_CODE: PatternTable = PatternTable::new("invoice_code", &[
        ("customer_code", r"(?i)(?:mã khách hàng|ma khach hang)[:\s]*([A-Z0-9]+)"),
        ("coded_token", r"(?i)([A-Z]{2,3}\d{2,}[A-Z0-9]*)"),
    ]);

    pub static ref ELECTRICITY_CUSTOMER_NAME: PatternTable = PatternTable::new("buyer_name", &[
        ("customer_name", r"(?i)(?:tên khách hàng|tén khach hang|ten khach hang)[:\s]*([^\n\r]+)"),
        ("customer", r"(?i)(?:khách hàng|khach hang)[:\s]*([^\n\r]+)"),
    ]);

    pub static ref ELECTRICITY_ADDRESS: PatternTable = PatternTable::new("buyer_address", &[
        ("address", r"(?i)(?:địa chỉ|dia chi)[:\s]*([^\n\r]+(?:\n[^\n\r]+)*?)(?:\n\w|$)"),
    ]);

    pub static ref ELECTRICITY_PERIOD: PatternTable = PatternTable::new("billing_period", &[
        ("period", r"(?i)(?:kỳ thanh toán|kỳ|nội dung|content)[:\s]*([^\n\r]+)"),
    ]);

    // Dates, day first
    pub static ref DAY_MONTH_YEAR: Regex = Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{4})").unwrap();

    pub static ref BARE_YEAR: Regex = Regex::new(r"\d{4}").unwrap();

    // Traditional invoices
    pub static ref TRADITIONAL_INVOICE_CODE: PatternTable = PatternTable::new("invoice_code", &[
        ("labeled_code", r"(?i)(?:mã|number|code)[:\s]+([A-Z0-9\-]+)"),
        ("invoice_prefix", r"(?i)(?:hđ|inv|invoice)[:\s]+([A-Z0-9\-]+)"),
        ("coded_token", r"(?i)([A-Z]{2,3}\-?\d{4,8})"),
    ]);

    pub static ref TRADITIONAL_BUYER: PatternTable = PatternTable::new("buyer_name", &[
        ("buyer", r"(?i)(?:khách|buyer|người mua)[:\s]*([^\n]+)"),
        ("purchase", r"(?i)(?:mua hàng)[:\s]*([^\n]+)"),
        ("buying_party", r"(?i)(?:bên mua)[:\s]*([^\n]+)"),
    ]);

    pub static ref TRADITIONAL_SELLER: PatternTable = PatternTable::new("seller_name", &[
        ("seller", r"(?i)(?:công ty|seller|người bán|bên bán)[:\s]*([^\n]+)"),
        ("provider", r"(?i)(?:bên cung cấp)[:\s]*([^\n]+)"),
    ]);

    // Cleanup fallbacks. Case-sensitive: lowercase runs are rarely ids.
    pub static ref BACKFILL_TRANSACTION_ID: PatternTable = PatternTable::new("transaction_id", &[
        ("long_digits", r"(\d{10,15})"),
        ("long_alphanumeric", r"([A-Z0-9]{10,20})"),
    ]);

    pub static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();

    // Amounts
    pub static ref MOMO_AMOUNTS: AmountTable = AmountTable::new(
        "momo_payment",
        AmountRange::new(1_000, 100_000_000),
        false,
        dash_patterns(),
        vec![
            AmountPattern::new("currency_grouped", &format!(r"(?im)([0-9]{{1,3}}(?:[,.][0-9]{{3}})+)\s*{CURRENCY}"), SignCue::AsWritten),
            AmountPattern::new("currency_any", &format!(r"(?im)([0-9]+(?:[,.][0-9]+)+)\s*{CURRENCY}"), SignCue::AsWritten),
            AmountPattern::new("transfer_amount", r"(?im)(?:số tiền chuyển|transfer amount|chuyển khoản)[:\s]*([0-9,.]+)(?:\s*(?:vnd|đ|vnđ|đồng))?", SignCue::AsWritten),
            AmountPattern::new("amount_label", r"(?im)(?:số tiền|amount|giá trị)[:\s]*([0-9,.]+)(?:\s*(?:vnd|đ|vnđ|đồng))?", SignCue::AsWritten),
            AmountPattern::new("total_label", r"(?im)(?:tổng tiền|thành tiền|total|tổng cộng)[:\s]*([0-9,.]+)(?:\s*(?:vnd|đ|vnđ|đồng))?", SignCue::AsWritten),
            AmountPattern::new("payment_label", r"(?im)(?:transfer|payment|amount)\s*[:\s]*([0-9,.]+)(?:\s*(?:vnd|đ|vnđ))?", SignCue::AsWritten),
            AmountPattern::new("signed_currency", &format!(r"(?im)[+\-]\s*([0-9,.]+)\s*{CURRENCY}"), SignCue::AsWritten),
        ],
    );

    pub static ref ELECTRICITY_AMOUNTS: AmountTable = AmountTable::new(
        "electricity",
        AmountRange::new(-5_000_000, 10_000_000),
        true,
        dash_patterns(),
        vec![
            AmountPattern::new("dash_currency_grouped", &format!(r"(?im)(?:-|@[)\s]*-)\s*([0-9]{{1,3}}(?:[,.][0-9]{{3}})+)\s*{CURRENCY}"), SignCue::Negative),
            AmountPattern::new("dash_currency_any", &format!(r"(?im)(?:-|@[)\s]*-)\s*([0-9]+(?:[,.][0-9]+)+)\s*{CURRENCY}"), SignCue::Negative),
            AmountPattern::new("parenthesised_currency", &format!(r"(?im)\(\s*([0-9]{{1,3}}(?:[,.][0-9]{{3}})+)\s*{CURRENCY}\s*\)"), SignCue::Negative),
            AmountPattern::new("currency_grouped", &format!(r"(?im)([0-9]{{1,3}}(?:[,.][0-9]{{3}})+)\s*{CURRENCY}"), SignCue::AsWritten),
            AmountPattern::new("currency_any", &format!(r"(?im)([0-9]+(?:[,.][0-9]+)+)\s*{CURRENCY}"), SignCue::AsWritten),
            AmountPattern::new("amount_label", r"(?im)(?:số tiền|amount|total|tổng tiền|tổng cộng)[:\s]*([0-9,.]+)(?:\s*(?:vnd|đ|vnđ))?", SignCue::AsWritten),
            AmountPattern::new("total_label", r"(?im)(?:thành tiền|tổng|total)[:\s]*([0-9,.]+)(?:\s*(?:vnd|đ|vnđ))?", SignCue::AsWritten),
            AmountPattern::new("payable_label", r"(?im)(?:tiền thanh toán|số tiền phải trả|phải trả)[:\s]*([0-9,.]+)(?:\s*(?:vnd|đ|vnđ|đồng))?", SignCue::AsWritten),
        ],
    );

    pub static ref TRADITIONAL_AMOUNTS: AmountTable = AmountTable::new(
        "traditional",
        AmountRange::new(100, 100_000_000),
        false,
        dash_patterns(),
        vec![
            AmountPattern::new("total_label", r"(?im)(?:tổng|total|amount|cộng)[:\s]*([0-9,.]+)(?:\s*vnd)?", SignCue::AsWritten),
            AmountPattern::new("trailing_number", r"(?im)([0-9,.]+)(?:\s*vnd)?$", SignCue::AsWritten),
        ],
    );
}

/// Dash-indicated totals, shared by every document type.
fn dash_patterns() -> Vec<AmountPattern> {
    vec![
        AmountPattern::new(
            "dash_line",
            &format!(r"(?im)(?:^\s*-\s*|-\s+)([0-9,.]+){DASH_SUFFIX}\s*$"),
            SignCue::Negative,
        ),
        AmountPattern::new(
            "dash_labeled_total",
            &format!(r"(?im)(?:tổng|total|amount)[:\s]*-\s*([0-9,.]+){DASH_SUFFIX}"),
            SignCue::Negative,
        ),
    ]
}
