//! Core library for Vietnamese invoice OCR field extraction.
//!
//! This crate provides:
//! - Document classification (MoMo receipts, electricity bills, other invoices)
//! - Ordered pattern tables for field extraction
//! - Vietnamese amount normalization with per-type plausibility ranges
//! - Post-extraction cleanup and confidence scoring
//! - Invoice record and storage row models

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{ExtractionError, HoadonError, Result};
pub use invoice::{ExtractionResult, InvoiceEngine, InvoiceExtractor};
pub use models::config::{ExtractionConfig, HoadonConfig};
pub use models::invoice::{InvoiceRecord, InvoiceRow, InvoiceType, LineItem};
