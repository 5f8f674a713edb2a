//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};

use crate::error::{HoadonError, Result};

/// Main configuration for hoadon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoadonConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Floor for the reported confidence (0.0 - 1.0).
    pub confidence_threshold: f32,

    /// Results below this confidence are flagged for human review.
    pub review_threshold: f32,

    /// Minimum trimmed text length (characters) worth extracting from.
    pub min_text_length: usize,

    /// Substrings the OCR layer emits when it failed.
    pub failure_markers: Vec<String>,

    /// Characters of OCR text kept on the extraction result.
    pub raw_text_limit: usize,

    /// Currency assumed when the document does not say.
    pub default_currency: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            review_threshold: 0.8,
            min_text_length: 10,
            failure_markers: vec!["OCR not available".to_string(), "OCR failed".to_string()],
            raw_text_limit: 1000,
            default_currency: "VND".to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Caller floor clamped into [0, 1]; NaN counts as no floor.
    pub fn confidence_floor(&self) -> f32 {
        if self.confidence_threshold.is_nan() {
            0.0
        } else {
            self.confidence_threshold.clamp(0.0, 1.0)
        }
    }
}

impl HoadonConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;
        if extraction.default_currency.trim().is_empty() {
            return Err(HoadonError::Config(
                "extraction.default_currency must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&extraction.review_threshold) {
            return Err(HoadonError::Config(format!(
                "extraction.review_threshold must be within [0, 1], got {}",
                extraction.review_threshold
            )));
        }
        Ok(())
    }
}
