//! Rule-based field extraction for Vietnamese invoices and receipts.
//!
//! Every field is described by an ordered [`PatternTable`]. Patterns are
//! tried in declared order and the first regex that matches wins; the order
//! encodes priority, so tables must never be re-sorted.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::{
    format_thousands, format_vnd, parse_vnd_amount, AmountMatch, AmountPattern, AmountPhase,
    AmountRange, AmountTable, SignCue,
};
pub use dates::{parse_day_month_year, parse_day_month_year_time, plausible_date, plausible_year};

use regex::Regex;

use crate::error::ExtractionError;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract the first match of every pattern, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value matched by a named pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the pattern that produced the value.
    pub pattern: &'static str,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pattern: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            pattern,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A compiled regex with a stable name.
#[derive(Debug)]
pub struct NamedPattern {
    pub name: &'static str,
    pub regex: Regex,
}

impl NamedPattern {
    /// Compile a pattern. Tables are built from literals, so a bad regex is a
    /// programming error.
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid pattern {name}: {e}")),
        }
    }

    /// Capture group 1 (trimmed) of the first match, with the whole match.
    pub fn capture(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let caps = self.regex.captures(text)?;
        let full = caps.get(0)?;
        let value = caps.get(1).map_or(full.as_str(), |m| m.as_str()).trim();
        Some(
            ExtractionMatch::new(value.to_string(), self.name, full.as_str())
                .with_position(full.start(), full.end()),
        )
    }
}

/// Ordered patterns for one field.
#[derive(Debug)]
pub struct PatternTable {
    pub field: &'static str,
    pub patterns: Vec<NamedPattern>,
}

impl PatternTable {
    pub fn new(field: &'static str, patterns: &[(&'static str, &str)]) -> Self {
        Self {
            field,
            patterns: patterns
                .iter()
                .map(|(name, pattern)| NamedPattern::new(name, pattern))
                .collect(),
        }
    }

    /// First pattern that matches, regardless of what it captured.
    pub fn first_match(&self, text: &str) -> Result<ExtractionMatch<String>, ExtractionError> {
        self.first_accepted(text, |m| Some(m.value.clone()))
    }

    /// First pattern whose capture the `accept` closure turns into a value.
    ///
    /// A pattern that matches but whose capture is rejected does not stop
    /// the search; the next pattern is tried.
    pub fn first_accepted<T>(
        &self,
        text: &str,
        mut accept: impl FnMut(&ExtractionMatch<String>) -> Option<T>,
    ) -> Result<ExtractionMatch<T>, ExtractionError> {
        for pattern in &self.patterns {
            let Some(m) = pattern.capture(text) else {
                continue;
            };
            if let Some(value) = accept(&m) {
                let mut accepted = ExtractionMatch::new(value, m.pattern, m.source);
                accepted.position = m.position;
                return Ok(accepted);
            }
        }
        Err(ExtractionError::NoPatternMatch { field: self.field })
    }
}

impl FieldExtractor for PatternTable {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.first_match(text).ok()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.patterns.iter().filter_map(|p| p.capture(text)).collect()
    }
}

/// Whether `haystack` contains any of the keywords.
pub fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::new(
            "code",
            &[
                ("labeled", r"(?i)code[:\s]+([A-Z0-9]+)"),
                ("bare", r"([A-Z]{2}\d{4})"),
            ],
        )
    }

    #[test]
    fn test_first_declared_pattern_wins() {
        let text = "AB1234 ... Code: ZZ9999";
        let m = table().first_match(text).unwrap();
        assert_eq!(m.pattern, "labeled");
        assert_eq!(m.value, "ZZ9999");
    }

    #[test]
    fn test_falls_through_to_later_pattern() {
        let m = table().first_match("ref AB1234").unwrap();
        assert_eq!(m.pattern, "bare");
        assert_eq!(m.value, "AB1234");
    }

    #[test]
    fn test_rejected_capture_tries_next_pattern() {
        let m = table()
            .first_accepted("Code: X1 and AB1234", |m| {
                (m.value.len() >= 6).then(|| m.value.clone())
            })
            .unwrap();
        assert_eq!(m.pattern, "bare");
    }

    #[test]
    fn test_no_match_reports_field() {
        let err = table().first_match("nothing here").unwrap_err();
        assert_eq!(err, ExtractionError::NoPatternMatch { field: "code" });
    }

    #[test]
    fn test_extract_all_keeps_priority_order() {
        let all = table().extract_all("Code: ZZ9999 AB1234");
        let names: Vec<_> = all.iter().map(|m| m.pattern).collect();
        assert_eq!(names, vec!["labeled", "bare"]);
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("Điện lực", 4), "Điện");
    }
}
