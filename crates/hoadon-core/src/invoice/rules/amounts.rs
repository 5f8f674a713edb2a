//! Amount normalization for Vietnamese receipts.
//!
//! VND has no fractional unit in everyday use, so `.` is a thousands
//! separator unless the number also contains `,`.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// How the context around a matched number affects its sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignCue {
    /// Keep the number as written.
    AsWritten,
    /// The match context carries a leading `-` or parentheses.
    Negative,
}

/// Which phase of the search produced an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountPhase {
    /// Dash-indicated total; wins over everything else.
    Dash,
    /// Currency-suffixed, labeled or trailing numbers.
    General,
}

/// Plausible range for one document type. Zero is never plausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl AmountRange {
    /// Any nonzero amount.
    pub const ANY: AmountRange = AmountRange {
        min: Decimal::MIN,
        max: Decimal::MAX,
    };

    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min: Decimal::from(min),
            max: Decimal::from(max),
        }
    }

    pub fn check(&self, value: Decimal) -> Result<Decimal, ExtractionError> {
        if value.is_zero() || value < self.min || value > self.max {
            return Err(ExtractionError::OutOfRangeAmount {
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }
}

/// One entry of an amount table: a named pattern and the range its
/// candidates must fall in.
#[derive(Debug)]
pub struct AmountPattern {
    pub name: &'static str,
    pub regex: Regex,
    pub sign: SignCue,
    pub range: AmountRange,
}

impl AmountPattern {
    pub fn new(name: &'static str, pattern: &str, sign: SignCue) -> Self {
        Self {
            name,
            regex: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid amount pattern {name}: {e}")),
            sign,
            range: AmountRange::ANY,
        }
    }

    /// Restrict accepted candidates to `range`.
    pub fn within(mut self, range: AmountRange) -> Self {
        self.range = range;
        self
    }

    /// Parse, sign and range-check this entry's first match.
    ///
    /// `None` when the pattern does not match at all. The sign cue only
    /// applies with `allow_credit`.
    pub fn candidate<'t>(
        &self,
        text: &'t str,
        allow_credit: bool,
    ) -> Option<Result<(Decimal, &'t str), ExtractionError>> {
        let caps = self.regex.captures(text)?;
        let raw = caps.get(1)?.as_str();
        let source = caps.get(0).map_or(raw, |m| m.as_str());

        let result = parse_vnd_amount(raw).and_then(|magnitude| {
            let value = if allow_credit && self.sign == SignCue::Negative {
                -magnitude
            } else {
                magnitude
            };
            self.range.check(value)
        });

        Some(result.map(|value| (value, source)))
    }
}

/// A resolved amount.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountMatch {
    pub value: Decimal,
    pub pattern: &'static str,
    pub phase: AmountPhase,
    pub source: String,
}

/// Two-phase amount search for one document type.
///
/// Phase one holds dash-indicated patterns; when any of them yields a value
/// inside its range the general patterns are never consulted.
#[derive(Debug)]
pub struct AmountTable {
    pub name: &'static str,
    /// Whether a negative cue may flip the sign (credit or payment).
    pub allow_credit: bool,
    pub dash: Vec<AmountPattern>,
    pub general: Vec<AmountPattern>,
}

impl AmountTable {
    /// Build a table whose entries all accept `range`.
    pub fn new(
        name: &'static str,
        range: AmountRange,
        allow_credit: bool,
        dash: Vec<AmountPattern>,
        general: Vec<AmountPattern>,
    ) -> Self {
        let bound = |patterns: Vec<AmountPattern>| -> Vec<AmountPattern> {
            patterns.into_iter().map(|p| p.within(range)).collect()
        };
        Self {
            name,
            allow_credit,
            dash: bound(dash),
            general: bound(general),
        }
    }

    /// Resolve the document total, recording every rejected candidate.
    pub fn resolve(&self, text: &str, issues: &mut Vec<ExtractionError>) -> Option<AmountMatch> {
        let phases = [
            (AmountPhase::Dash, &self.dash),
            (AmountPhase::General, &self.general),
        ];

        for (phase, patterns) in phases {
            for pattern in patterns {
                match self.try_pattern(pattern, phase, text) {
                    Some(Ok(found)) => {
                        debug!(
                            "{} amount {} accepted from pattern {}",
                            self.name, found.value, found.pattern
                        );
                        return Some(found);
                    }
                    Some(Err(e)) => {
                        debug!("{} pattern {} rejected: {}", self.name, pattern.name, e);
                        issues.push(e);
                    }
                    None => {}
                }
            }
        }

        None
    }

    /// `None` when the pattern does not match at all.
    fn try_pattern(
        &self,
        pattern: &AmountPattern,
        phase: AmountPhase,
        text: &str,
    ) -> Option<Result<AmountMatch, ExtractionError>> {
        let result = pattern.candidate(text, self.allow_credit)?;
        Some(result.map(|(value, source)| AmountMatch {
            value,
            pattern: pattern.name,
            phase,
            source: source.to_string(),
        }))
    }
}

impl FieldExtractor for AmountTable {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let mut issues = Vec::new();
        self.resolve(text, &mut issues)
            .map(|m| ExtractionMatch::new(m.value, m.pattern, m.source))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.dash
            .iter()
            .map(|p| (AmountPhase::Dash, p))
            .chain(self.general.iter().map(|p| (AmountPhase::General, p)))
            .filter_map(|(phase, p)| self.try_pattern(p, phase, text))
            .filter_map(|r| r.ok())
            .map(|m| ExtractionMatch::new(m.value, m.pattern, m.source))
            .collect()
    }
}

/// Parse a Vietnamese-formatted amount magnitude (e.g. "1.234.567", "50,000").
///
/// With both `,` and `.` present, `,` is dropped and `.` is the decimal
/// point; otherwise both are thousands separators.
pub fn parse_vnd_amount(raw: &str) -> Result<Decimal, ExtractionError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    let cleaned = cleaned.trim_start_matches('-');

    let normalized = if cleaned.contains(',') && cleaned.contains('.') {
        cleaned.replace(',', "")
    } else {
        cleaned.replace([',', '.'], "")
    };

    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        return Err(ExtractionError::NumericParseFailure {
            raw: raw.to_string(),
        });
    }

    Decimal::from_str(&normalized).map_err(|_| ExtractionError::NumericParseFailure {
        raw: raw.to_string(),
    })
}

/// Format `|amount|` rounded to whole dong with `,` thousands separators.
pub fn format_thousands(amount: Decimal) -> String {
    let mut rounded = amount
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(0);

    let chars: Vec<char> = rounded.to_string().chars().collect();
    let mut formatted = String::with_capacity(chars.len() + chars.len() / 3);

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    formatted
}

/// Display form of a total: `"<formatted |amount|> VND"`.
pub fn format_vnd(amount: Decimal) -> String {
    format!("{} VND", format_thousands(amount))
}
