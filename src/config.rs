//! Load and query settings. Everything here is plain data passed in by the
//! caller; two loads with different settings never interfere.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::ops::RangeInclusive;

/// Encodings tried in order. WEO files are published as ISO-8859-1, which
/// `encoding_rs` serves through its Windows-1252 decoder.
pub fn default_encodings() -> Vec<&'static Encoding> {
    vec![UTF_8, WINDOWS_1252]
}

pub const DEFAULT_DELIMITERS: &[u8] = &[b',', b'\t', b';'];

/// Records inspected per candidate delimiter.
pub const DEFAULT_SNIFF_LINES: usize = 10;

/// Cell values meaning "no value". Compared case-insensitively after trimming.
pub const DEFAULT_MISSING_TOKENS: &[&str] = &["", "n/a", "na", "--", "..."];

pub const DEFAULT_THOUSANDS_SEPARATOR: char = ',';

pub const DEFAULT_YEAR_RANGE: RangeInclusive<i32> = 1980..=2100;

pub const GDP_VARIABLE: &str = "Gross domestic product, current prices";
pub const NATIONAL_CURRENCY: &str = "National currency";
pub const US_DOLLARS: &str = "U.S. dollars";
pub const EXCHANGE_RATE_VARIABLE: &str = "Implied exchange rate";
pub const EXCHANGE_RATE_UNIT: &str = "National currency per U.S. dollar";
pub const LIBOR_VARIABLE: &str = "Six-month London interbank offered rate (LIBOR)";
pub const PERCENT: &str = "Percent";

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub encodings: Vec<&'static Encoding>,
    pub delimiters: Vec<u8>,
    pub sniff_lines: usize,
    pub missing_tokens: Vec<String>,
    pub thousands_separator: char,
    pub year_range: RangeInclusive<i32>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            encodings: default_encodings(),
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            sniff_lines: DEFAULT_SNIFF_LINES,
            missing_tokens: DEFAULT_MISSING_TOKENS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            thousands_separator: DEFAULT_THOUSANDS_SEPARATOR,
            year_range: DEFAULT_YEAR_RANGE,
        }
    }
}

impl LoadConfig {
    pub fn with_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_delimiters(mut self, delimiters: Vec<u8>) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_missing_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_year_range(mut self, range: RangeInclusive<i32>) -> Self {
        self.year_range = range;
        self
    }

    pub fn is_missing_token(&self, cell: &str) -> bool {
        self.missing_tokens
            .iter()
            .any(|t| t.eq_ignore_ascii_case(cell))
    }
}

/// The two series combined by [`crate::Weo::gdp_usd`]:
/// `gdp_local / exchange_rate` for every country and the requested year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsdConversion {
    pub gdp_variable: String,
    pub gdp_unit: String,
    pub rate_variable: String,
    pub rate_unit: String,
}

impl Default for UsdConversion {
    fn default() -> Self {
        Self {
            gdp_variable: GDP_VARIABLE.into(),
            gdp_unit: NATIONAL_CURRENCY.into(),
            rate_variable: EXCHANGE_RATE_VARIABLE.into(),
            rate_unit: EXCHANGE_RATE_UNIT.into(),
        }
    }
}
