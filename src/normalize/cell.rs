use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::LoadConfig;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("number pattern is valid")
});

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Number(f64),
    Missing,
    /// Neither a number nor a missing-value token.
    Invalid,
}

impl Cell {
    pub fn parse(raw: &str, config: &LoadConfig) -> Self {
        let cleaned = clean_str(raw);
        if config.is_missing_token(cleaned) {
            return Cell::Missing;
        }
        let digits: String = cleaned
            .chars()
            .filter(|&c| c != config.thousands_separator)
            .collect();
        if !NUMBER.is_match(&digits) {
            return Cell::Invalid;
        }
        match digits.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Invalid,
        }
    }
}
